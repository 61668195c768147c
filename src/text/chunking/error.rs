//! Error types for text chunking

/// Error types for chunking operations
#[derive(thiserror::Error, Debug)]
pub enum ChunkingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    #[error("Character encoding error: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for chunking operations
pub type Result<T> = std::result::Result<T, ChunkingError>;

impl ChunkingError {
    /// Create an invalid configuration error
    pub fn invalid_configuration<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an input unavailable error
    pub fn input_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::InputUnavailable(msg.into())
    }

    /// Create an encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // a misconfigured splitter never fixes itself
            Self::InvalidConfiguration(_) => false,
            // the source or sink might appear later
            Self::InputUnavailable(_) | Self::Io(_) => true,
            Self::Encoding(_) | Self::Serialization(_) => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::InputUnavailable(_) => "input_unavailable",
            Self::Encoding(_) => "encoding",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
