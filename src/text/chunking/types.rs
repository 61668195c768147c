//! Core data structures produced by the splitters

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Heading label ("Header 1") to heading text, shallowest level first
pub type HeaderMetadata = IndexMap<String, String>;

/// Chunk produced by the recursive splitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk content
    pub text: String,
    /// Character start position in the source text
    pub char_start: usize,
    /// Character end position in the source text (exclusive)
    pub char_end: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: String, char_start: usize, char_end: usize) -> Self {
        Self {
            text,
            char_start,
            char_end,
        }
    }

    /// Get the length of the chunk in characters
    pub fn char_length(&self) -> usize {
        self.char_end - self.char_start
    }

    /// Get character position range as a tuple
    pub fn char_range(&self) -> (usize, usize) {
        (self.char_start, self.char_end)
    }
}

/// Section of a markdown document tagged with its heading path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChunk {
    pub text: String,
    pub metadata: HeaderMetadata,
}

impl HeaderChunk {
    pub fn new(text: String, metadata: HeaderMetadata) -> Self {
        Self { text, metadata }
    }

    /// Get heading text recorded for a label
    pub fn header(&self, label: &str) -> Option<&str> {
        self.metadata.get(label).map(String::as_str)
    }
}

/// One JSON-Lines row of chopper output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    #[serde(rename = "chunk")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HeaderMetadata>,
}

impl ChunkRecord {
    pub fn new(text: String) -> Self {
        Self {
            text,
            metadata: None,
        }
    }

    /// Attach metadata, leaving it out entirely when there is none
    pub fn with_metadata(mut self, metadata: HeaderMetadata) -> Self {
        self.metadata = if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        };
        self
    }
}

impl From<Chunk> for ChunkRecord {
    fn from(chunk: Chunk) -> Self {
        Self::new(chunk.text)
    }
}
