//! Sliding window utilities for text processing
//!
//! A single position calculator drives the fixed-count choppers over
//! characters, words and sentences.

use super::{
    config::WindowChunkingConfig,
    error::{ChunkingError, Result},
};
use crate::text::SentenceSplitter;
use itertools::Itertools;
use tracing::debug;

/// Core sliding window calculation algorithm
pub struct SlidingWindowCalculator;

impl SlidingWindowCalculator {
    /// Calculate sliding window positions
    ///
    /// # Arguments
    /// * `length` - Number of units in the input
    /// * `window_size` - Units per window
    /// * `stride` - Step size between window starts
    ///
    /// # Returns
    /// Vector of (start_pos, end_pos) tuples: every full window, then the
    /// units left over after the last full one. Empty when any argument is
    /// zero.
    pub fn calculate_windows(length: usize, window_size: usize, stride: usize) -> Vec<(usize, usize)> {
        let mut positions = Vec::new();
        if length == 0 || window_size == 0 || stride == 0 {
            return positions;
        }

        let mut start_pos = 0;
        while start_pos < length {
            let end_pos = std::cmp::min(start_pos + window_size, length);
            positions.push((start_pos, end_pos));

            // a short window holds the remainder
            if start_pos + window_size > length {
                break;
            }
            start_pos += stride;
        }

        positions
    }
}

fn validated(config: WindowChunkingConfig) -> Result<WindowChunkingConfig> {
    config
        .validate()
        .map_err(ChunkingError::invalid_configuration)?;
    Ok(config)
}

fn join_windows(units: &[&str], config: &WindowChunkingConfig) -> Vec<String> {
    SlidingWindowCalculator::calculate_windows(units.len(), config.chunk_size, config.stride())
        .into_iter()
        .map(|(start, end)| units[start..end].iter().join(" "))
        .collect()
}

/// Windows of `chunk_size` characters
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    config: WindowChunkingConfig,
}

impl CharacterSplitter {
    pub fn new(config: WindowChunkingConfig) -> Result<Self> {
        Ok(Self {
            config: validated(config)?,
        })
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let windows = SlidingWindowCalculator::calculate_windows(
            chars.len(),
            self.config.chunk_size,
            self.config.stride(),
        );
        debug!("Character windows: {} over {} chars", windows.len(), chars.len());

        windows
            .into_iter()
            .map(|(start, end)| chars[start..end].iter().collect())
            .collect()
    }
}

/// Windows of `chunk_size` whitespace-separated words, joined by single spaces
#[derive(Debug, Clone)]
pub struct WordSplitter {
    config: WindowChunkingConfig,
}

impl WordSplitter {
    pub fn new(config: WindowChunkingConfig) -> Result<Self> {
        Ok(Self {
            config: validated(config)?,
        })
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        debug!("Word windows over {} words", words.len());
        join_windows(&words, &self.config)
    }
}

/// Windows of `chunk_size` sentences, joined by single spaces
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    config: WindowChunkingConfig,
}

impl SentenceChunker {
    pub fn new(config: WindowChunkingConfig) -> Result<Self> {
        Ok(Self {
            config: validated(config)?,
        })
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let sentences = SentenceSplitter::split(text);
        debug!("Sentence windows over {} sentences", sentences.len());
        join_windows(&sentences, &self.config)
    }
}
