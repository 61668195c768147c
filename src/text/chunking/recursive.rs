//! Recursive character splitter
//!
//! Breaks text on the coarsest separator that occurs in it, merges the pieces
//! back into chunks of at most `chunk_size` characters, and descends to finer
//! separators only for pieces that are still too large.

use super::{
    config::RecursiveSplitterConfig,
    error::{ChunkingError, Result},
    types::Chunk,
};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// A contiguous slice of the source with its character position
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    text: &'a str,
    char_start: usize,
    char_len: usize,
}

/// Size- and separator-driven splitter with overlap between chunks
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    config: RecursiveSplitterConfig,
}

impl RecursiveSplitter {
    /// Create a splitter, rejecting invalid sizes or an empty separator list
    pub fn new(config: RecursiveSplitterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(ChunkingError::invalid_configuration)?;
        Ok(Self { config })
    }

    /// Shorthand for `new` with explicit parameters
    pub fn with_params(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: &[&str],
    ) -> Result<Self> {
        Self::new(RecursiveSplitterConfig::new(
            chunk_size,
            chunk_overlap,
            separators.iter().map(|s| s.to_string()).collect(),
        ))
    }

    pub fn config(&self) -> &RecursiveSplitterConfig {
        &self.config
    }

    /// Split text into chunks in document order
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        if text.is_empty() {
            return chunks;
        }
        self.split_recursive(text, 0, &self.config.separators, &mut chunks);
        debug!(
            "Recursive split of {} bytes produced {} chunks",
            text.len(),
            chunks.len()
        );
        chunks
    }

    fn split_recursive(
        &self,
        text: &str,
        char_offset: usize,
        separators: &[String],
        chunks: &mut Vec<Chunk>,
    ) {
        let (separator, finer) = Self::select_separator(text, separators);
        let pieces = Self::split_pieces(text, char_offset, separator);

        let mut fitting: Vec<Piece> = Vec::new();
        for piece in pieces {
            if piece.char_len <= self.config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                self.merge_pieces(&fitting, chunks);
                fitting.clear();
            }

            if finer.is_empty() {
                warn!(
                    "Emitting unsplittable piece of {} chars (chunk_size={})",
                    piece.char_len, self.config.chunk_size
                );
                self.emit(piece.text.to_string(), piece.char_start, chunks);
            } else {
                self.split_recursive(piece.text, piece.char_start, finer, chunks);
            }
        }

        if !fitting.is_empty() {
            self.merge_pieces(&fitting, chunks);
        }
    }

    /// Pick the first separator present in `text`; "" always applies
    fn select_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
        let exhausted: &'s [String] = &[];
        for (i, separator) in separators.iter().enumerate() {
            if separator.is_empty() {
                return (separator.as_str(), exhausted);
            }
            if text.contains(separator.as_str()) {
                return (separator.as_str(), &separators[i + 1..]);
            }
        }
        // none occurs: the text stays whole and cannot be refined further
        let last = separators.last().map(String::as_str).unwrap_or("");
        (last, exhausted)
    }

    /// Split keeping each separator attached to the end of its piece
    fn split_pieces<'a>(text: &'a str, char_offset: usize, separator: &str) -> Vec<Piece<'a>> {
        let mut pieces = Vec::new();
        let mut char_start = char_offset;

        if separator.is_empty() {
            for (i, c) in text.char_indices() {
                pieces.push(Piece {
                    text: &text[i..i + c.len_utf8()],
                    char_start,
                    char_len: 1,
                });
                char_start += 1;
            }
            return pieces;
        }

        for part in text.split_inclusive(separator) {
            let char_len = part.chars().count();
            pieces.push(Piece {
                text: part,
                char_start,
                char_len,
            });
            char_start += char_len;
        }
        pieces
    }

    /// Greedily merge pieces into chunks, carrying a suffix of each chunk into the next
    fn merge_pieces(&self, pieces: &[Piece], chunks: &mut Vec<Chunk>) {
        let chunk_size = self.config.chunk_size;
        let chunk_overlap = self.config.chunk_overlap;

        let mut window: VecDeque<Piece> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            if total + piece.char_len > chunk_size && !window.is_empty() {
                self.emit_window(&window, chunks);

                while total > chunk_overlap || (total > 0 && total + piece.char_len > chunk_size)
                {
                    match window.pop_front() {
                        Some(dropped) => total -= dropped.char_len,
                        None => break,
                    }
                }
            }

            window.push_back(*piece);
            total += piece.char_len;
        }

        if !window.is_empty() {
            self.emit_window(&window, chunks);
        }
    }

    fn emit_window(&self, window: &VecDeque<Piece>, chunks: &mut Vec<Chunk>) {
        let Some(first) = window.front() else {
            return;
        };
        let text: String = window.iter().map(|p| p.text).collect();
        self.emit(text, first.char_start, chunks);
    }

    fn emit(&self, text: String, char_start: usize, chunks: &mut Vec<Chunk>) {
        if text.trim().is_empty() {
            debug!("Dropping blank chunk at char {}", char_start);
            return;
        }

        let char_len = text.chars().count();
        if !self.config.strip_whitespace {
            chunks.push(Chunk::new(text, char_start, char_start + char_len));
            return;
        }

        let leading = char_len - text.trim_start().chars().count();
        let trimmed = text.trim();
        let start = char_start + leading;
        let end = start + trimmed.chars().count();
        chunks.push(Chunk::new(trimmed.to_string(), start, end));
    }
}
