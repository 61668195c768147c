//! Text chunking for indexing and embedding pipelines
//!
//! Two structural splitters (recursive separators and markdown headings) plus
//! fixed-window choppers over characters, words and sentences, all driven
//! through [`Chopper`].

pub mod chunker;
pub mod config;
pub mod error;
pub mod markdown;
pub mod recursive;
pub mod sliding_window;
pub mod types;

// Re-export main public interfaces
pub use chunker::{Chopper, HeaderChopper, TextChopper};
pub use config::{
    ChopConfig, ChunkMethod, ChunkingStatistics, CleaningMode, HeaderSplitterConfig,
    RecursiveSplitterConfig, WindowChunkingConfig,
};
pub use error::{ChunkingError, Result};
pub use markdown::HeaderSplitter;
pub use recursive::RecursiveSplitter;
pub use sliding_window::{CharacterSplitter, SentenceChunker, SlidingWindowCalculator, WordSplitter};
pub use types::{Chunk, ChunkRecord, HeaderChunk, HeaderMetadata};
