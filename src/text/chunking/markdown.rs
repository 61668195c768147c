//! Markdown header splitter
//!
//! Cuts a document at heading lines and tags every section with the chain of
//! headings above it. Only the configured heading levels split; any other `#`
//! run is ordinary content.

use super::{
    config::HeaderSplitterConfig,
    error::{ChunkingError, Result},
    types::{HeaderChunk, HeaderMetadata},
};
use tracing::debug;

const FENCE_CHARS: [char; 2] = ['`', '~'];
const MIN_FENCE_LEN: usize = 3;

/// Opening line of a fenced code block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// A line of at least three backticks or tildes opens a fence
    fn open(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| FENCE_CHARS.contains(c))?;
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        (len >= MIN_FENCE_LEN).then_some(Self { marker, len })
    }

    /// Closed by a run of the same character at least as long, with no info string
    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let len = trimmed.chars().take_while(|&c| c == self.marker).count();
        len >= self.len && len == trimmed.chars().count()
    }
}

/// Heading currently in effect at one level
#[derive(Debug, Clone)]
struct ActiveHeader<'a> {
    level: usize,
    label: &'a str,
    text: String,
}

/// Heading-hierarchy splitter with per-chunk metadata
#[derive(Debug, Clone)]
pub struct HeaderSplitter {
    config: HeaderSplitterConfig,
}

impl HeaderSplitter {
    pub fn new(config: HeaderSplitterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(ChunkingError::invalid_configuration)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HeaderSplitterConfig {
        &self.config
    }

    /// Split text into sections in document order
    pub fn split(&self, text: &str) -> Vec<HeaderChunk> {
        let mut chunks = Vec::new();
        let mut active: Vec<ActiveHeader> = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        let mut open_fence: Option<Fence> = None;

        for line in text.lines() {
            if let Some(fence) = open_fence {
                if fence.closes(line) {
                    open_fence = None;
                }
                buffer.push(line);
                continue;
            }
            if let Some(fence) = Fence::open(line) {
                open_fence = Some(fence);
                buffer.push(line);
                continue;
            }

            match self.parse_heading(line) {
                Some((level, label, heading)) => {
                    Self::flush(&mut buffer, &active, &mut chunks);
                    active.retain(|header| header.level < level);
                    active.push(ActiveHeader {
                        level,
                        label,
                        text: heading.to_string(),
                    });
                    if !self.config.strip_headers {
                        buffer.push(line);
                    }
                }
                None => buffer.push(line),
            }
        }
        Self::flush(&mut buffer, &active, &mut chunks);

        debug!(
            "Header split of {} bytes produced {} sections",
            text.len(),
            chunks.len()
        );
        chunks
    }

    /// Match a line against the configured markers, returning level, label and heading text
    fn parse_heading<'s>(&'s self, line: &'s str) -> Option<(usize, &'s str, &'s str)> {
        let trimmed = line.trim_start();
        let level = trimmed.chars().take_while(|&c| c == '#').count();
        if level == 0 {
            return None;
        }
        let rest = &trimmed[level..];
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let heading = rest.trim();
        if heading.is_empty() {
            return None;
        }

        self.config
            .headers_to_split_on
            .iter()
            .find(|(marker, _)| marker.len() == level)
            .map(|(_, label)| (level, label.as_str(), heading))
    }

    fn flush(buffer: &mut Vec<&str>, active: &[ActiveHeader], chunks: &mut Vec<HeaderChunk>) {
        let lines = std::mem::take(buffer);
        let first = lines.iter().position(|line| !line.trim().is_empty());
        let last = lines.iter().rposition(|line| !line.trim().is_empty());
        let (Some(first), Some(last)) = (first, last) else {
            if !lines.is_empty() {
                debug!("Discarding section without content");
            }
            return;
        };

        let metadata: HeaderMetadata = active
            .iter()
            .map(|header| (header.label.to_string(), header.text.clone()))
            .collect();
        chunks.push(HeaderChunk::new(lines[first..=last].join("\n"), metadata));
    }
}
