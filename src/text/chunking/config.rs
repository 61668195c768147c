//! Configuration for the splitters and the chopper

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Separators tried by the recursive splitter, coarsest first
pub const DEFAULT_SEPARATORS: [&str; 6] = ["\n\n", "\n", " ", ".", ",", ""];

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Deepest markdown heading level
pub const MAX_HEADER_LEVEL: usize = 6;

static MARKDOWN_HEADER_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-6])-([1-6])$").expect("valid header range regex"));

/// Configuration for the recursive character splitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveSplitterConfig {
    /// Maximum characters per chunk
    pub chunk_size: usize,
    /// Maximum characters shared by consecutive chunks
    pub chunk_overlap: usize,
    /// Split boundaries, coarsest first; "" splits between characters
    pub separators: Vec<String>,
    /// Trim leading and trailing whitespace of emitted chunks
    pub strip_whitespace: bool,
}

impl Default for RecursiveSplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: 0,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            strip_whitespace: true,
        }
    }
}

impl RecursiveSplitterConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: Vec<String>) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators,
            ..Default::default()
        }
    }

    /// Keep chunks byte-exact instead of trimming them
    pub fn keep_whitespace(mut self) -> Self {
        self.strip_whitespace = false;
        self
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        validate_window(self.chunk_size, self.chunk_overlap)?;
        if self.separators.is_empty() {
            return Err("separators must not be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration for the markdown header splitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSplitterConfig {
    /// (marker, label) pairs such as ("##", "Header 2"), shallowest first
    pub headers_to_split_on: Vec<(String, String)>,
    /// Leave heading lines out of chunk bodies
    pub strip_headers: bool,
}

impl Default for HeaderSplitterConfig {
    fn default() -> Self {
        Self {
            headers_to_split_on: Self::headers_for_levels(1..=MAX_HEADER_LEVEL),
            strip_headers: true,
        }
    }
}

impl HeaderSplitterConfig {
    pub fn new(headers_to_split_on: Vec<(String, String)>, strip_headers: bool) -> Self {
        Self {
            headers_to_split_on,
            strip_headers,
        }
    }

    /// Build ("#" * level, "Header {level}") pairs
    pub fn headers_for_levels(levels: impl IntoIterator<Item = usize>) -> Vec<(String, String)> {
        levels
            .into_iter()
            .map(|level| ("#".repeat(level), format!("Header {level}")))
            .collect()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.headers_to_split_on.is_empty() {
            return Err("headers_to_split_on must not be empty".to_string());
        }

        let mut previous = 0;
        for (marker, label) in &self.headers_to_split_on {
            let level = marker.len();
            if level == 0 || level > MAX_HEADER_LEVEL || !marker.chars().all(|c| c == '#') {
                return Err(format!(
                    "invalid heading marker '{marker}' for '{label}', expected 1 to {MAX_HEADER_LEVEL} '#' characters"
                ));
            }
            if level == previous {
                return Err(format!("duplicate heading level {level} ('{marker}')"));
            }
            if level < previous {
                return Err(format!(
                    "headers_to_split_on must be ordered from shallow to deep, '{marker}' follows level {previous}"
                ));
            }
            previous = level;
        }
        Ok(())
    }
}

/// Configuration for fixed-count windows over characters, words or sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowChunkingConfig {
    /// Units per chunk
    pub chunk_size: usize,
    /// Units repeated at the start of the next chunk
    pub overlap: usize,
}

impl WindowChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Units to advance between windows
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_window(self.chunk_size, self.overlap)
    }
}

fn validate_window(chunk_size: usize, overlap: usize) -> Result<(), String> {
    if chunk_size == 0 {
        return Err("chunk size must be greater than 0".to_string());
    }
    if overlap >= chunk_size {
        return Err(format!(
            "overlap ({overlap}) must be less than chunk size ({chunk_size})"
        ));
    }
    Ok(())
}

/// Reject any path containing `..`, including inside a file name
pub fn validate_path(path: &Path) -> Result<(), String> {
    let raw = path.to_string_lossy();
    if raw.contains("..") {
        return Err(format!("path traversal detected: {raw}"));
    }
    Ok(())
}

/// Chunking strategy selected by the chopper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMethod {
    Char,
    Word,
    Sentence,
    #[default]
    Recursive,
    Markdown,
}

impl ChunkMethod {
    pub const ALL: [ChunkMethod; 5] = [
        ChunkMethod::Char,
        ChunkMethod::Word,
        ChunkMethod::Sentence,
        ChunkMethod::Recursive,
        ChunkMethod::Markdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkMethod::Char => "char",
            ChunkMethod::Word => "word",
            ChunkMethod::Sentence => "sentence",
            ChunkMethod::Recursive => "recursive",
            ChunkMethod::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ChunkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("invalid chunking method: '{s}'"))
    }
}

/// Post-processing applied to every chunk before it is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningMode {
    #[default]
    None,
    Trim,
    Normal,
    Aggressive,
}

impl CleaningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningMode::None => "none",
            CleaningMode::Trim => "trim",
            CleaningMode::Normal => "normal",
            CleaningMode::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for CleaningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleaningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(CleaningMode::None),
            "trim" => Ok(CleaningMode::Trim),
            "normal" => Ok(CleaningMode::Normal),
            "aggressive" => Ok(CleaningMode::Aggressive),
            _ => Err(format!(
                "invalid cleaning mode: '{s}', expected none, trim, normal or aggressive"
            )),
        }
    }
}

/// Settings for one chopping run, from env (`CHOPDOC_*`) or the command line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChopConfig {
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub method: ChunkMethod,
    pub chunk_size: usize,
    pub overlap: usize,
    pub cleaning_mode: CleaningMode,
    /// Read stdin and write stdout instead of files
    pub piped: bool,
    /// Heading levels to split on, as "start-end"
    pub markdown_header: String,
    pub strip_headers: bool,
    pub add_metadata: bool,
    /// Override for the recursive splitter separators
    pub separators: Option<Vec<String>>,
}

impl Default for ChopConfig {
    fn default() -> Self {
        Self {
            input_file: None,
            output_file: None,
            method: ChunkMethod::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: 0,
            cleaning_mode: CleaningMode::default(),
            piped: false,
            markdown_header: "1-6".to_string(),
            strip_headers: false,
            add_metadata: false,
            separators: None,
        }
    }
}

impl ChopConfig {
    pub const ENV_PREFIX: &'static str = "CHOPDOC_";

    /// Load configuration from `CHOPDOC_*` environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(Self::ENV_PREFIX).from_env::<ChopConfig>()
    }

    /// Load configuration from explicit (name, value) pairs carrying the env prefix
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(Self::ENV_PREFIX).from_iter::<_, ChopConfig>(vars)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if !self.piped && self.input_file.is_none() {
            return Err("input file is required".to_string());
        }

        for path in self.input_file.iter().chain(self.output_file.iter()) {
            validate_path(path)?;
        }

        if let Some(output) = &self.output_file {
            if output.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                return Err("output file must have .jsonl extension".to_string());
            }
        }

        validate_window(self.chunk_size, self.overlap)?;

        if let Some(separators) = &self.separators {
            if separators.is_empty() {
                return Err("separators must not be empty".to_string());
            }
        }

        if self.method == ChunkMethod::Markdown {
            self.markdown_levels()?;
        }

        Ok(())
    }

    /// Parse `markdown_header` ("2-4") into the heading levels it covers
    pub fn markdown_levels(&self) -> Result<Vec<usize>, String> {
        let captures = MARKDOWN_HEADER_RANGE
            .captures(&self.markdown_header)
            .ok_or_else(|| {
                format!(
                    "invalid markdown header format: {}, expected format like '1-6'",
                    self.markdown_header
                )
            })?;

        // both groups are a single digit 1-6
        let start: usize = captures[1].parse().map_err(|e| format!("{e}"))?;
        let end: usize = captures[2].parse().map_err(|e| format!("{e}"))?;

        if start > end {
            return Err(format!(
                "start level ({start}) must be less than or equal to end level ({end})"
            ));
        }

        Ok((start..=end).collect())
    }

    pub fn recursive_config(&self) -> RecursiveSplitterConfig {
        let defaults = RecursiveSplitterConfig::default();
        RecursiveSplitterConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.overlap,
            separators: self.separators.clone().unwrap_or(defaults.separators),
            strip_whitespace: defaults.strip_whitespace,
        }
    }

    pub fn header_config(&self) -> Result<HeaderSplitterConfig, String> {
        Ok(HeaderSplitterConfig::new(
            HeaderSplitterConfig::headers_for_levels(self.markdown_levels()?),
            self.strip_headers,
        ))
    }

    pub fn window_config(&self) -> WindowChunkingConfig {
        WindowChunkingConfig::new(self.chunk_size, self.overlap)
    }
}

/// Statistical information for a chopping run
#[derive(Debug, Clone, Default)]
pub struct ChunkingStatistics {
    /// Total processing time
    pub total_processing_time: Duration,

    /// Input text statistics
    pub input_char_count: usize,
    pub input_line_count: usize,

    /// Output chunk statistics
    pub total_chunks_created: usize,
    pub dropped_chunks: usize,
    pub total_chunk_chars: usize,
    pub avg_chars_per_chunk: f32,
    pub max_chars_in_chunk: usize,
    pub min_chars_in_chunk: usize,

    /// Performance metrics
    pub chars_per_second: f32,
    pub chunks_per_second: f32,
}

impl ChunkingStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing for total processing
    pub fn start_total_timing(&mut self) -> Instant {
        Instant::now()
    }

    /// Finish total timing
    pub fn finish_total_timing(&mut self, start: Instant) {
        self.total_processing_time += start.elapsed();
    }

    /// Record input text statistics
    pub fn record_input_stats(&mut self, text: &str) {
        self.input_char_count += text.chars().count();
        self.input_line_count += text.lines().count();
    }

    /// Record an emitted chunk by its character count
    pub fn record_chunk(&mut self, char_count: usize) {
        self.total_chunks_created += 1;
        self.total_chunk_chars += char_count;

        if self.max_chars_in_chunk == 0 || char_count > self.max_chars_in_chunk {
            self.max_chars_in_chunk = char_count;
        }

        if self.min_chars_in_chunk == 0 || char_count < self.min_chars_in_chunk {
            self.min_chars_in_chunk = char_count;
        }
    }

    /// Record a chunk dropped as blank
    pub fn record_dropped(&mut self) {
        self.dropped_chunks += 1;
    }

    /// Calculate derived metrics (call this after all processing is complete)
    pub fn calculate_derived_metrics(&mut self) {
        if self.total_chunks_created > 0 {
            self.avg_chars_per_chunk =
                self.total_chunk_chars as f32 / self.total_chunks_created as f32;
        }

        let total_seconds = self.total_processing_time.as_secs_f32();
        if total_seconds > 0.0 {
            self.chars_per_second = self.input_char_count as f32 / total_seconds;
            self.chunks_per_second = self.total_chunks_created as f32 / total_seconds;
        }
    }

    /// Get summary as string for logging
    pub fn summary(&self) -> String {
        format!(
            "Chunking Stats: {} chars ({} lines) -> {} chunks ({:.1} avg chars/chunk, min {}, max {}, {} dropped) in {}ms | \
            Speed: {:.0} chars/s, {:.1} chunks/s",
            self.input_char_count,
            self.input_line_count,
            self.total_chunks_created,
            self.avg_chars_per_chunk,
            self.min_chars_in_chunk,
            self.max_chars_in_chunk,
            self.dropped_chunks,
            self.total_processing_time.as_millis(),
            self.chars_per_second,
            self.chunks_per_second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recursive_config() {
        let config = RecursiveSplitterConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 0);
        assert_eq!(config.separators, vec!["\n\n", "\n", " ", ".", ",", ""]);
        assert!(config.strip_whitespace);
        assert!(config.validate().is_ok());
        assert!(!config.keep_whitespace().strip_whitespace);
    }

    #[test]
    fn test_recursive_config_validation() {
        let mut config = RecursiveSplitterConfig::new(10, 2, vec![" ".to_string()]);
        assert!(config.validate().is_ok());

        config.chunk_size = 0;
        assert!(config.validate().is_err());

        config.chunk_size = 10;
        config.chunk_overlap = 10;
        assert!(config.validate().is_err());

        config.chunk_overlap = 9;
        assert!(config.validate().is_ok());

        config.separators.clear();
        assert_eq!(
            config.validate(),
            Err("separators must not be empty".to_string())
        );
    }

    #[test]
    fn test_header_config_validation() {
        let config = HeaderSplitterConfig::default();
        assert_eq!(config.headers_to_split_on.len(), 6);
        assert_eq!(
            config.headers_to_split_on[2],
            ("###".to_string(), "Header 3".to_string())
        );
        assert!(config.validate().is_ok());

        let pairs = |markers: &[&str]| {
            markers
                .iter()
                .map(|m| (m.to_string(), format!("Header {}", m.len())))
                .collect::<Vec<_>>()
        };

        assert!(HeaderSplitterConfig::new(pairs(&["#", "###"]), true).validate().is_ok());
        assert!(HeaderSplitterConfig::new(pairs(&["#", "#"]), true).validate().is_err());
        assert!(HeaderSplitterConfig::new(pairs(&["##", "#"]), true).validate().is_err());
        assert!(HeaderSplitterConfig::new(pairs(&["#", "#######"]), true).validate().is_err());
        assert!(HeaderSplitterConfig::new(pairs(&["-"]), true).validate().is_err());
        assert!(HeaderSplitterConfig::new(pairs(&[""]), true).validate().is_err());
        assert!(HeaderSplitterConfig::new(vec![], true).validate().is_err());
    }

    #[test]
    fn test_window_config() {
        let config = WindowChunkingConfig::new(10, 3);
        assert_eq!(config.stride(), 7);
        assert!(config.validate().is_ok());
        assert!(WindowChunkingConfig::new(0, 0).validate().is_err());
        assert!(WindowChunkingConfig::new(3, 3).validate().is_err());
    }

    #[test]
    fn test_method_and_cleaning_parse() {
        for method in ChunkMethod::ALL {
            assert_eq!(method.as_str().parse::<ChunkMethod>(), Ok(method));
        }
        assert_eq!(
            "paragraph".parse::<ChunkMethod>(),
            Err("invalid chunking method: 'paragraph'".to_string())
        );
        assert_eq!(ChunkMethod::default(), ChunkMethod::Recursive);

        assert_eq!("aggressive".parse::<CleaningMode>(), Ok(CleaningMode::Aggressive));
        assert_eq!("trim".parse::<CleaningMode>(), Ok(CleaningMode::Trim));
        assert!("loud".parse::<CleaningMode>().is_err());
        assert_eq!(CleaningMode::Normal.to_string(), "normal");
    }

    #[test]
    fn test_chop_config_validation() {
        let mut config = ChopConfig::default();
        assert_eq!(
            config.validate(),
            Err("input file is required".to_string())
        );

        config.piped = true;
        assert!(config.validate().is_ok());

        config.output_file = Some(PathBuf::from("out.json"));
        assert_eq!(
            config.validate(),
            Err("output file must have .jsonl extension".to_string())
        );

        config.output_file = Some(PathBuf::from("out.jsonl"));
        config.overlap = config.chunk_size;
        assert!(config.validate().is_err());

        config.overlap = 0;
        config.separators = Some(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_path() {
        let cases = [
            ("test.txt", None),
            ("/tmp/test.txt", None),
            ("subdir/test.txt", None),
            ("", None),
            ("../test.txt", Some("path traversal detected: ../test.txt")),
            ("../../etc/passwd", Some("path traversal detected: ../../etc/passwd")),
            ("some/../other/file.txt", Some("path traversal detected: some/../other/file.txt")),
            ("some/path/..", Some("path traversal detected: some/path/..")),
            ("../../../root/.ssh/id_rsa", Some("path traversal detected: ../../../root/.ssh/id_rsa")),
            (r"..\..\windows\system32", Some(r"path traversal detected: ..\..\windows\system32")),
            (r"../some\path/file.txt", Some(r"path traversal detected: ../some\path/file.txt")),
            ("%2e%2e/etc/passwd", None),
            ("．．/etc/passwd", None),
            ("my..file.txt", Some("path traversal detected: my..file.txt")),
            ("..", Some("path traversal detected: ..")),
            ("./test.txt", None),
            (".hidden", None),
            ("test.tar.gz", None),
        ];

        for (path, expected) in cases {
            assert_eq!(
                validate_path(Path::new(path)),
                expected.map_or(Ok(()), |msg| Err(msg.to_string())),
                "path: {path}"
            );
        }
    }

    #[test]
    fn test_chop_config_rejects_traversal() {
        let config = ChopConfig {
            input_file: Some(PathBuf::from("../../etc/passwd")),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err("path traversal detected: ../../etc/passwd".to_string())
        );

        let config = ChopConfig {
            input_file: Some(PathBuf::from("doc.md")),
            output_file: Some(PathBuf::from("my..out.jsonl")),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err("path traversal detected: my..out.jsonl".to_string())
        );

        let config = ChopConfig {
            input_file: Some(PathBuf::from("./docs/.hidden.md")),
            output_file: Some(PathBuf::from("out.jsonl")),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_markdown_levels() {
        let mut config = ChopConfig {
            method: ChunkMethod::Markdown,
            piped: true,
            ..Default::default()
        };
        assert_eq!(config.markdown_levels(), Ok(vec![1, 2, 3, 4, 5, 6]));

        config.markdown_header = "2-4".to_string();
        assert_eq!(config.markdown_levels(), Ok(vec![2, 3, 4]));
        let headers = config.header_config().unwrap();
        assert_eq!(headers.headers_to_split_on[0].0, "##");
        assert_eq!(headers.headers_to_split_on[2].1, "Header 4");
        assert!(!headers.strip_headers);

        config.markdown_header = "4-2".to_string();
        assert!(config.validate().is_err());

        config.markdown_header = "1-7".to_string();
        assert!(config.markdown_levels().is_err());

        config.markdown_header = "h1".to_string();
        assert!(config.markdown_levels().is_err());
    }

    #[test]
    fn test_chop_config_from_vars() {
        let vars = vec![
            ("CHOPDOC_INPUT_FILE".to_string(), "doc.md".to_string()),
            ("CHOPDOC_METHOD".to_string(), "markdown".to_string()),
            ("CHOPDOC_CHUNK_SIZE".to_string(), "60".to_string()),
            ("CHOPDOC_OVERLAP".to_string(), "10".to_string()),
            ("CHOPDOC_CLEANING_MODE".to_string(), "normal".to_string()),
            ("CHOPDOC_ADD_METADATA".to_string(), "true".to_string()),
            ("UNRELATED".to_string(), "1".to_string()),
        ];
        let config = ChopConfig::from_vars(vars).unwrap();

        assert_eq!(config.input_file, Some(PathBuf::from("doc.md")));
        assert_eq!(config.method, ChunkMethod::Markdown);
        assert_eq!(config.chunk_size, 60);
        assert_eq!(config.overlap, 10);
        assert_eq!(config.cleaning_mode, CleaningMode::Normal);
        assert!(config.add_metadata);
        assert!(!config.strip_headers);
        assert_eq!(config.markdown_header, "1-6");
        assert!(config.validate().is_ok());

        let recursive = config.recursive_config();
        assert_eq!(recursive.chunk_size, 60);
        assert_eq!(recursive.chunk_overlap, 10);
        assert_eq!(recursive.separators.len(), DEFAULT_SEPARATORS.len());
    }

    #[test]
    fn test_chunking_statistics() {
        let mut stats = ChunkingStatistics::new();

        let text = "Sample text\nfor testing";
        stats.record_input_stats(text);
        assert_eq!(stats.input_char_count, 23);
        assert_eq!(stats.input_line_count, 2);

        stats.record_chunk(50);
        stats.record_chunk(75);
        stats.record_dropped();
        stats.total_processing_time = Duration::from_millis(10);
        stats.calculate_derived_metrics();

        assert_eq!(stats.total_chunks_created, 2);
        assert_eq!(stats.dropped_chunks, 1);
        assert_eq!(stats.avg_chars_per_chunk, 62.5);
        assert_eq!(stats.max_chars_in_chunk, 75);
        assert_eq!(stats.min_chars_in_chunk, 50);
        assert!(stats.chunks_per_second > 0.0);

        let summary = stats.summary();
        assert!(summary.contains("2 chunks"));
        assert!(summary.contains("62.5"));
    }
}
