//! Strategy dispatch, cleaning and statistics over the individual splitters

use super::{
    config::{ChopConfig, ChunkMethod, ChunkingStatistics, CleaningMode},
    error::{ChunkingError, Result},
    markdown::HeaderSplitter,
    recursive::RecursiveSplitter,
    sliding_window::{CharacterSplitter, SentenceChunker, WordSplitter},
    types::ChunkRecord,
};
use crate::text::TextCleaner;
use tracing::{debug, info, warn};

/// A chunking strategy producing output records in document order
pub trait TextChopper: Send + Sync {
    fn name(&self) -> &'static str;
    fn chop(&self, text: &str) -> Vec<ChunkRecord>;
}

impl TextChopper for CharacterSplitter {
    fn name(&self) -> &'static str {
        ChunkMethod::Char.as_str()
    }

    fn chop(&self, text: &str) -> Vec<ChunkRecord> {
        self.split(text).into_iter().map(ChunkRecord::new).collect()
    }
}

impl TextChopper for WordSplitter {
    fn name(&self) -> &'static str {
        ChunkMethod::Word.as_str()
    }

    fn chop(&self, text: &str) -> Vec<ChunkRecord> {
        self.split(text).into_iter().map(ChunkRecord::new).collect()
    }
}

impl TextChopper for SentenceChunker {
    fn name(&self) -> &'static str {
        ChunkMethod::Sentence.as_str()
    }

    fn chop(&self, text: &str) -> Vec<ChunkRecord> {
        self.split(text).into_iter().map(ChunkRecord::new).collect()
    }
}

impl TextChopper for RecursiveSplitter {
    fn name(&self) -> &'static str {
        ChunkMethod::Recursive.as_str()
    }

    fn chop(&self, text: &str) -> Vec<ChunkRecord> {
        self.split(text).into_iter().map(ChunkRecord::from).collect()
    }
}

/// Header splitter whose metadata is written only on request
#[derive(Debug, Clone)]
pub struct HeaderChopper {
    splitter: HeaderSplitter,
    add_metadata: bool,
}

impl HeaderChopper {
    pub fn new(splitter: HeaderSplitter, add_metadata: bool) -> Self {
        Self {
            splitter,
            add_metadata,
        }
    }
}

impl TextChopper for HeaderChopper {
    fn name(&self) -> &'static str {
        ChunkMethod::Markdown.as_str()
    }

    fn chop(&self, text: &str) -> Vec<ChunkRecord> {
        self.splitter
            .split(text)
            .into_iter()
            .map(|chunk| {
                let record = ChunkRecord::new(chunk.text);
                if self.add_metadata {
                    record.with_metadata(chunk.metadata)
                } else {
                    record
                }
            })
            .collect()
    }
}

/// Runs one configured strategy and post-processes its chunks
pub struct Chopper {
    strategy: Box<dyn TextChopper>,
    cleaning_mode: CleaningMode,
    /// Performance and statistics tracking
    statistics: ChunkingStatistics,
}

impl Chopper {
    /// Build the strategy selected by `config.method`
    ///
    /// Only chunking parameters are checked here; input and output paths are
    /// the pipeline's concern.
    pub fn new(config: &ChopConfig) -> Result<Self> {
        let strategy: Box<dyn TextChopper> = match config.method {
            ChunkMethod::Char => Box::new(CharacterSplitter::new(config.window_config())?),
            ChunkMethod::Word => Box::new(WordSplitter::new(config.window_config())?),
            ChunkMethod::Sentence => Box::new(SentenceChunker::new(config.window_config())?),
            ChunkMethod::Recursive => Box::new(RecursiveSplitter::new(config.recursive_config())?),
            ChunkMethod::Markdown => {
                let header_config = config
                    .header_config()
                    .map_err(ChunkingError::invalid_configuration)?;
                Box::new(HeaderChopper::new(
                    HeaderSplitter::new(header_config)?,
                    config.add_metadata,
                ))
            }
        };
        debug!(
            "Created {} chopper (size {}, overlap {}, cleaning {})",
            strategy.name(),
            config.chunk_size,
            config.overlap,
            config.cleaning_mode
        );

        Ok(Self::with_strategy(strategy, config.cleaning_mode))
    }

    /// Wrap an already built strategy
    pub fn with_strategy(strategy: Box<dyn TextChopper>, cleaning_mode: CleaningMode) -> Self {
        Self {
            strategy,
            cleaning_mode,
            statistics: ChunkingStatistics::new(),
        }
    }

    /// Chop text into cleaned, non-blank records
    pub fn chop(&mut self, text: &str) -> Vec<ChunkRecord> {
        debug!(
            "Starting {} chopping for text of {} bytes",
            self.strategy.name(),
            text.len()
        );
        let total_start = self.statistics.start_total_timing();
        self.statistics.record_input_stats(text);

        let mut records = Vec::new();
        let mut dropped = 0;
        for mut record in self.strategy.chop(text) {
            record.text = TextCleaner::clean(&record.text, self.cleaning_mode);
            if record.text.trim().is_empty() {
                dropped += 1;
                self.statistics.record_dropped();
                continue;
            }
            self.statistics.record_chunk(record.text.chars().count());
            records.push(record);
        }

        if dropped > 0 {
            warn!("Dropped {} blank chunks after cleaning", dropped);
        }

        self.statistics.finish_total_timing(total_start);
        self.statistics.calculate_derived_metrics();
        info!(
            "Chopped {} chars into {} chunks with {} method",
            text.chars().count(),
            records.len(),
            self.strategy.name()
        );
        debug!("{}", self.statistics.summary());

        records
    }

    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn cleaning_mode(&self) -> CleaningMode {
        self.cleaning_mode
    }

    /// Get chunking statistics
    pub fn statistics(&self) -> &ChunkingStatistics {
        &self.statistics
    }

    /// Reset statistics
    pub fn reset_statistics(&mut self) {
        self.statistics = ChunkingStatistics::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(method: ChunkMethod, chunk_size: usize, overlap: usize) -> ChopConfig {
        ChopConfig {
            method,
            chunk_size,
            overlap,
            ..Default::default()
        }
    }

    fn texts(records: &[ChunkRecord]) -> Vec<&str> {
        records.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_chopper_creation() {
        for method in ChunkMethod::ALL {
            let chopper = Chopper::new(&config(method, 100, 10)).unwrap();
            assert_eq!(chopper.name(), method.as_str());
            assert_eq!(chopper.cleaning_mode(), CleaningMode::None);
        }
    }

    #[test]
    fn test_recursive_chopping() {
        let mut chopper = Chopper::new(&config(ChunkMethod::Recursive, 5, 0)).unwrap();
        let records = chopper.chop("aaaa bbbb cccc");

        assert_eq!(texts(&records), vec!["aaaa", "bbbb", "cccc"]);
        assert!(records.iter().all(|r| r.metadata.is_none()));
    }

    #[test]
    fn test_custom_separators() {
        let mut config = config(ChunkMethod::Recursive, 3, 0);
        config.separators = Some(vec!["|".to_string()]);
        let mut chopper = Chopper::new(&config).unwrap();

        assert_eq!(texts(&chopper.chop("ab|cd|ef")), vec!["ab|", "cd|", "ef"]);
    }

    #[test]
    fn test_window_chopping() {
        let mut chopper = Chopper::new(&config(ChunkMethod::Char, 4, 2)).unwrap();
        assert_eq!(
            texts(&chopper.chop("aaaaaaaaaa")),
            vec!["aaaa", "aaaa", "aaaa", "aaaa", "aa"]
        );

        let mut chopper = Chopper::new(&config(ChunkMethod::Word, 2, 0)).unwrap();
        assert_eq!(texts(&chopper.chop("a b c d e")), vec!["a b", "c d", "e"]);

        let mut chopper = Chopper::new(&config(ChunkMethod::Sentence, 1, 0)).unwrap();
        assert_eq!(texts(&chopper.chop("One. Two! Three")), vec!["One.", "Two!", "Three"]);
    }

    #[test]
    fn test_markdown_metadata_on_request() {
        let text = "# A\nbody1\n## B\nbody2";
        let mut config = ChopConfig {
            method: ChunkMethod::Markdown,
            markdown_header: "1-2".to_string(),
            strip_headers: true,
            ..Default::default()
        };

        let records = Chopper::new(&config).unwrap().chop(text);
        assert_eq!(texts(&records), vec!["body1", "body2"]);
        assert!(records.iter().all(|r| r.metadata.is_none()));

        config.add_metadata = true;
        let records = Chopper::new(&config).unwrap().chop(text);
        let metadata = records[1].metadata.as_ref().unwrap();
        assert_eq!(metadata.get("Header 1").map(String::as_str), Some("A"));
        assert_eq!(metadata.get("Header 2").map(String::as_str), Some("B"));
    }

    #[test]
    fn test_markdown_level_range() {
        let config = ChopConfig {
            method: ChunkMethod::Markdown,
            markdown_header: "2-3".to_string(),
            strip_headers: true,
            ..Default::default()
        };
        let records = Chopper::new(&config).unwrap().chop("# Title\nintro\n## Part\nbody");

        assert_eq!(texts(&records), vec!["# Title\nintro", "body"]);
    }

    #[test]
    fn test_cleaning_drops_blank_chunks() {
        let mut config = config(ChunkMethod::Char, 4, 0);
        config.cleaning_mode = CleaningMode::Trim;
        let mut chopper = Chopper::new(&config).unwrap();
        let records = chopper.chop("ab      cd");

        assert_eq!(texts(&records), vec!["ab", "cd"]);
        let stats = chopper.statistics();
        assert_eq!(stats.total_chunks_created, 2);
        assert_eq!(stats.dropped_chunks, 1);
        assert_eq!(stats.input_char_count, 10);
        assert_eq!(stats.min_chars_in_chunk, 2);
        assert_eq!(stats.max_chars_in_chunk, 2);
    }

    #[test]
    fn test_blank_chunks_dropped_without_cleaning() {
        let mut chopper = Chopper::new(&config(ChunkMethod::Char, 4, 0)).unwrap();
        let records = chopper.chop("ab      cd");

        assert_eq!(texts(&records), vec!["ab  ", "cd"]);
        assert_eq!(chopper.statistics().dropped_chunks, 1);

        // untouched whitespace survives at either end of a kept chunk
        let records = chopper.chop("ab        cd");
        assert_eq!(texts(&records), vec!["ab  ", "  cd"]);
        assert_eq!(chopper.statistics().dropped_chunks, 2);
    }

    #[test]
    fn test_aggressive_cleaning() {
        let mut config = config(ChunkMethod::Recursive, 100, 0);
        config.cleaning_mode = CleaningMode::Aggressive;
        let mut chopper = Chopper::new(&config).unwrap();

        assert_eq!(
            texts(&chopper.chop("line one\n\n\tline\u{a0}two")),
            vec!["line one line two"]
        );
    }

    #[test]
    fn test_statistics_accumulate_and_reset() {
        let mut chopper = Chopper::new(&config(ChunkMethod::Word, 2, 0)).unwrap();
        chopper.chop("a b c");
        chopper.chop("d e");

        assert_eq!(chopper.statistics().total_chunks_created, 3);
        assert_eq!(chopper.statistics().input_line_count, 2);

        chopper.reset_statistics();
        assert_eq!(chopper.statistics().total_chunks_created, 0);
    }

    #[test]
    fn test_invalid_chopper_config() {
        let cases = vec![
            config(ChunkMethod::Recursive, 0, 0),
            config(ChunkMethod::Char, 10, 10),
            config(ChunkMethod::Word, 10, 20),
            ChopConfig {
                separators: Some(vec![]),
                ..config(ChunkMethod::Recursive, 10, 0)
            },
            ChopConfig {
                markdown_header: "3-1".to_string(),
                ..config(ChunkMethod::Markdown, 10, 0)
            },
            ChopConfig {
                markdown_header: "0-7".to_string(),
                ..config(ChunkMethod::Markdown, 10, 0)
            },
        ];
        for config in cases {
            assert!(
                matches!(
                    Chopper::new(&config),
                    Err(ChunkingError::InvalidConfiguration(_))
                ),
                "accepted {config:?}"
            );
        }
    }

    struct Shouting;

    impl TextChopper for Shouting {
        fn name(&self) -> &'static str {
            "shouting"
        }

        fn chop(&self, text: &str) -> Vec<ChunkRecord> {
            text.lines()
                .map(|line| ChunkRecord::new(line.to_uppercase()))
                .collect()
        }
    }

    #[test]
    fn test_custom_strategy() {
        let mut chopper = Chopper::with_strategy(Box::new(Shouting), CleaningMode::Trim);
        assert_eq!(chopper.name(), "shouting");
        assert_eq!(texts(&chopper.chop("hi \n\n there")), vec!["HI", "THERE"]);
    }
}
