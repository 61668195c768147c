pub mod chunking;

use chunking::config::CleaningMode;
use once_cell::sync::Lazy;
use regex::Regex;

// a run of terminators plus the whitespace after it closes a sentence
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s*").expect("valid sentence regex"));

static AGGRESSIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Z}\p{C}\s]+").expect("valid whitespace regex"));

static CONSECUTIVE_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n+").expect("valid newline regex"));

const SENTENCE_TRAILING: [char; 4] = [' ', '\n', '\r', '\t'];

pub struct SentenceSplitter;

impl SentenceSplitter {
    /// Split text after each run of `.`, `!` or `?`
    ///
    /// Trailing whitespace is dropped from every sentence. Text after the last
    /// terminator forms a final sentence; blank sentences are skipped.
    pub fn split(text: &str) -> Vec<&str> {
        let mut sentences = vec![];
        let mut prev = 0;
        for m in SENTENCE_END.find_iter(text) {
            Self::push(&mut sentences, &text[prev..m.end()]);
            prev = m.end();
        }
        if prev < text.len() {
            Self::push(&mut sentences, &text[prev..]);
        }
        sentences
    }

    fn push<'a>(sentences: &mut Vec<&'a str>, sentence: &'a str) {
        let sentence = sentence.trim_end_matches(SENTENCE_TRAILING);
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
    }
}

pub struct TextCleaner;

impl TextCleaner {
    /// Apply a cleaning mode to one chunk of text
    pub fn clean(text: &str, mode: CleaningMode) -> String {
        match mode {
            CleaningMode::None => text.to_string(),
            CleaningMode::Trim => text.trim().to_string(),
            CleaningMode::Normal => Self::collapse_blank_lines(text),
            CleaningMode::Aggressive => {
                let collapsed = AGGRESSIVE.replace_all(text, " ");
                Self::collapse_blank_lines(&collapsed)
            }
        }
    }

    fn collapse_blank_lines(text: &str) -> String {
        CONSECUTIVE_NEWLINES
            .replace_all(text, "\n")
            .trim()
            .to_string()
    }
}
