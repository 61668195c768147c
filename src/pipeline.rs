//! Reading a document, chopping it and writing JSON-Lines records

use crate::text::chunking::{ChopConfig, Chopper, ChunkRecord, ChunkingError, Result};
use crate::util::encoding::decode_to_utf8;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use tracing::{debug, info, warn};

/// Summary of one chopping run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    #[serde(rename = "type")]
    pub method: String,
    pub total_chars: usize,
    pub chunk_size: usize,
    pub overlap: usize,
    pub cleaning_mode: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub chunks: usize,
}

/// Validate the configuration, then chop its input into its output
///
/// Reads `input_file` (or stdin when piped) and writes to `output_file` (or
/// stdout when none is set).
pub fn run(config: &ChopConfig) -> Result<RunStats> {
    config
        .validate()
        .map_err(ChunkingError::invalid_configuration)?;
    let mut chopper = Chopper::new(config)?;

    let mut input: Box<dyn Read> = match &config.input_file {
        Some(path) if !config.piped => {
            let file = File::open(path).map_err(|e| {
                ChunkingError::input_unavailable(format!("{}: {e}", path.display()))
            })?;
            Box::new(file)
        }
        _ => Box::new(io::stdin().lock()),
    };
    let text = read_text(&mut input)?;

    let mut output: Box<dyn Write> = match &config.output_file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    chop_text(config, &mut chopper, &text, &mut output)
}

/// Chop everything readable from `input` into `output`
///
/// Input and output paths in `config` are ignored.
pub fn run_with<R: Read, W: Write>(config: &ChopConfig, input: &mut R, output: &mut W) -> Result<RunStats> {
    let mut chopper = Chopper::new(config)?;
    let text = read_text(input)?;
    chop_text(config, &mut chopper, &text, output)
}

fn read_text<R: Read + ?Sized>(input: &mut R) -> Result<String> {
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .map_err(|e| ChunkingError::input_unavailable(e.to_string()))?;
    debug!("Read {} bytes of input", bytes.len());
    decode_to_utf8(bytes).map_err(|e| ChunkingError::encoding(format!("{e:#}")))
}

fn chop_text<W: Write + ?Sized>(
    config: &ChopConfig,
    chopper: &mut Chopper,
    text: &str,
    output: &mut W,
) -> Result<RunStats> {
    let started_at = Utc::now();
    if text.trim().is_empty() {
        warn!("Input is empty, no chunks will be written");
    }

    let records = chopper.chop(text);
    write_records(&records, output)?;

    let stats = RunStats {
        method: config.method.to_string(),
        total_chars: text.chars().count(),
        chunk_size: config.chunk_size,
        overlap: config.overlap,
        cleaning_mode: config.cleaning_mode.to_string(),
        started_at,
        completed_at: Utc::now(),
        chunks: records.len(),
    };
    info!(
        "Wrote {} chunks from {} chars ({} method)",
        stats.chunks, stats.total_chars, stats.method
    );
    Ok(stats)
}

/// Write one JSON object per line
pub fn write_records<W: Write + ?Sized>(records: &[ChunkRecord], output: &mut W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *output, record)?;
        output.write_all(b"\n")?;
    }
    output.flush()?;
    Ok(())
}
