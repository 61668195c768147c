//! chopdoc - split documents into JSON-Lines chunks

use anyhow::{Context, Result};
use chopdoc::pipeline;
use chopdoc::text::chunking::{ChopConfig, ChunkMethod, CleaningMode};
use chopdoc::util::{diff, tracing::tracing_init_from_env};
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "chopdoc", version, about = "Split documents into chunks written as JSON Lines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a document into chunks
    Chop(ChopArgs),
    /// Compare two output files line by line
    Diff { file1: PathBuf, file2: PathBuf },
}

// flags override CHOPDOC_* environment settings
#[derive(Args, Debug)]
struct ChopArgs {
    /// Input file path (stdin is read when piped)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output file path, must end with .jsonl (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Chunking method: char, word, sentence, recursive, markdown
    #[arg(long)]
    method: Option<ChunkMethod>,

    /// Chunk size in characters, words or sentences depending on the method
    #[arg(long)]
    size: Option<usize>,

    /// Overlap between consecutive chunks, in the same unit as size
    #[arg(long)]
    overlap: Option<usize>,

    /// Cleaning mode: none, trim, normal, aggressive
    #[arg(long)]
    clean: Option<CleaningMode>,

    /// Markdown heading levels to split on, e.g. 1-3
    #[arg(long)]
    header: Option<String>,

    /// Leave markdown heading lines out of chunk text
    #[arg(long)]
    strip_headers: bool,

    /// Write markdown heading metadata with each chunk
    #[arg(long)]
    add_metadata: bool,

    /// Read the document from stdin
    #[arg(long)]
    piped: bool,
}

impl ChopArgs {
    fn apply(self, mut config: ChopConfig) -> ChopConfig {
        if let Some(input) = self.input {
            config.input_file = Some(input);
        }
        if let Some(output) = self.output {
            config.output_file = Some(output);
        }
        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(size) = self.size {
            config.chunk_size = size;
        }
        if let Some(overlap) = self.overlap {
            config.overlap = overlap;
        }
        if let Some(clean) = self.clean {
            config.cleaning_mode = clean;
        }
        if let Some(header) = self.header {
            config.markdown_header = header;
        }
        config.strip_headers |= self.strip_headers;
        config.add_metadata |= self.add_metadata;
        config.piped |= self.piped;
        config
    }
}

fn chop(args: ChopArgs) -> Result<()> {
    let mut config = args.apply(ChopConfig::from_env().context("cannot read CHOPDOC_* settings")?);
    if config.input_file.is_none() && !std::io::stdin().is_terminal() {
        config.piped = true;
    }
    tracing::debug!("chop config: {:?}", config);

    let stats = pipeline::run(&config).context("chop failed")?;
    eprintln!("{}", serde_json::to_string(&stats)?);
    Ok(())
}

fn compare(file1: PathBuf, file2: PathBuf) -> Result<ExitCode> {
    match diff::compare_files(&file1, &file2)? {
        None => Ok(ExitCode::SUCCESS),
        Some(diff) => {
            println!("Files differ:");
            print!("{diff}");
            Ok(ExitCode::FAILURE)
        }
    }
}

// a broken LOG_* setup is reported and the run goes on without logs
fn logging_failure(init: Result<()>) -> Option<String> {
    init.err().map(|e| format!("logging disabled: {e:#}"))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if let Some(message) = logging_failure(tracing_init_from_env()) {
        eprintln!("{message}");
    }

    match cli.command {
        Command::Chop(args) => chop(args).map(|_| ExitCode::SUCCESS),
        Command::Diff { file1, file2 } => compare(file1, file2),
    }
}
