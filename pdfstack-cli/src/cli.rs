//! CLI argument parsing for pdfstack.
//!
//! This module defines the command-line interface structure using `clap`.
//! It only depends on `clap` and the standard library so the build script
//! can render a man page from it.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Combine PDF files into a single document.
///
/// Files are merged in the order given, after applying any removals and
/// moves. Every page of every file is kept.
#[derive(Parser, Debug)]
#[command(name = "pdfstack")]
#[command(version)]
#[command(about = "Combine PDF files into a single document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files to merge (in order)
    ///
    /// Glob patterns are expanded; matches of one pattern are sorted.
    /// Files that are not PDFs and repeated files are skipped.
    ///
    /// Examples:
    ///   pdfstack cover.pdf body.pdf -o report.pdf
    ///   pdfstack 'chapter*.pdf' -o book.pdf
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE", default_value = "merged-document.pdf")]
    pub output: PathBuf,

    /// Read settings from a JSON config file
    ///
    /// Flags given on the command line take precedence.
    #[arg(long, value_name = "FILE", env = "PDFSTACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress content streams (default)
    /// - maximum: Also drop unreferenced objects
    #[arg(short, long, value_name = "LEVEL")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: Option<String>,

    /// Pause after each file, in milliseconds [default: 100]
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Minimum number of files required to merge [default: 2]
    #[arg(long, value_name = "N")]
    pub min_files: Option<usize>,

    /// Accept PDFs that have no pages
    #[arg(long)]
    pub no_verify: bool,

    /// Move the file at position FROM to position TO (1-based, repeatable)
    ///
    /// Moves are applied in order, after removals.
    ///
    /// Example:
    ///   pdfstack a.pdf b.pdf c.pdf -m 3:1   # c.pdf, a.pdf, b.pdf
    #[arg(short = 'm', long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    pub moves: Vec<(usize, usize)>,

    /// Drop files with this name from the selection (repeatable)
    #[arg(long, value_name = "NAME")]
    pub remove: Vec<String>,

    /// Show the final order without merging
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show per-file details and merge statistics
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Per-file pause requested on the command line.
    pub fn step_delay(&self) -> Option<Duration> {
        self.delay_ms.map(Duration::from_millis)
    }
}

/// Parse a `FROM:TO` move into zero-based indices.
pub fn parse_move(value: &str) -> Result<(usize, usize), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("Invalid move '{value}'. Expected FROM:TO, e.g. 3:1"))?;

    let position = |part: &str| -> Result<usize, String> {
        let n: usize = part
            .trim()
            .parse()
            .map_err(|_| format!("Invalid position '{part}' in move '{value}'"))?;
        n.checked_sub(1)
            .ok_or_else(|| format!("Positions start at 1 (got 0 in move '{value}')"))
    };

    Ok((position(from)?, position(to)?))
}
