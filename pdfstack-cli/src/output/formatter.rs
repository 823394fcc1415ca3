//! Terminal report of a pdfstack run.
//!
//! Every line printed about the selection or the merge is composed here from
//! library types. The `*_lines` functions only build text; [`OutputFormatter`]
//! decides what the current verbosity shows and how it is decorated.

use std::io::IsTerminal;
use std::path::Path;

use pdfstack::artifact::WriteStatistics;
use pdfstack::collection::{AddOutcome, FileCollection};
use pdfstack::orchestrator::MergeStatistics;

use super::ProgressStyle;
use crate::cli::Cli;

/// How much the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    /// Selection, progress and result.
    Normal,
    /// Also per-run details and statistics.
    Verbose,
}

/// Kind of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Regular output.
    Plain,
    /// A finished step.
    Success,
    /// Something was skipped; shown even when quiet.
    Warning,
    /// Shown even when quiet.
    Error,
    /// Verbose only.
    Detail,
}

impl Tone {
    fn visible_at(self, verbosity: Verbosity) -> bool {
        match self {
            Tone::Warning | Tone::Error => true,
            Tone::Plain | Tone::Success => verbosity >= Verbosity::Normal,
            Tone::Detail => verbosity == Verbosity::Verbose,
        }
    }

    /// Prefix and ANSI colour.
    fn decoration(self) -> (&'static str, &'static str) {
        match self {
            Tone::Plain => ("", ""),
            Tone::Success => ("✓ ", "\x1b[32m"),
            Tone::Warning => ("⚠ ", "\x1b[33m"),
            Tone::Error => ("✗ ", "\x1b[31m"),
            Tone::Detail => ("  ", "\x1b[36m"),
        }
    }
}

/// One line of the report.
pub type Line = (Tone, String);

/// Prints the report at the verbosity chosen on the command line.
pub struct OutputFormatter {
    verbosity: Verbosity,
    colored: bool,
}

impl OutputFormatter {
    /// Report at `verbosity`, coloured when stdout is a terminal.
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            colored: std::io::stdout().is_terminal() && std::env::var_os("TERM").is_some(),
        }
    }

    /// Verbosity from `-q` / `-v`.
    pub fn from_cli(cli: &Cli) -> Self {
        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else if cli.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Self::new(verbosity)
    }

    /// Progress indicator to draw during the merge, if any.
    pub fn progress_style(&self) -> Option<ProgressStyle> {
        match self.verbosity {
            Verbosity::Quiet => None,
            Verbosity::Normal => Some(ProgressStyle::Bar),
            Verbosity::Verbose => Some(ProgressStyle::Counter),
        }
    }

    /// Program name and version.
    pub fn header(&self) {
        self.emit(
            Tone::Plain,
            &format!("{} v{}", pdfstack::NAME, pdfstack::VERSION),
        );
    }

    /// What adding the inputs to the selection did.
    pub fn add_outcome(&self, outcome: &AddOutcome) {
        self.emit_all(outcome_lines(outcome));
    }

    /// A `--remove` name matched nothing.
    pub fn missing_removal(&self, name: &str) {
        self.emit(
            Tone::Warning,
            &format!("No file named {name} in the selection"),
        );
    }

    /// The selection in merge order.
    pub fn selection(&self, files: &FileCollection) {
        self.emit_all(selection_lines(files));
    }

    /// A dry run stopped before merging.
    pub fn dry_run(&self, output: &Path) {
        self.emit(Tone::Success, "Dry run completed, nothing written");
        self.emit(
            Tone::Plain,
            &format!("Output would be: {}", output.display()),
        );
    }

    /// The message a failed merge leaves for the user.
    pub fn merge_failed(&self, message: &str) {
        self.emit(Tone::Error, message);
    }

    /// The merged document was written.
    pub fn merged(&self, output: &Path, merge: &MergeStatistics, write: &WriteStatistics) {
        self.emit_all(summary_lines(output, merge, write));
    }

    fn emit_all(&self, lines: Vec<Line>) {
        for (tone, text) in lines {
            self.emit(tone, &text);
        }
    }

    fn emit(&self, tone: Tone, text: &str) {
        if !tone.visible_at(self.verbosity) {
            return;
        }
        let (prefix, colour) = tone.decoration();
        if self.colored && !colour.is_empty() {
            println!("{colour}{prefix}{text}\x1b[0m");
        } else {
            println!("{prefix}{text}");
        }
    }
}

/// Warnings for dropped entries, plus the added count.
pub fn outcome_lines(outcome: &AddOutcome) -> Vec<Line> {
    let mut lines = Vec::new();
    if outcome.rejected > 0 {
        lines.push((
            Tone::Warning,
            format!("Skipped {} file(s) that are not PDFs", outcome.rejected),
        ));
    }
    if outcome.duplicates > 0 {
        lines.push((
            Tone::Warning,
            format!(
                "Skipped {} file(s) already in the selection",
                outcome.duplicates
            ),
        ));
    }
    lines.push((Tone::Detail, format!("Added {} file(s)", outcome.added)));
    lines
}

/// Numbered list of the selection, one line per file.
pub fn selection_lines(files: &FileCollection) -> Vec<Line> {
    let mut lines = vec![(
        Tone::Plain,
        format!("Merge order ({} files):", files.len()),
    )];
    lines.extend(files.iter().enumerate().map(|(index, file)| {
        (
            Tone::Plain,
            format!(
                "  {}. {} ({})",
                index + 1,
                file.display_name(),
                file.display_size()
            ),
        )
    }));
    lines
}

/// Result line, then statistics for verbose runs.
pub fn summary_lines(output: &Path, merge: &MergeStatistics, write: &WriteStatistics) -> Vec<Line> {
    let mut lines = vec![(
        Tone::Success,
        format!(
            "Created {} ({} pages from {} files, {})",
            output.display(),
            merge.total_pages,
            merge.files_merged,
            write.format_file_size()
        ),
    )];

    let details = [
        ("Input size", merge.format_input_size()),
        ("Output size", write.format_file_size()),
        ("Merge time", format!("{:.2}s", merge.merge_time.as_secs_f64())),
        ("Write time", format!("{:.2}s", write.write_time.as_secs_f64())),
    ];
    lines.extend(
        details
            .into_iter()
            .map(|(label, value)| (Tone::Detail, format!("{label}: {value}"))),
    );
    lines
}
