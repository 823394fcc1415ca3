//! pdfstack - Combine PDF files into a single document.
//!
//! Collects the inputs into a selection, applies removals and moves, merges
//! with a live progress bar and writes the result.

mod cli;
mod output;
mod telemetry;

use anyhow::{Context, bail};
use clap::Parser;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::Cli;
use crate::output::{OutputFormatter, TerminalProgress};
use pdfstack::config::MergeConfig;
use pdfstack::error::PdfStackError;
use pdfstack::session::MergeSession;
use pdfstack::source::{collect_paths_for_patterns, open_paths};

/// Pause between files when neither a flag nor a config file sets one.
const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(exit_code(&err));
    }
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli)?;
    tracing::debug!(?config, "configuration resolved");
    let formatter = OutputFormatter::from_cli(&cli);

    formatter.header();

    let paths = collect_paths_for_patterns(&cli.inputs)?;
    if paths.is_empty() {
        return Err(PdfStackError::NoFilesToMerge.into());
    }
    let sources = open_paths(&paths).await?;

    let mut session = MergeSession::new(config)?;
    let outcome = session.add_files(sources);
    formatter.add_outcome(&outcome);

    remove_named(&mut session, &cli.remove, &formatter);
    let moves = resolve_moves(&cli.moves, session.files().len())?;
    session.apply_moves(&moves);

    formatter.selection(session.files());

    if cli.dry_run {
        formatter.dry_run(&cli.output);
        return Ok(());
    }

    ensure_output_writable(&cli.output, cli.force)?;

    if let Some(style) = formatter.progress_style() {
        session.subscribe(Arc::new(TerminalProgress::new(style)));
    }

    let orchestrator = session.orchestrator();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            orchestrator.cancel();
        }
    });
    let result = session.merge().await;
    interrupt.abort();

    let stats = match result {
        Ok(stats) => stats,
        Err(err) => {
            if let Some(message) = session.error() {
                formatter.merge_failed(&message);
            }
            return Err(err.into());
        }
    };

    let write_stats = session.save_artifact(&cli.output).await?;
    formatter.merged(&cli.output, &stats, &write_stats);

    Ok(())
}

/// Layer command-line flags over the config file (or the defaults).
fn build_config(cli: &Cli) -> anyhow::Result<MergeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            MergeConfig::from_json_str(&text)?
        }
        None => MergeConfig::default().with_step_delay(DEFAULT_STEP_DELAY),
    };

    if let Some(delay) = cli.step_delay() {
        config.step_delay = delay;
    }
    if let Some(ref compression) = cli.compression {
        config.compression = compression.parse()?;
    }
    if let Some(min_files) = cli.min_files {
        config.min_files = min_files;
    }
    if cli.no_verify {
        config.verify_pages = false;
    }
    if let Some(name) = cli.output.file_name() {
        config.artifact_name = name.to_string_lossy().into_owned();
    }

    config.validate()?;
    Ok(config)
}

/// Drop every file whose name is listed in `names`.
fn remove_named(session: &mut MergeSession, names: &[String], formatter: &OutputFormatter) {
    for name in names {
        let ids: Vec<_> = session
            .files()
            .iter()
            .filter(|f| f.display_name() == name)
            .map(|f| f.id().clone())
            .collect();

        if ids.is_empty() {
            formatter.missing_removal(name);
        }
        for id in &ids {
            session.remove(id);
        }
    }
}

/// Check that every move refers to an existing position.
fn resolve_moves(moves: &[(usize, usize)], len: usize) -> Result<Vec<(usize, usize)>, PdfStackError> {
    for &(from, to) in moves {
        if from >= len || to >= len {
            return Err(PdfStackError::invalid_config(format!(
                "Move {}:{} is out of range for {len} file(s)",
                from + 1,
                to + 1
            )));
        }
    }
    Ok(moves.to_vec())
}

/// Refuse to clobber an existing output unless forced.
fn ensure_output_writable(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "Output file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    Ok(())
}

/// Process exit code for an error.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PdfStackError>()
        .map(PdfStackError::exit_code)
        .unwrap_or(1)
}
