//! Diagnostic logging setup.
//!
//! Controlled by `PDFSTACK_LOG` using `EnvFilter` directives, e.g.
//! `PDFSTACK_LOG=pdfstack=debug`. Unset means warnings and errors only.
//! Logs go to stderr so they never mix with the merge report on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "PDFSTACK_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Build the filter from `PDFSTACK_LOG`, falling back to warnings only.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
