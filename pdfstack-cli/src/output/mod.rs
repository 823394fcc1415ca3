//! User-facing terminal output: the run report and the merge progress bar.

pub mod formatter;
pub mod progress;

pub use formatter::OutputFormatter;
pub use progress::{ProgressStyle, TerminalProgress};
