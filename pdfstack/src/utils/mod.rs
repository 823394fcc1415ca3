//! Formatting helpers shared by the collection and the statistics types.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Format a byte count the way file lists show it: megabytes, two decimals.
///
/// ```
/// assert_eq!(pdfstack::utils::format_display_size(1_572_864), "1.50 MB");
/// assert_eq!(pdfstack::utils::format_display_size(0), "0.00 MB");
/// ```
pub fn format_display_size(size: u64) -> String {
    format!("{:.2} MB", size as f64 / MB as f64)
}

/// Format file size as a human-readable string with an adaptive unit.
pub fn format_file_size(size: u64) -> String {
    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
