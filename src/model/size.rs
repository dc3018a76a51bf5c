use std::fs::Metadata;

/// Returned by [`format_size`] for negative byte counts.
pub const INVALID_SIZE: &str = "invalid size";

const KB: i64 = 1024;
const MB: i64 = KB * 1024;
const GB: i64 = MB * 1024;

/// Get apparent file size (content length)
pub fn apparent_size(metadata: &Metadata) -> u64 {
    metadata.len()
}

/// Format size in human-readable format.
///
/// Counts below 1 KB are printed as whole bytes. Everything else is scaled to
/// the largest unit not exceeding the value (up to GB) with two decimals.
/// A unit boundary belongs to the larger unit, so 1024 is `"1.00 KB"`.
pub fn format_size(size: i64) -> String {
    if size < 0 {
        INVALID_SIZE.to_string()
    } else if size < KB {
        format!("{} bytes", size)
    } else if size < MB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else if size < GB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else {
        format!("{:.2} GB", size as f64 / GB as f64)
    }
}

/// [`format_size`] for unsigned counts, saturating at `i64::MAX`.
pub fn format_bytes(bytes: u64) -> String {
    format_size(i64::try_from(bytes).unwrap_or(i64::MAX))
}
