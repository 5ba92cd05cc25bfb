//! Capture file naming.
//!
//! Every capture lands in `<YYYYMMDDTHHMMSSZ>_<destination>.json`, where the
//! destination has `.`, `:` and `/` replaced with `-` so IPv4, IPv6 and
//! hostnames all produce safe, diffable filenames.

use chrono::{DateTime, Utc};

/// `strftime` pattern for the timestamp prefix of a capture file.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Make a destination safe to embed in a filename.
pub fn sanitize_destination(destination: &str) -> String {
    destination.replace(['.', ':', '/'], "-")
}

/// File name for a capture of `destination` taken at `captured_at`.
pub fn capture_file_name(captured_at: &DateTime<Utc>, destination: &str) -> String {
    format!(
        "{}_{}.json",
        captured_at.format(FILE_TIMESTAMP_FORMAT),
        sanitize_destination(destination)
    )
}
