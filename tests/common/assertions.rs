//! Domain-specific assertion helpers for hopwatch harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that say which
//! capture or hop broke the expectation.

use std::path::{Path, PathBuf};

/// Assert that hop `$index` of a canonical capture has every listed field.
///
/// ```rust
/// assert_hop!(capture, 0, "Host" => "1.1.1.1", "Loss%" => "0.0%");
/// ```
#[macro_export]
macro_rules! assert_hop {
    ($capture:expr, $index:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let capture: &serde_json::Value = &$capture;
        let index: usize = $index;
        let hop = match capture["hops"].get(index) {
            Some(hop) => hop,
            None => panic!(
                "assert_hop! failed: capture has no hop {}.\n  hops: {}",
                index, capture["hops"]
            ),
        };
        $(
            pretty_assertions::assert_eq!(
                hop[$key],
                serde_json::Value::String($value.to_string()),
                "hop {} field {:?}",
                index,
                $key
            );
        )+
    }};
}

/// Assert that a capture is the error-marker form with the given message.
#[macro_export]
macro_rules! assert_error_marker {
    ($capture:expr, $message:expr) => {{
        let capture: &serde_json::Value = &$capture;
        pretty_assertions::assert_eq!(*capture, serde_json::json!({ "error": $message }));
    }};
}

/// Capture files in `dir`, sorted by name.
pub fn capture_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()))
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Read and parse a capture file as JSON.
pub fn read_capture(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("{} is not JSON ({e}):\n{text}", path.display()))
}

/// File names (not full paths) of the captures in `dir`.
pub fn capture_names(dir: &Path) -> Vec<String> {
    capture_files(dir)
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}
