//! Utility functions and helpers.

use std::path::Path;
use std::time::Duration;

/// Formats an elapsed duration as `(1.23s)`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("({:.2}s)", elapsed.as_secs_f64())
}

/// Returns `path` relative to `root` for display, or `path` unchanged when it
/// lies outside `root`.
pub fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Returns `"s"` unless `count` is exactly one.
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
