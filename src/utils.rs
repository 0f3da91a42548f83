//! Utility functions for text slicing, normalization and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Character-safe prefixes for summaries and fingerprints
//! - Whitespace normalization for content comparison
//! - String truncation for logging
//! - File system validation for output directories

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// The first `n` characters of `s`, never splitting a UTF-8 sequence.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(char_prefix("héllo", 2), "hé");
/// assert_eq!(char_prefix("abc", 10), "abc");
/// ```
pub fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Lowercase, trim, and collapse every whitespace run into a single space.
///
/// Two texts that only differ in case or spacing normalize to the same string.
pub fn normalize_whitespace(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Returns
///
/// The original string if shorter than `max` characters, otherwise a
/// truncated version with `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let prefix = char_prefix(s, max);
    if prefix.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", prefix, s.len() - prefix.len())
    }
}

/// Create `path` if needed and confirm files can be written into it.
///
/// A hidden marker file is written and removed again; the first failure is
/// returned.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is read-only.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn ensure_writable_dir(path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).await?;

    let marker = dir.join(".conflict_news_write_check");
    fs::write(&marker, b"ok").await?;
    fs::remove_file(&marker).await?;
    info!("Output directory is writable");
    Ok(())
}
