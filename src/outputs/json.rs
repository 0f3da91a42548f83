//! JSON export of published snapshots.
//!
//! Each refresh overwrites a single `latest.json` file so external tools can
//! poll the current front page without going through the HTTP server. The
//! file is an export, not storage: nothing is ever read back from it.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── latest.json
//! ```

use crate::models::Snapshot;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name written inside the output directory.
pub const LATEST_FILE: &str = "latest.json";

/// Serialize a [`Snapshot`] as pretty-printed JSON.
///
/// This is the exact document written to `latest.json` and printed by
/// `--once`.
pub fn to_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// Write a [`Snapshot`] as pretty-printed JSON to `{dir}/latest.json`.
///
/// The file is written to a temporary sibling first and then renamed into
/// place, so readers never see a partially written document.
///
/// # Arguments
///
/// * `snapshot` - The published snapshot to serialize
/// * `dir` - Directory to write into (created if missing)
///
/// # Returns
///
/// The path of the written file, or an error if directory creation,
/// serialization or the write fails.
#[instrument(level = "info", skip_all, fields(dir = %dir.as_ref().display()))]
pub async fn write_snapshot(
    snapshot: &Snapshot,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
    let dir = dir.as_ref();
    let json = to_json(snapshot)?;

    if let Err(e) = fs::create_dir_all(dir).await {
        error!(path = %dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = dir.join(LATEST_FILE);
    let staging = dir.join(format!(".{LATEST_FILE}.tmp"));
    fs::write(&staging, json).await?;
    fs::rename(&staging, &path).await?;
    info!(path = %path.display(), stories = snapshot.stories.len(), "Wrote JSON snapshot");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_to_json_is_a_single_document() {
        let ist = FixedOffset::east_opt(19800).unwrap();
        let snapshot = Snapshot::empty(ist.with_ymd_and_hms(2025, 5, 10, 14, 32, 0).unwrap());

        let text = to_json(&snapshot).unwrap();
        assert!(text.starts_with('{'));
        assert!(text.ends_with('}'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["stories"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_write_snapshot_overwrites_latest() {
        let dir = tempfile::tempdir().unwrap();
        let ist = FixedOffset::east_opt(19800).unwrap();
        let snapshot = Snapshot::empty(ist.with_ymd_and_hms(2025, 5, 10, 14, 32, 0).unwrap());

        let first = write_snapshot(&snapshot, dir.path().join("nested")).await.unwrap();
        let second = write_snapshot(&snapshot, dir.path().join("nested")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.file_name().unwrap(), LATEST_FILE);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&first).unwrap()).unwrap();
        assert_eq!(value["refreshed_at"], "2025-05-10T14:32:00+05:30");
        assert!(value["stories"].as_array().unwrap().is_empty());

        let entries = std::fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(entries, 1);
    }
}
