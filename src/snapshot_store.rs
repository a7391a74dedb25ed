// Local snapshot file: soft-failing read, replace-on-write.
// Writes land in a sibling `.tmp` file and are renamed over the target.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::RunError;
use crate::models::Snapshot;

/// Read the previous snapshot. Missing, unreadable or malformed files all yield `None`.
pub async fn read_snapshot(path: &Path) -> Option<Snapshot> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no previous snapshot");
            return None;
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %path.display(),
                operation = "read_snapshot",
                "previous snapshot unreadable; starting with empty history"
            );
            return None;
        }
    };
    match serde_json::from_slice::<Snapshot>(&bytes) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(
                error = %e,
                path = %path.display(),
                operation = "read_snapshot",
                "previous snapshot malformed; starting with empty history"
            );
            None
        }
    }
}

/// Write `snapshot` as pretty JSON, creating the parent directory if needed.
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), RunError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut body = serde_json::to_vec_pretty(snapshot)?;
    body.push(b'\n');

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, &body).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    debug!(
        path = %path.display(),
        bytes = body.len(),
        operation = "write_snapshot",
        "snapshot written"
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
