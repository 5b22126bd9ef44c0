//! Snapshot file storage.
//!
//! JSON on disk, written through a temp file and an atomic rename so a
//! crash mid-save never corrupts the previous snapshot. A missing file is
//! a normal first boot, not an error.

use std::fs;
use std::io;
use std::path::Path;

use cluster_core::snapshot::Snapshot;
use cluster_core::world::World;
use thiserror::Error;

/// Snapshot storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure reading or writing the snapshot.
    #[error("snapshot io: {0}")]
    Io(#[from] io::Error),

    /// The snapshot file exists but is not valid JSON for this format.
    #[error("snapshot parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Write the world's snapshot to `path`.
pub fn save(world: &World, path: &Path) -> Result<(), StorageError> {
    let snapshot = world.snapshot();
    let json = serde_json::to_string_pretty(&snapshot)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    tracing::info!(time = snapshot.time, path = %path.display(), "saved world");
    Ok(())
}

/// Read a snapshot from `path`.
///
/// Returns `Ok(None)` when no file exists yet. A present-but-corrupt file
/// is an error; the caller decides whether to fall back to a fresh world.
pub fn load(path: &Path) -> Result<Option<Snapshot>, StorageError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let snapshot: Snapshot = serde_json::from_str(&json)?;

    tracing::info!(time = snapshot.time, path = %path.display(), "loaded saved world");
    Ok(Some(snapshot))
}
