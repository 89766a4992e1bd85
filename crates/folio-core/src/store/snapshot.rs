//! Reading and writing whole-collection snapshots.

use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::error::{FolioError, Result};
use crate::fs::write_atomic;
use crate::store::Document;

/// Outcome of loading a collection snapshot.
///
/// Unparseable content is not an error: it is surfaced as `Recovered` and
/// read as an empty collection. The next write to the collection replaces
/// the unreadable file, so its previous contents are lost.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotLoad {
    /// No snapshot has been written yet.
    Missing,
    /// The snapshot parsed as an array of records.
    Loaded(Vec<Document>),
    /// The snapshot exists but could not be parsed.
    Recovered { reason: String },
}

impl SnapshotLoad {
    pub fn is_recovered(&self) -> bool {
        matches!(self, SnapshotLoad::Recovered { .. })
    }

    pub fn into_documents(self) -> Vec<Document> {
        match self {
            SnapshotLoad::Loaded(records) => records,
            SnapshotLoad::Missing | SnapshotLoad::Recovered { .. } => Vec::new(),
        }
    }
}

/// Load the snapshot at `path`.
///
/// # Errors
///
/// Returns `FolioError::Storage` if the file exists but cannot be read.
pub fn load(path: &Path) -> Result<SnapshotLoad> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(SnapshotLoad::Missing),
        Err(err) => {
            return Err(FolioError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                err
            )))
        }
    };

    match serde_json::from_slice::<Vec<Document>>(&bytes) {
        Ok(records) => Ok(SnapshotLoad::Loaded(records)),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "Snapshot is unreadable; treating collection as empty"
            );
            Ok(SnapshotLoad::Recovered {
                reason: err.to_string(),
            })
        }
    }
}

/// Replace the snapshot at `path` with `records`.
pub fn save(path: &Path, records: &[Document]) -> Result<()> {
    let payload = serde_json::to_vec_pretty(records)
        .map_err(|e| FolioError::Storage(format!("Snapshot encoding failed: {}", e)))?;
    write_atomic(path, &payload)
}
