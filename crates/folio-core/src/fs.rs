//! Filesystem utilities for atomic snapshot writes.

use std::fs;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use uuid::Uuid;

use crate::error::{FolioError, Result};

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On some platforms (notably Windows), `fs::rename` fails if the destination already exists.
/// This function handles that case by removing the destination first and retrying.
///
/// If the rename ultimately fails, the temp file is cleaned up.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// Replace `path` with `data` so readers see either the old or the new contents.
///
/// The data is written to a uniquely named sibling temp file, synced, then
/// renamed over the destination.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| FolioError::Storage("Invalid snapshot path".to_string()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| FolioError::Storage("Invalid snapshot filename".to_string()))?;
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, Uuid::new_v4().simple()));

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| FolioError::Storage(format!("Temp file create failed: {}", e)))?;

    let written = file
        .write_all(data)
        .and_then(|_| file.sync_all())
        .map_err(|e| FolioError::Storage(format!("Temp file write failed: {}", e)));
    drop(file);
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    rename_with_fallback(&temp_path, path)
        .map_err(|e| FolioError::Storage(format!("Atomic rename failed: {}", e)))
}
