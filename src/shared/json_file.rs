use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, warn};

use crate::engine::errors::PersistenceError;
use crate::shared::time::now;

/// Creates the parent directory of `path` if it has one and it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), PersistenceError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))
        }
        _ => Ok(()),
    }
}

/// Serializes `value` as pretty JSON next to `path`, then renames it over `path`.
/// Readers never observe a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), PersistenceError> {
    ensure_parent_dir(path)?;
    let serialized = serde_json::to_vec_pretty(value)?;

    let tmp_path = tmp_path_for(path);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp_path)
        .map_err(|e| PersistenceError::io(&tmp_path, e))?;

    let written = file
        .write_all(&serialized)
        .and_then(|_| file.flush())
        .and_then(|_| file.sync_all());
    drop(file);

    if let Err(e) = written.and_then(|_| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PersistenceError::io(path, e));
    }
    Ok(())
}

/// Moves an unreadable file aside as `<name>.corrupt-<epoch>` so the next
/// write does not destroy it.
pub fn backup_corrupt(path: &Path) {
    let backup = corrupt_path_for(path);
    if let Err(rename_err) = fs::rename(path, &backup) {
        error!(
            error = %rename_err,
            original = %path.display(),
            backup = %backup.display(),
            "failed to rename corrupt file"
        );
    } else {
        warn!(backup = %backup.display(), "moved corrupt file to backup");
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn corrupt_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".corrupt-{}", now()));
    path.with_file_name(name)
}
