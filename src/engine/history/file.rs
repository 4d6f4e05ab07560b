use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::entry::CleanLogEntry;
use crate::engine::errors::PersistenceError;
use crate::shared::json_file::{backup_corrupt, ensure_parent_dir, write_json_atomic};

/// JSON array of [`CleanLogEntry`] on disk, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

/// Held for the duration of a read-modify-write. Released on drop.
pub struct HistoryLock {
    file: File,
}

impl Drop for HistoryLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl HistoryFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure_dir(&self) -> Result<(), PersistenceError> {
        ensure_parent_dir(&self.path)
    }

    /// Missing file reads as empty. Anything else that stops a clean decode
    /// is returned for the caller to recover from.
    pub fn load_entries(&self) -> Result<Vec<CleanLogEntry>, PersistenceError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(PersistenceError::io(&self.path, err)),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    pub fn persist(&self, entries: &[CleanLogEntry]) -> Result<(), PersistenceError> {
        write_json_atomic(&self.path, entries)
    }

    /// Exclusive advisory lock on a `.lock` sibling, shared with any other
    /// process writing the same history.
    pub fn lock(&self) -> Result<HistoryLock, PersistenceError> {
        self.ensure_dir()?;
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| PersistenceError::io(&lock_path, e))?;
        file.lock_exclusive()
            .map_err(|e| PersistenceError::io(&lock_path, e))?;
        Ok(HistoryLock { file })
    }

    pub fn backup_corrupt(&self) {
        backup_corrupt(&self.path);
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }
}
