use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{error, info, warn};

use super::entry::CleanLogEntry;
use super::file::HistoryFile;
use crate::engine::errors::{HistoryError, PersistenceError, ValidationError};
use crate::engine::policy::validate_percent;
use crate::engine::reclaim::CleanResult;
use crate::logging::Diagnostics;
use crate::shared::rounding::round_to;
use crate::shared::time::local_timestamp;

/// Oldest entries are dropped past this many.
pub const MAX_ENTRIES: usize = 100;

/// Bounded, append-only record of successful cleans.
///
/// Every operation reads or rewrites the whole file; the internal mutex plus
/// the file lock keep concurrent appends from losing each other's entries.
pub struct CleanHistory {
    file: HistoryFile,
    guard: Mutex<()>,
    diagnostics: Diagnostics,
}

impl CleanHistory {
    /// Creates the log directory if needed.
    pub fn new(
        path: impl Into<PathBuf>,
        diagnostics: Diagnostics,
    ) -> Result<Self, PersistenceError> {
        let file = HistoryFile::new(path.into());
        file.ensure_dir()?;
        Ok(Self {
            file,
            guard: Mutex::new(()),
            diagnostics,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Validates, stamps, appends and trims to [`MAX_ENTRIES`]. A history
    /// that cannot be read is set aside and restarted; a failed write is
    /// returned and nothing is recorded.
    pub fn append(
        &self,
        before_percent: f64,
        after_percent: f64,
        freed_gb: f64,
    ) -> Result<CleanLogEntry, HistoryError> {
        let before_percent = validate_percent("before_percent", before_percent)?;
        let after_percent = validate_percent("after_percent", after_percent)?;
        let freed_gb = validate_freed(freed_gb)?;

        let entry = CleanLogEntry {
            timestamp: local_timestamp(),
            before_percent,
            after_percent,
            freed_gb: round_to(freed_gb, 2),
        };

        let _guard = self.guard.lock();
        let _lock = self.file.lock()?;

        let mut entries = self.diagnostics.in_scope(|| match self.file.load_entries() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    error = %err,
                    path = %self.file.path().display(),
                    "history unreadable; starting a new one"
                );
                if matches!(err, PersistenceError::Json(_)) {
                    self.file.backup_corrupt();
                }
                Vec::new()
            }
        });

        entries.push(entry.clone());
        if entries.len() > MAX_ENTRIES {
            let excess = entries.len() - MAX_ENTRIES;
            entries.drain(..excess);
        }

        if let Err(err) = self.file.persist(&entries) {
            self.diagnostics.in_scope(|| {
                error!(
                    error = %err,
                    path = %self.file.path().display(),
                    "history write failed"
                );
            });
            return Err(err.into());
        }

        self.diagnostics.in_scope(|| {
            info!(
                before_percent = entry.before_percent,
                after_percent = entry.after_percent,
                freed_gb = entry.freed_gb,
                total = entries.len(),
                "Recorded clean"
            );
        });
        Ok(entry)
    }

    /// Commits a successful result. Failed results are not history.
    pub fn record(&self, result: &CleanResult) -> Result<Option<CleanLogEntry>, HistoryError> {
        if !result.success {
            return Ok(None);
        }
        self.append(
            result.before.percent_used(),
            result.after.percent_used(),
            result.freed_gb,
        )
        .map(Some)
    }

    /// Up to `limit` newest entries, oldest of them first. Unreadable history
    /// reads as empty.
    pub fn recent(&self, limit: usize) -> Vec<CleanLogEntry> {
        let _guard = self.guard.lock();
        let entries = match self.file.load_entries() {
            Ok(entries) => entries,
            Err(err) => {
                self.diagnostics.in_scope(|| {
                    warn!(
                        error = %err,
                        path = %self.file.path().display(),
                        "history unreadable; showing none"
                    );
                });
                return Vec::new();
            }
        };
        let skip = entries.len().saturating_sub(limit);
        entries.into_iter().skip(skip).collect()
    }
}

fn validate_freed(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field: "freed_gb",
            got: value.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: "freed_gb",
            value,
        });
    }
    Ok(value)
}
