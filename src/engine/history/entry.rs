use serde::{Deserialize, Serialize};

use crate::shared::time::display_seconds;

/// One successful clean as stored in the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanLogEntry {
    pub timestamp: String,
    pub before_percent: f64,
    pub after_percent: f64,
    pub freed_gb: f64,
}

impl CleanLogEntry {
    /// `[2025-09-07T12:34:56] 85.5% -> 72.3%, freed 2.1 GB`
    pub fn display_line(&self) -> String {
        format!(
            "[{}] {}% -> {}%, freed {} GB",
            display_seconds(&self.timestamp),
            self.before_percent,
            self.after_percent,
            self.freed_gb
        )
    }
}
