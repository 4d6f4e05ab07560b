use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, warn};

/// A field value rejected before any state was touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a number, got {got}")]
    NotANumber { field: &'static str, got: String },

    #[error("{field} must be a boolean, got {got}")]
    NotABoolean { field: &'static str, got: String },

    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfPercentRange { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a positive integer, got {got}")]
    NotPositiveInteger { field: &'static str, got: String },

    #[error("Unknown preference key: {0}")]
    UnknownKey(String),
}

impl ValidationError {
    /// Name of the offending field, as reported in the message.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::NotANumber { field, .. }
            | ValidationError::NotABoolean { field, .. }
            | ValidationError::OutOfPercentRange { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::NotPositiveInteger { field, .. } => field,
            ValidationError::UnknownKey(key) => key,
        }
    }

    /// True for wrong-kind failures, false for domain failures.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ValidationError::NotANumber { .. } | ValidationError::NotABoolean { .. }
        )
    }
}

/// Failure writing a preferences or history file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("History write failed: {0}")]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Clone, Error)]
pub enum SampleError {
    #[error("Memory counters unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the platform reclamation primitive.
#[derive(Debug, Clone, Error)]
pub enum ReclaimError {
    #[error("Reclaim call failed: {0}")]
    Platform(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Memory sampling failed after reclaim: {0}")]
    Resample(#[from] SampleError),
}

#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("Memory reclamation is only supported on Windows (running on {0})")]
    Unsupported(&'static str),
}

impl ReclaimError {
    pub fn log_error(&self) {
        match self {
            ReclaimError::Platform(msg) => {
                error!("Reclaim call failed: {}", msg);
            }
            ReclaimError::PermissionDenied(msg) => {
                warn!("Reclaim denied by the OS: {}", msg);
                debug!("Run elevated to trim other processes' working sets");
            }
            ReclaimError::Resample(e) => {
                error!("Post-reclaim sample failed: {}", e);
                debug!("Resample error details: {:?}", e);
            }
        }
    }
}

/// Everything the service layer can hand back to a shell.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Preferences write failed: {0}")]
    Persistence(#[from] PersistenceError),
}
