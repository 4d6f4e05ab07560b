use crate::engine::sampler::MemorySnapshot;

/// Outcome of one clean attempt. Never persisted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanResult {
    pub before: MemorySnapshot,
    pub after: MemorySnapshot,
    /// Gigabytes released, two decimals, never negative.
    pub freed_gb: f64,
    pub success: bool,
    pub error: Option<String>,
}

impl CleanResult {
    pub(crate) fn succeeded(before: MemorySnapshot, after: MemorySnapshot, freed_gb: f64) -> Self {
        Self {
            before,
            after,
            freed_gb,
            success: true,
            error: None,
        }
    }

    /// `after` mirrors `before`: no second sample is meaningful.
    pub(crate) fn failed(before: MemorySnapshot, error: String) -> Self {
        Self {
            before,
            after: before,
            freed_gb: 0.0,
            success: false,
            error: Some(error),
        }
    }
}
