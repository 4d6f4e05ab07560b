mod snapshot;
mod system;

pub use snapshot::MemorySnapshot;
pub use system::SystemSampler;

use crate::engine::errors::SampleError;

/// Source of memory snapshots.
pub trait MemorySampler: Send + Sync {
    fn sample(&self) -> Result<MemorySnapshot, SampleError>;
}
