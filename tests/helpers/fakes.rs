use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::engine::errors::{ReclaimError, SampleError};
use crate::engine::reclaim::Reclaimer;
use crate::engine::sampler::{MemorySampler, MemorySnapshot};

pub const GB: u64 = 1024 * 1024 * 1024;

/// Snapshot of a 16 GB host with `used_gb` in use.
pub fn snapshot_gb(used_gb: f64) -> MemorySnapshot {
    let total = 16 * GB;
    let used = (used_gb * GB as f64) as u64;
    MemorySnapshot::new(total, used, total.saturating_sub(used))
}

/// Replays a fixed sequence of samples, then errors.
pub struct ScriptedSampler {
    script: Mutex<VecDeque<Result<MemorySnapshot, SampleError>>>,
    calls: AtomicUsize,
}

impl ScriptedSampler {
    pub fn new(snapshots: impl IntoIterator<Item = MemorySnapshot>) -> Self {
        Self::with_results(snapshots.into_iter().map(Ok))
    }

    pub fn with_results(
        results: impl IntoIterator<Item = Result<MemorySnapshot, SampleError>>,
    ) -> Self {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, snapshot: MemorySnapshot) {
        self.script.lock().push_back(Ok(snapshot));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MemorySampler for ScriptedSampler {
    fn sample(&self) -> Result<MemorySnapshot, SampleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SampleError::Unavailable("script exhausted".into())))
    }
}

/// Reclaimer that succeeds or fails on demand and counts invocations.
pub struct StubReclaimer {
    failure: Option<String>,
    calls: AtomicUsize,
}

impl StubReclaimer {
    pub fn ok() -> Self {
        Self {
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Reclaimer for StubReclaimer {
    fn reclaim(&self) -> Result<(), ReclaimError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(msg) => Err(ReclaimError::Platform(msg.clone())),
            None => Ok(()),
        }
    }
}
