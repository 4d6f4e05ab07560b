use crate::shared::rounding::{bytes_to_gb, round_to};

/// One point-in-time read of the host's physical memory counters.
///
/// Byte counts are carried as reported. `used + available` is not forced to
/// equal `total`; platforms count cache and reserved pages differently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySnapshot {
    total_bytes: u64,
    used_bytes: u64,
    available_bytes: u64,
    percent_used: f64,
}

impl MemorySnapshot {
    pub fn new(total_bytes: u64, used_bytes: u64, available_bytes: u64) -> Self {
        let percent_used = if total_bytes == 0 {
            0.0
        } else {
            let ratio = used_bytes.min(total_bytes) as f64 / total_bytes as f64;
            round_to(ratio * 100.0, 1)
        };
        Self {
            total_bytes,
            used_bytes,
            available_bytes,
            percent_used,
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn available_bytes(&self) -> u64 {
        self.available_bytes
    }

    /// Share of total memory in use, 0.0 to 100.0, one decimal.
    pub fn percent_used(&self) -> f64 {
        self.percent_used
    }

    pub fn total_gb(&self) -> f64 {
        bytes_to_gb(self.total_bytes)
    }

    pub fn used_gb(&self) -> f64 {
        bytes_to_gb(self.used_bytes)
    }

    pub fn available_gb(&self) -> f64 {
        bytes_to_gb(self.available_bytes)
    }
}
