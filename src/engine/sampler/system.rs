use sysinfo::System;
use tracing::debug;

use super::MemorySampler;
use super::snapshot::MemorySnapshot;
use crate::engine::errors::SampleError;
use crate::logging::Diagnostics;

/// Reads live counters through `sysinfo`. Every call refreshes; nothing is
/// cached between samples.
#[derive(Debug, Default)]
pub struct SystemSampler {
    diagnostics: Diagnostics,
}

impl SystemSampler {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self { diagnostics }
    }
}

impl MemorySampler for SystemSampler {
    fn sample(&self) -> Result<MemorySnapshot, SampleError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SampleError::Unavailable(format!(
                "sysinfo does not support {}",
                std::env::consts::OS
            )));
        }

        let mut system = System::new();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(SampleError::Unavailable(
                "platform reported zero total memory".to_string(),
            ));
        }

        let snapshot =
            MemorySnapshot::new(total, system.used_memory(), system.available_memory());
        self.diagnostics.in_scope(|| {
            debug!(
                target: "mem_trim::sampler",
                total_gb = snapshot.total_gb(),
                used_gb = snapshot.used_gb(),
                percent = snapshot.percent_used(),
                "Sampled memory"
            );
        });
        Ok(snapshot)
    }
}
