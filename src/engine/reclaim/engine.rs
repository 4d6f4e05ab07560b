use std::sync::Arc;

use tracing::{info, warn};

use super::reclaimer::{Reclaimer, WorkingSetTrimmer};
use super::result::CleanResult;
use crate::engine::errors::{PlatformError, ReclaimError, SampleError};
use crate::engine::sampler::MemorySampler;
use crate::logging::Diagnostics;
use crate::shared::rounding::round_to;

/// Samples, reclaims, samples again.
///
/// Holds no lock: callers must not run `clean` concurrently with itself, or
/// the two before/after windows overlap and the freed figure is meaningless.
/// [`crate::engine::MemoryService`] provides that serialization.
pub struct ReclaimEngine {
    sampler: Arc<dyn MemorySampler>,
    reclaimer: Arc<dyn Reclaimer>,
    diagnostics: Diagnostics,
}

impl ReclaimEngine {
    /// Engine wired to the host's working-set trimmer. Errors off Windows.
    pub fn for_host(
        sampler: Arc<dyn MemorySampler>,
        diagnostics: Diagnostics,
    ) -> Result<Self, PlatformError> {
        let trimmer = WorkingSetTrimmer::new()?;
        Ok(Self::new(sampler, Arc::new(trimmer), diagnostics))
    }

    pub fn new(
        sampler: Arc<dyn MemorySampler>,
        reclaimer: Arc<dyn Reclaimer>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            sampler,
            reclaimer,
            diagnostics,
        }
    }

    pub fn sampler(&self) -> &Arc<dyn MemorySampler> {
        &self.sampler
    }

    /// Reclaim failures come back inside the result; only a failure to take
    /// the initial sample is an `Err`.
    pub fn clean(&self) -> Result<CleanResult, SampleError> {
        let before = self.sampler.sample()?;

        let outcome = self
            .reclaimer
            .reclaim()
            .and_then(|()| self.sampler.sample().map_err(ReclaimError::from));

        let result = match outcome {
            Ok(after) => {
                // Usage can rise during the call; report zero rather than a negative.
                let delta = round_to(before.used_gb() - after.used_gb(), 2);
                let freed = if delta > 0.0 { delta } else { 0.0 };
                CleanResult::succeeded(before, after, freed)
            }
            Err(err) => {
                self.diagnostics.in_scope(|| err.log_error());
                CleanResult::failed(before, err.to_string())
            }
        };

        self.diagnostics.in_scope(|| {
            if result.success {
                info!(
                    before_percent = result.before.percent_used(),
                    after_percent = result.after.percent_used(),
                    freed_gb = result.freed_gb,
                    "Clean completed"
                );
            } else {
                warn!(error = ?result.error, "Clean failed");
            }
        });
        Ok(result)
    }
}
