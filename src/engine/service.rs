use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::engine::errors::{SampleError, ServiceError};
use crate::engine::history::{CleanHistory, CleanLogEntry};
use crate::engine::policy::{PressureColor, classify_color, is_over_threshold};
use crate::engine::preferences::{Preferences, PreferencesFile, PreferencesPatch};
use crate::engine::reclaim::{CleanResult, ReclaimEngine};
use crate::engine::sampler::{MemorySampler, MemorySnapshot};
use crate::logging::Diagnostics;

/// Point-in-time view for a status surface.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub snapshot: MemorySnapshot,
    pub color: PressureColor,
    pub over_warning: bool,
}

/// What one polling tick observed and did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub status: StatusReport,
    pub cleaned: Option<CleanResult>,
}

struct CleanState {
    engine: ReclaimEngine,
    /// Set once an auto-clean fired for the current excursion above the
    /// auto-clean threshold; cleared when usage drops back below it.
    auto_fired: bool,
}

/// Single owner of the engine, preferences and history.
///
/// Manual cleans and timer ticks both go through here, so only one clean is
/// ever in flight and history writes are never interleaved.
pub struct MemoryService {
    sampler: Arc<dyn MemorySampler>,
    clean_state: Mutex<CleanState>,
    history: CleanHistory,
    preferences: Mutex<Preferences>,
    preferences_file: PreferencesFile,
    diagnostics: Diagnostics,
}

impl MemoryService {
    /// Loads preferences from `preferences_file` (defaults when unreadable).
    pub fn new(
        engine: ReclaimEngine,
        history: CleanHistory,
        preferences_file: PreferencesFile,
        diagnostics: Diagnostics,
    ) -> Self {
        let preferences = preferences_file.load();
        Self {
            sampler: Arc::clone(engine.sampler()),
            clean_state: Mutex::new(CleanState {
                engine,
                auto_fired: false,
            }),
            history,
            preferences: Mutex::new(preferences),
            preferences_file,
            diagnostics,
        }
    }

    pub fn sample(&self) -> Result<MemorySnapshot, SampleError> {
        self.sampler.sample()
    }

    pub fn status(&self) -> Result<StatusReport, SampleError> {
        let snapshot = self.sampler.sample()?;
        Ok(self.status_for(snapshot))
    }

    fn status_for(&self, snapshot: MemorySnapshot) -> StatusReport {
        let warning = self.preferences.lock().warning_threshold();
        StatusReport {
            snapshot,
            color: classify_color(snapshot.percent_used()),
            over_warning: is_over_threshold(&snapshot, warning),
        }
    }

    /// Runs one clean and commits it to history when it succeeded.
    pub fn clean(&self) -> Result<CleanResult, ServiceError> {
        let state = self.clean_state.lock();
        self.clean_locked(&state)
    }

    fn clean_locked(&self, state: &CleanState) -> Result<CleanResult, ServiceError> {
        let result = state.engine.clean()?;
        self.history.record(&result)?;
        Ok(result)
    }

    pub fn recent(&self, limit: usize) -> Vec<CleanLogEntry> {
        self.history.recent(limit)
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences.lock().clone()
    }

    /// Applies `patch` atomically, then saves. A failed save leaves the new
    /// values in memory; the error tells the caller the file is stale.
    pub fn update_preferences(
        &self,
        patch: &PreferencesPatch,
    ) -> Result<Preferences, ServiceError> {
        let mut prefs = self.preferences.lock();
        prefs.apply(patch)?;
        self.preferences_file.save(&prefs)?;
        Ok(prefs.clone())
    }

    pub fn set_preference(&self, key: &str, value: &Value) -> Result<Preferences, ServiceError> {
        let mut prefs = self.preferences.lock();
        prefs.set_value(key, value)?;
        self.preferences_file.save(&prefs)?;
        Ok(prefs.clone())
    }

    /// One polling step: sample, classify and, when auto-clean is on and
    /// usage has just crossed the auto-clean threshold, clean once.
    ///
    /// Staying above the threshold does not trigger again; usage must fall
    /// below it first.
    pub fn auto_clean_tick(&self) -> Result<TickReport, ServiceError> {
        let mut state = self.clean_state.lock();
        let snapshot = self.sampler.sample()?;
        let status = self.status_for(snapshot);
        let prefs = self.preferences();

        let over_auto = is_over_threshold(&snapshot, prefs.auto_clean_threshold());
        if !over_auto {
            if state.auto_fired {
                self.diagnostics.in_scope(|| {
                    debug!(
                        percent = snapshot.percent_used(),
                        "Usage back below auto-clean threshold"
                    );
                });
            }
            state.auto_fired = false;
        }

        if status.over_warning {
            self.diagnostics.in_scope(|| {
                warn!(
                    percent = snapshot.percent_used(),
                    threshold = prefs.warning_threshold(),
                    "Memory usage above warning threshold"
                );
            });
        }

        if !prefs.auto_clean() || !over_auto || state.auto_fired {
            return Ok(TickReport {
                status,
                cleaned: None,
            });
        }

        self.diagnostics.in_scope(|| {
            info!(
                percent = snapshot.percent_used(),
                threshold = prefs.auto_clean_threshold(),
                "Auto-clean threshold crossed"
            );
        });
        // Err means nothing was reclaimed; leave the latch open.
        let result = state.engine.clean()?;
        state.auto_fired = true;
        self.history.record(&result)?;
        Ok(TickReport {
            status,
            cleaned: Some(result),
        })
    }
}
