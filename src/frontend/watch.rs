use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, error};

use crate::engine::preferences::Preferences;
use crate::engine::{MemoryService, TickReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Overrides the `refresh_interval` preference.
    pub interval: Option<Duration>,
    /// Longest gap between ticks when following the preference
    /// (`shell.status_refresh_secs`). Zero is ignored.
    pub max_period: Option<Duration>,
    /// Stop after this many ticks; run forever when `None`.
    pub max_ticks: Option<usize>,
}

impl WatchOptions {
    /// Period for the next tick given the current preferences.
    pub fn period_for(&self, prefs: &Preferences) -> Duration {
        if let Some(fixed) = self.interval {
            return fixed;
        }
        let preferred = prefs.refresh_interval();
        match self.max_period.filter(|max| !max.is_zero()) {
            Some(max) => preferred.min(max),
            None => preferred,
        }
    }
}

#[derive(Debug, Clone)]
pub enum WatchEvent {
    Tick(TickReport),
    Failed(String),
}

/// Polls the service until `max_ticks` is reached.
///
/// Each tick runs on the blocking pool. A failed tick is reported and the
/// loop carries on; one bad sample must not end the watch. The period is
/// re-derived from preferences after every tick, so a `refresh_interval`
/// change takes effect on the next tick.
pub async fn run_watch<F>(service: Arc<MemoryService>, options: WatchOptions, mut on_event: F)
where
    F: FnMut(WatchEvent) + Send,
{
    let mut period = options.period_for(&service.preferences());
    let mut timer = timer_starting_at(Instant::now(), period);
    debug!(period_ms = period.as_millis() as u64, "Watch loop started");

    let mut ticks = 0usize;
    loop {
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        timer.tick().await;
        ticks += 1;

        let svc = Arc::clone(&service);
        let event = match tokio::task::spawn_blocking(move || svc.auto_clean_tick()).await {
            Ok(Ok(report)) => WatchEvent::Tick(report),
            Ok(Err(e)) => {
                error!(error = %e, "Watch tick failed");
                WatchEvent::Failed(e.to_string())
            }
            Err(join_err) => {
                error!(error = %join_err, "Watch tick panicked");
                WatchEvent::Failed(join_err.to_string())
            }
        };
        on_event(event);

        let next = options.period_for(&service.preferences());
        if next != period {
            debug!(
                from_ms = period.as_millis() as u64,
                to_ms = next.as_millis() as u64,
                "Watch period changed"
            );
            period = next;
            timer = timer_starting_at(Instant::now() + period, period);
        }
    }
}

fn timer_starting_at(start: Instant, period: Duration) -> Interval {
    let mut timer = interval_at(start, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
