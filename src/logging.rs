use std::fmt;

use tracing::Dispatch;
use tracing::dispatcher;
use tracing::info;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::LoggingConfig;

pub fn init(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let stdout_filter = cfg
        .stdout_level
        .parse::<tracing_subscriber::filter::LevelFilter>()?;
    let file_filter = cfg
        .file_level
        .parse::<tracing_subscriber::filter::LevelFilter>()?;

    let stdout_layer = tracing_fmt::layer()
        .with_ansi(true)
        .with_filter(stdout_filter);

    let file_appender = tracing_appender::rolling::daily(&cfg.log_dir, "memtrim.log");
    let file_layer = tracing_fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!(log_dir = %cfg.log_dir, "Logging initialized");
    Ok(())
}

/// Handle through which a component emits its diagnostics.
///
/// Components capture one at construction instead of relying on whatever
/// subscriber is global when they happen to log, so a test can hand in a
/// capturing dispatcher and inspect exactly what one component reported.
#[derive(Clone)]
pub struct Diagnostics {
    dispatch: Dispatch,
}

impl Diagnostics {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// The dispatcher that is the default for the calling thread right now.
    pub fn current() -> Self {
        Self {
            dispatch: dispatcher::get_default(Dispatch::clone),
        }
    }

    /// Drops everything.
    pub fn silent() -> Self {
        Self {
            dispatch: Dispatch::new(tracing::subscriber::NoSubscriber::default()),
        }
    }

    /// Runs `f` with this handle's dispatcher as the default, so `tracing`
    /// macros inside `f` land here.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive("mem_trim=debug".parse().unwrap());

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
