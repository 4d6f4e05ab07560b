use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Process-level settings. Separate from the user preferences the engine
/// persists as JSON: these describe where things live and how loud to log.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub preferences_path: PathBuf,
    pub history_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    /// Number of history lines shown by `status` and `history`.
    pub history_limit: usize,
    /// Seconds between status refreshes while watching, when the user
    /// preference is not more frequent.
    #[serde(default = "default_status_refresh_secs")]
    pub status_refresh_secs: u64,
}

fn default_status_refresh_secs() -> u64 {
    3
}

fn builder_with_defaults()
-> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .set_default("storage.preferences_path", "config.json")?
        .set_default("storage.history_path", "logs/clean.log")?
        .set_default("shell.history_limit", 10)?
        .set_default("shell.status_refresh_secs", 3)
}

/// Loads settings from `$MEMTRIM_CONFIG` (default `memtrim`, any format the
/// `config` crate recognizes), then `MEMTRIM_*` environment overrides such as
/// `MEMTRIM_LOGGING__STDOUT_LEVEL=debug`. A missing file is fine.
pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("MEMTRIM_CONFIG").unwrap_or_else(|_| "memtrim".to_string());

    let settings: Settings = builder_with_defaults()?
        .add_source(config::File::with_name(&config_path).required(false))
        .add_source(
            config::Environment::with_prefix("MEMTRIM")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()?;

    Ok(settings)
}

/// Loads settings from an explicit file only, without environment overrides.
pub fn load_settings_from(path: &str) -> Result<Settings, config::ConfigError> {
    builder_with_defaults()?
        .add_source(config::File::with_name(path).required(false))
        .build()?
        .try_deserialize()
}
