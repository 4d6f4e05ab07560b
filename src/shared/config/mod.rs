pub mod model;

pub use model::{LoggingConfig, Settings, ShellConfig, StorageConfig, load_settings, load_settings_from};
