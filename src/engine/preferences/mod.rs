mod file;
mod model;

pub use file::PreferencesFile;
pub use model::{KNOWN_KEYS, Preferences, PreferencesPatch};
