use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::model::{KNOWN_KEYS, Preferences};
use crate::engine::errors::PersistenceError;
use crate::logging::Diagnostics;
use crate::shared::json_file::write_json_atomic;

/// The on-disk JSON object holding [`Preferences`].
#[derive(Debug, Clone)]
pub struct PreferencesFile {
    path: PathBuf,
    diagnostics: Diagnostics,
}

impl PreferencesFile {
    pub fn new(path: impl Into<PathBuf>, diagnostics: Diagnostics) -> Self {
        Self {
            path: path.into(),
            diagnostics,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails. Missing, unreadable or malformed files give defaults;
    /// individual bad keys keep their default and the rest still apply.
    pub fn load(&self) -> Preferences {
        self.diagnostics.in_scope(|| self.load_inner())
    }

    fn load_inner(&self) -> Preferences {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "preferences file not found; using defaults");
                return Preferences::default();
            }
            Err(err) => {
                warn!(
                    error = %err,
                    path = %self.path.display(),
                    "preferences read failed; using defaults"
                );
                return Preferences::default();
            }
        };

        let stored = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!(
                    path = %self.path.display(),
                    found = json_kind(&other),
                    "preferences file is not a JSON object; using defaults"
                );
                return Preferences::default();
            }
            Err(err) => {
                warn!(
                    error = %err,
                    path = %self.path.display(),
                    "preferences decode failed; using defaults"
                );
                return Preferences::default();
            }
        };

        let mut prefs = Preferences::default();
        for (key, value) in &stored {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                debug!(key = %key, "ignoring unknown preference key");
                continue;
            }
            if let Err(err) = prefs.set_value(key, value) {
                warn!(
                    key = %key,
                    field = err.field(),
                    error = %err,
                    "invalid stored preference; keeping default"
                );
            }
        }
        prefs
    }

    /// Atomic write. On failure the file is unchanged and the caller's
    /// in-memory preferences are untouched.
    pub fn save(&self, prefs: &Preferences) -> Result<(), PersistenceError> {
        write_json_atomic(&self.path, prefs)?;
        self.diagnostics.in_scope(|| {
            info!(path = %self.path.display(), "preferences saved");
        });
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
