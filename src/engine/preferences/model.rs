use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::engine::errors::ValidationError;
use crate::engine::policy::{DEFAULT_WARNING_THRESHOLD, validate_percent};

pub const KEY_WARNING_THRESHOLD: &str = "warning_threshold";
pub const KEY_AUTO_CLEAN: &str = "auto_clean";
pub const KEY_AUTO_CLEAN_THRESHOLD: &str = "auto_clean_threshold";
pub const KEY_REFRESH_INTERVAL: &str = "refresh_interval";

pub const KNOWN_KEYS: [&str; 4] = [
    KEY_WARNING_THRESHOLD,
    KEY_AUTO_CLEAN,
    KEY_AUTO_CLEAN_THRESHOLD,
    KEY_REFRESH_INTERVAL,
];

const FIELD_WARNING_THRESHOLD: &str = "warningThreshold";
const FIELD_AUTO_CLEAN: &str = "autoClean";
const FIELD_AUTO_CLEAN_THRESHOLD: &str = "autoCleanThreshold";
const FIELD_REFRESH_INTERVAL: &str = "refreshIntervalSeconds";

/// User tunables persisted in the preferences file.
///
/// Fields are private: every mutation goes through a validating setter, so a
/// `Preferences` value is always in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preferences {
    warning_threshold: f64,
    auto_clean: bool,
    auto_clean_threshold: f64,
    #[serde(rename = "refresh_interval")]
    refresh_interval_secs: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            auto_clean: false,
            auto_clean_threshold: 80.0,
            refresh_interval_secs: 5.0,
        }
    }
}

/// A set of field changes validated together by [`Preferences::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesPatch {
    pub warning_threshold: Option<f64>,
    pub auto_clean: Option<bool>,
    pub auto_clean_threshold: Option<f64>,
    pub refresh_interval_secs: Option<f64>,
}

impl Preferences {
    pub fn warning_threshold(&self) -> f64 {
        self.warning_threshold
    }

    pub fn auto_clean(&self) -> bool {
        self.auto_clean
    }

    pub fn auto_clean_threshold(&self) -> f64 {
        self.auto_clean_threshold
    }

    pub fn refresh_interval_secs(&self) -> f64 {
        self.refresh_interval_secs
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_interval_secs)
    }

    pub fn set_warning_threshold(&mut self, value: f64) -> Result<(), ValidationError> {
        self.warning_threshold = validate_percent(FIELD_WARNING_THRESHOLD, value)?;
        Ok(())
    }

    pub fn set_auto_clean(&mut self, value: bool) {
        self.auto_clean = value;
    }

    pub fn set_auto_clean_threshold(&mut self, value: f64) -> Result<(), ValidationError> {
        self.auto_clean_threshold = validate_percent(FIELD_AUTO_CLEAN_THRESHOLD, value)?;
        Ok(())
    }

    /// Accepts any positive number of seconds that maps to a non-zero `Duration`.
    pub fn set_refresh_interval_secs(&mut self, value: f64) -> Result<(), ValidationError> {
        let usable = value > 0.0
            && Duration::try_from_secs_f64(value).is_ok_and(|period| !period.is_zero());
        if !usable {
            return Err(ValidationError::NotPositiveInteger {
                field: FIELD_REFRESH_INTERVAL,
                got: value.to_string(),
            });
        }
        self.refresh_interval_secs = value;
        Ok(())
    }

    /// Sets one field from an untyped JSON value, as found in the
    /// preferences file or typed at the console.
    pub fn set_value(&mut self, key: &str, value: &Value) -> Result<(), ValidationError> {
        match key {
            KEY_WARNING_THRESHOLD => {
                self.set_warning_threshold(expect_number(FIELD_WARNING_THRESHOLD, value)?)
            }
            KEY_AUTO_CLEAN => {
                let flag = value.as_bool().ok_or_else(|| ValidationError::NotABoolean {
                    field: FIELD_AUTO_CLEAN,
                    got: value.to_string(),
                })?;
                self.set_auto_clean(flag);
                Ok(())
            }
            KEY_AUTO_CLEAN_THRESHOLD => {
                self.set_auto_clean_threshold(expect_number(FIELD_AUTO_CLEAN_THRESHOLD, value)?)
            }
            KEY_REFRESH_INTERVAL => {
                self.set_refresh_interval_secs(expect_number(FIELD_REFRESH_INTERVAL, value)?)
            }
            other => Err(ValidationError::UnknownKey(other.to_string())),
        }
    }

    /// Validates every field in `patch` first; commits nothing if any fails.
    pub fn apply(&mut self, patch: &PreferencesPatch) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(v) = patch.warning_threshold {
            next.set_warning_threshold(v)?;
        }
        if let Some(v) = patch.auto_clean {
            next.set_auto_clean(v);
        }
        if let Some(v) = patch.auto_clean_threshold {
            next.set_auto_clean_threshold(v)?;
        }
        if let Some(v) = patch.refresh_interval_secs {
            next.set_refresh_interval_secs(v)?;
        }
        *self = next;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<Value> {
        match key {
            KEY_WARNING_THRESHOLD => Some(Value::from(self.warning_threshold)),
            KEY_AUTO_CLEAN => Some(Value::from(self.auto_clean)),
            KEY_AUTO_CLEAN_THRESHOLD => Some(Value::from(self.auto_clean_threshold)),
            KEY_REFRESH_INTERVAL => Some(Value::from(self.refresh_interval_secs)),
            _ => None,
        }
    }
}

fn expect_number(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    value.as_f64().ok_or_else(|| ValidationError::NotANumber {
        field,
        got: value.to_string(),
    })
}
