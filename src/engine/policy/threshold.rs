use crate::engine::errors::ValidationError;
use crate::engine::sampler::MemorySnapshot;

/// Fixed display bands, independent of any configured threshold.
pub const MEDIUM_BAND_PERCENT: f64 = 70.0;
pub const HIGH_BAND_PERCENT: f64 = 85.0;

pub const DEFAULT_WARNING_THRESHOLD: f64 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureColor {
    Low,
    Medium,
    High,
}

impl PressureColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PressureColor::Low => "green",
            PressureColor::Medium => "yellow",
            PressureColor::High => "red",
        }
    }
}

pub fn is_over_threshold(snapshot: &MemorySnapshot, threshold_percent: f64) -> bool {
    snapshot.percent_used() >= threshold_percent
}

pub fn classify_color(percent: f64) -> PressureColor {
    if percent < MEDIUM_BAND_PERCENT {
        PressureColor::Low
    } else if percent < HIGH_BAND_PERCENT {
        PressureColor::Medium
    } else {
        PressureColor::High
    }
}

/// Rejects NaN, infinities and anything outside [0, 100].
pub fn validate_percent(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field,
            got: value.to_string(),
        });
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfPercentRange { field, value });
    }
    Ok(value)
}

/// Warning threshold holder for the status surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    threshold: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_WARNING_THRESHOLD,
        }
    }
}

impl ThresholdPolicy {
    pub fn new(threshold: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            threshold: validate_percent("threshold", threshold)?,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Leaves the current threshold in place when `percent` is rejected.
    pub fn set_threshold(&mut self, percent: f64) -> Result<(), ValidationError> {
        self.threshold = validate_percent("threshold", percent)?;
        Ok(())
    }

    pub fn is_over(&self, snapshot: &MemorySnapshot) -> bool {
        is_over_threshold(snapshot, self.threshold)
    }
}
