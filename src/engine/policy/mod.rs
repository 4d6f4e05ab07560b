mod threshold;

pub use threshold::{
    DEFAULT_WARNING_THRESHOLD, HIGH_BAND_PERCENT, MEDIUM_BAND_PERCENT, PressureColor,
    ThresholdPolicy, classify_color, is_over_threshold, validate_percent,
};
