//! Per-metric delta tracking
//!
//! Holds the last observed value for each metric and reports the signed
//! change on every update. Values start at 0.0, so the first observation
//! reports a delta equal to the raw reading; that is expected and the
//! display settles from the second poll on.

use std::collections::HashMap;
use std::fmt;

/// Changes at or below this magnitude render as neutral.
pub const DELTA_EPSILON: f64 = 0.01;

/// Metric keys tracked by the sensor dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKey {
    Temperature,
    Humidity,
    Rain,
}

/// Direction and magnitude of a metric change, ready for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trend {
    /// Change within [`DELTA_EPSILON`]
    Steady,
    Up(f64),
    Down(f64),
}

impl Trend {
    /// Classify a signed delta.
    pub fn from_delta(delta: f64) -> Self {
        if delta.abs() <= DELTA_EPSILON {
            Trend::Steady
        } else if delta > 0.0 {
            Trend::Up(delta)
        } else {
            Trend::Down(-delta)
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Steady => write!(f, "-"),
            Trend::Up(mag) => write!(f, "▲ {mag:.1}"),
            Trend::Down(mag) => write!(f, "▼ {mag:.1}"),
        }
    }
}

/// Last-value store computing signed deltas per metric
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    last: HashMap<MetricKey, f64>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new value and return the signed delta against the previous
    /// one (0.0 before the first observation). The stored value is updated
    /// on every call regardless of delta magnitude.
    pub fn update(&mut self, key: MetricKey, value: f64) -> f64 {
        let previous = self.last.insert(key, value).unwrap_or(0.0);
        value - previous
    }

    /// Last observed value for a key, if any.
    pub fn last_value(&self, key: MetricKey) -> Option<f64> {
        self.last.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_delta_sequence_property() {
        let mut tracker = DeltaTracker::new();
        let values = [21.5, 21.5, 23.0, 19.25, 19.26];
        let mut previous = 0.0;

        for value in values {
            let delta = tracker.update(MetricKey::Temperature, value);
            assert!((delta - (value - previous)).abs() < 1e-9);
            previous = value;
        }
        assert_eq!(tracker.last_value(MetricKey::Temperature), Some(19.26));
    }

    #[test]
    fn test_first_observation_reports_raw_value() {
        let mut tracker = DeltaTracker::new();
        assert!((tracker.update(MetricKey::Humidity, 64.2) - 64.2).abs() < 1e-9);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut tracker = DeltaTracker::new();
        tracker.update(MetricKey::Temperature, 20.0);
        let delta = tracker.update(MetricKey::Rain, 5.0);
        assert!((delta - 5.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0, Trend::Steady)]
    #[case(0.01, Trend::Steady)]
    #[case(-0.01, Trend::Steady)]
    #[case(0.02, Trend::Up(0.02))]
    #[case(-1.5, Trend::Down(1.5))]
    fn test_trend_threshold(#[case] delta: f64, #[case] expected: Trend) {
        assert_eq!(Trend::from_delta(delta), expected);
    }

    #[test]
    fn test_trend_display_rounds_to_one_decimal() {
        assert_eq!(Trend::from_delta(1.26).to_string(), "▲ 1.3");
        assert_eq!(Trend::from_delta(-0.349).to_string(), "▼ 0.3");
        assert_eq!(Trend::from_delta(0.004).to_string(), "-");
    }
}
