// ABOUTME: Shared window statistics and baseline deviation helpers
// ABOUTME: Rounding conventions, mean/min/max, percent deviation from trailing baseline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Statistics shared by every metric family.
//!
//! All derived numbers follow two conventions: rounding is half-away-from-zero
//! (`round(x * 10) / 10` arithmetic), and any statistic whose inputs are
//! unavailable is `None` — serialized as `null` — rather than omitted, so
//! consumers can rely on a fixed schema.

use serde::Serialize;

/// Round to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Decimal places used for a family's averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    One,
    Two,
}

impl Rounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::One => round1(value),
            Rounding::Two => round2(value),
        }
    }
}

/// Arithmetic mean, minimum, and maximum over a sample window.
/// All three are `None` when the window is empty.
#[derive(Debug, Clone, Serialize, Default)]
pub struct WindowStats {
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl WindowStats {
    /// Compute stats over `samples`, rounding the average to the family's
    /// convention. Min and max are reported as sampled.
    #[must_use]
    pub fn from_samples(samples: &[f64], rounding: Rounding) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let sum: f64 = samples.iter().sum();
        #[allow(clippy::cast_precision_loss)]
        let average = sum / samples.len() as f64;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            average: Some(rounding.apply(average)),
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Deviation of a current value from its trailing baseline window.
///
/// The window must exclude the current sample — a same-day value is never
/// compared against a window that contains itself.
#[derive(Debug, Clone, Serialize, Default)]
pub struct BaselineComparison {
    pub current_value: Option<f64>,
    pub baseline_average: Option<f64>,
    /// `(current - average) / average * 100`, one decimal; `None` when the
    /// current value is missing, the window is empty, or the average is zero.
    pub percent_difference: Option<f64>,
}

impl BaselineComparison {
    #[must_use]
    pub fn compute(current: Option<f64>, window: &[f64]) -> Self {
        let average = if window.is_empty() {
            None
        } else {
            let sum: f64 = window.iter().sum();
            #[allow(clippy::cast_precision_loss)]
            Some(sum / window.len() as f64)
        };

        let percent_difference = match (current, average) {
            (Some(value), Some(avg)) if avg != 0.0 => Some(round1((value - avg) / avg * 100.0)),
            _ => None,
        };

        Self {
            current_value: current,
            baseline_average: average.map(round1),
            percent_difference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_conventions() {
        assert!((round1(0.36496) - 0.4).abs() < f64::EPSILON);
        assert!((round2(7.4999) - 7.5).abs() < f64::EPSILON);
        assert!((round1(-2.35) - -2.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_window_stats_empty() {
        let stats = WindowStats::from_samples(&[], Rounding::One);
        assert!(stats.average.is_none());
        assert!(stats.min.is_none());
        assert!(stats.max.is_none());
    }

    #[test]
    fn test_window_stats_basic() {
        let stats = WindowStats::from_samples(&[50.0, 52.0, 54.0, 58.0, 60.0], Rounding::One);
        assert_eq!(stats.average, Some(54.8));
        assert_eq!(stats.min, Some(50.0));
        assert_eq!(stats.max, Some(60.0));
    }

    #[test]
    fn test_baseline_hrv_scenario() {
        // current 55 vs trailing week [50, 52, 54, 58, 60] (avg 54.8)
        let comparison = BaselineComparison::compute(Some(55.0), &[50.0, 52.0, 54.0, 58.0, 60.0]);
        assert_eq!(comparison.baseline_average, Some(54.8));
        assert_eq!(comparison.percent_difference, Some(0.4));
    }

    #[test]
    fn test_baseline_empty_window_is_null() {
        let comparison = BaselineComparison::compute(Some(55.0), &[]);
        assert!(comparison.baseline_average.is_none());
        assert!(comparison.percent_difference.is_none());
        assert_eq!(comparison.current_value, Some(55.0));
    }

    #[test]
    fn test_baseline_zero_average_is_null() {
        let comparison = BaselineComparison::compute(Some(55.0), &[0.0, 0.0]);
        assert_eq!(comparison.baseline_average, Some(0.0));
        assert!(comparison.percent_difference.is_none());
    }

    #[test]
    fn test_baseline_missing_current_is_null() {
        let comparison = BaselineComparison::compute(None, &[50.0, 60.0]);
        assert!(comparison.percent_difference.is_none());
        assert!(comparison.current_value.is_none());
    }
}
