// ABOUTME: Per-metric-family request construction for the Fitbit Web API
// ABOUTME: Path templates, default paging parameters, and date-range clamping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Request descriptions for each metric family.
//!
//! A [`MetricRequest`] is a pure value: endpoint path plus query parameters
//! for one family and one date or date range, constructed fresh per call.
//! Families differ only in path template, default paging, and clamp rules —
//! control flow lives in the gateway itself.

use chrono::{Duration, NaiveDate, Utc};

/// Endpoint path + query parameters for a single provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRequest {
    /// Path relative to the API base, e.g. `/1.2/user/-/sleep/date/2025-08-30.json`.
    pub path: String,
    /// Query parameters appended to the request URL.
    pub query: Vec<(&'static str, String)>,
}

impl MetricRequest {
    fn new(path: String) -> Self {
        Self {
            path,
            query: Vec::new(),
        }
    }
}

/// Inclusive bounds for a caller-supplied count, with a documented default
/// for absent or unparseable input. The count is days for range endpoints
/// and records for the paged sleep list.
#[derive(Debug, Clone, Copy)]
pub struct DayRange {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl DayRange {
    /// Sleep / heart rate / active-zone history.
    pub const STANDARD: DayRange = DayRange {
        min: 1,
        max: 90,
        default: 7,
    };

    /// HRV, SpO2, breathing rate, skin temperature, cardio fitness —
    /// Fitbit caps these ranges at 30 days.
    pub const VITALS: DayRange = DayRange {
        min: 1,
        max: 30,
        default: 7,
    };

    /// Activity time-series charts.
    pub const ACTIVITY_SERIES: DayRange = DayRange {
        min: 1,
        max: 90,
        default: 30,
    };

    /// Paged sleep list page size. Unlike the range endpoints these bounds
    /// clamp a record-count limit, not a number of days; the clamp and
    /// default mechanics are otherwise identical.
    pub const SLEEP_LIST: DayRange = DayRange {
        min: 1,
        max: 100,
        default: 100,
    };

    /// Clamp a caller-supplied day count into this endpoint's bounds.
    /// Absent input falls back to the documented default.
    #[must_use]
    pub fn clamp(&self, days: Option<i64>) -> i64 {
        days.map_or(self.default, |d| d.clamp(self.min, self.max))
    }

    /// Parse a raw string day count (outer-surface input), falling back to
    /// the default when absent or non-numeric.
    #[must_use]
    pub fn parse(&self, raw: Option<&str>) -> i64 {
        self.clamp(raw.and_then(|s| s.trim().parse::<i64>().ok()))
    }
}

/// Calendar window of `days` days ending today (UTC): `(start, end)` where
/// `start = end - (days - 1)`.
#[must_use]
pub fn range_ending_today(days: i64) -> (NaiveDate, NaiveDate) {
    let end = Utc::now().date_naive();
    let start = end - Duration::days(days - 1);
    (start, end)
}

fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Sleep log for one date.
#[must_use]
pub fn sleep_by_date(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!("/1.2/user/-/sleep/date/{}.json", fmt_date(date)))
}

/// Sleep logs over an inclusive date range.
#[must_use]
pub fn sleep_by_range(start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1.2/user/-/sleep/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

/// Paged sleep list, most recent first.
#[must_use]
pub fn sleep_list(before: NaiveDate, limit: i64) -> MetricRequest {
    let mut request = MetricRequest::new("/1.2/user/-/sleep/list.json".to_string());
    request.query = vec![
        ("beforeDate", fmt_date(before)),
        ("sort", "desc".to_string()),
        ("limit", limit.to_string()),
        ("offset", "0".to_string()),
    ];
    request
}

/// Daily activity summary (steps, calories, distance, active minutes).
#[must_use]
pub fn activity_summary(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!("/1/user/-/activities/date/{}.json", fmt_date(date)))
}

/// Activity time series for one resource (`steps`, `calories`, `distance`,
/// `floors`, `minutesVeryActive`, ...) over a date range.
#[must_use]
pub fn activity_time_series(resource: &str, start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/activities/{resource}/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

/// Heart rate (resting + zones) for one date.
#[must_use]
pub fn heart_by_date(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/activities/heart/date/{}/1d.json",
        fmt_date(date)
    ))
}

/// Heart rate over a date range.
#[must_use]
pub fn heart_by_range(start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/activities/heart/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

/// Daily HRV (RMSSD) for one date.
#[must_use]
pub fn hrv_by_date(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!("/1/user/-/hrv/date/{}.json", fmt_date(date)))
}

/// HRV over a date range.
#[must_use]
pub fn hrv_by_range(start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/hrv/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

/// SpO2 summary for one date.
#[must_use]
pub fn spo2_by_date(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!("/1/user/-/spo2/date/{}.json", fmt_date(date)))
}

/// SpO2 over a date range.
#[must_use]
pub fn spo2_by_range(start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/spo2/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

/// Breathing rate for one date.
#[must_use]
pub fn breathing_rate_by_date(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!("/1/user/-/br/date/{}.json", fmt_date(date)))
}

/// Breathing rate over a date range.
#[must_use]
pub fn breathing_rate_by_range(start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/br/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

/// Nightly skin temperature (relative) for one date.
#[must_use]
pub fn temperature_by_date(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!("/1/user/-/temp/skin/date/{}.json", fmt_date(date)))
}

/// Skin temperature over a date range.
#[must_use]
pub fn temperature_by_range(start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/temp/skin/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

/// Cardio fitness (VO2Max) for one date.
#[must_use]
pub fn cardio_fitness_by_date(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/cardioscore/date/{}.json",
        fmt_date(date)
    ))
}

/// Cardio fitness over a date range.
#[must_use]
pub fn cardio_fitness_by_range(start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/cardioscore/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

/// Active Zone Minutes for one date.
#[must_use]
pub fn azm_by_date(date: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/activities/active-zone-minutes/date/{}/1d.json",
        fmt_date(date)
    ))
}

/// Active Zone Minutes over a date range.
#[must_use]
pub fn azm_by_range(start: NaiveDate, end: NaiveDate) -> MetricRequest {
    MetricRequest::new(format!(
        "/1/user/-/activities/active-zone-minutes/date/{}/{}.json",
        fmt_date(start),
        fmt_date(end)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_within_bounds() {
        let range = DayRange::STANDARD;
        assert_eq!(range.clamp(Some(0)), 1);
        assert_eq!(range.clamp(Some(-5)), 1);
        assert_eq!(range.clamp(Some(45)), 45);
        assert_eq!(range.clamp(Some(365)), 90);
        assert_eq!(range.clamp(None), 7);
    }

    #[test]
    fn test_parse_non_numeric_falls_back_to_default() {
        let range = DayRange::VITALS;
        assert_eq!(range.parse(Some("abc")), 7);
        assert_eq!(range.parse(Some("")), 7);
        assert_eq!(range.parse(None), 7);
        assert_eq!(range.parse(Some("14")), 14);
        assert_eq!(range.parse(Some("500")), 30);
    }

    #[test]
    fn test_range_ending_today_spans_requested_days() {
        let (start, end) = range_ending_today(7);
        assert_eq!((end - start).num_days(), 6);

        let (start, end) = range_ending_today(1);
        assert_eq!(start, end);
    }

    #[test]
    fn test_sleep_request_paths() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 30).unwrap();
        assert_eq!(
            sleep_by_date(date).path,
            "/1.2/user/-/sleep/date/2025-08-30.json"
        );

        let start = NaiveDate::from_ymd_opt(2025, 8, 24).unwrap();
        assert_eq!(
            sleep_by_range(start, date).path,
            "/1.2/user/-/sleep/date/2025-08-24/2025-08-30.json"
        );
    }

    #[test]
    fn test_sleep_list_default_paging() {
        let before = NaiveDate::from_ymd_opt(2025, 8, 30).unwrap();
        let request = sleep_list(before, 25);
        assert_eq!(request.path, "/1.2/user/-/sleep/list.json");
        assert!(request.query.contains(&("sort", "desc".to_string())));
        assert!(request.query.contains(&("limit", "25".to_string())));
        assert!(request.query.contains(&("offset", "0".to_string())));
    }

    #[test]
    fn test_time_series_path_embeds_resource() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 8, 30).unwrap();
        assert_eq!(
            activity_time_series("steps", start, end).path,
            "/1/user/-/activities/steps/date/2025-08-01/2025-08-30.json"
        );
    }
}
