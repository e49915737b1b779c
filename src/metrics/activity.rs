// ABOUTME: Daily activity summary and time-series normalization
// ABOUTME: Steps/calories/distance records with windowed averages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Activity normalizer.
//!
//! Two raw shapes: the daily summary object and the `activities-{resource}`
//! time series, whose sample values arrive as strings.

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{round2, Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ActivityPayload {
    #[serde(default)]
    summary: Option<RawActivitySummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivitySummary {
    #[serde(default)]
    steps: Option<f64>,
    #[serde(default)]
    calories_out: Option<f64>,
    #[serde(default)]
    floors: Option<f64>,
    #[serde(default)]
    resting_heart_rate: Option<f64>,
    #[serde(default)]
    sedentary_minutes: Option<f64>,
    #[serde(default)]
    lightly_active_minutes: Option<f64>,
    #[serde(default)]
    fairly_active_minutes: Option<f64>,
    #[serde(default)]
    very_active_minutes: Option<f64>,
    #[serde(default)]
    distances: Vec<RawDistance>,
}

#[derive(Debug, Deserialize)]
struct RawDistance {
    activity: String,
    distance: f64,
}

/// Normalized daily activity summary.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityRecord {
    pub date: String,
    pub steps: Option<f64>,
    pub calories_out: Option<f64>,
    pub distance_km: Option<f64>,
    pub floors: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    pub sedentary_minutes: Option<f64>,
    pub lightly_active_minutes: Option<f64>,
    pub fairly_active_minutes: Option<f64>,
    pub very_active_minutes: Option<f64>,
}

/// One time-series sample.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub value: Option<f64>,
}

/// Time-series aggregation for one resource over a range.
#[derive(Debug, Serialize)]
pub struct TimeSeriesHistory {
    pub resource: String,
    pub records: Vec<TimeSeriesPoint>,
    pub averages: WindowStats,
}

#[derive(Debug, Deserialize)]
struct RawSeriesPoint {
    #[serde(rename = "dateTime")]
    date_time: String,
    value: String,
}

/// Normalize the daily summary payload. A payload with no `summary` object
/// yields `None`.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_activity(date: &str, payload: &Value) -> GatewayResult<Option<ActivityRecord>> {
    let parsed: ActivityPayload = parse_payload(payload)?;
    Ok(parsed.summary.map(|summary| {
        let distance_km = summary
            .distances
            .iter()
            .find(|d| d.activity == "total")
            .map(|d| round2(d.distance));

        ActivityRecord {
            date: date.to_string(),
            steps: summary.steps,
            calories_out: summary.calories_out,
            distance_km,
            floors: summary.floors,
            resting_heart_rate: summary.resting_heart_rate,
            sedentary_minutes: summary.sedentary_minutes,
            lightly_active_minutes: summary.lightly_active_minutes,
            fairly_active_minutes: summary.fairly_active_minutes,
            very_active_minutes: summary.very_active_minutes,
        }
    }))
}

fn series_points(resource: &str, payload: &Value) -> GatewayResult<Vec<TimeSeriesPoint>> {
    let key = format!("activities-{resource}");
    let raw = payload.get(&key).cloned().unwrap_or(Value::Array(vec![]));
    let parsed: Vec<RawSeriesPoint> = parse_payload(&raw)?;
    Ok(parsed
        .into_iter()
        .map(|p| TimeSeriesPoint {
            date: p.date_time,
            value: p.value.trim().parse::<f64>().ok(),
        })
        .collect())
}

/// Aggregate a time-series payload into a history view, most recent first.
/// An empty series yields `records=[]` with null averages.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_series_history(resource: &str, payload: &Value) -> GatewayResult<TimeSeriesHistory> {
    let mut records = series_points(resource, payload)?;
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let samples: Vec<f64> = records.iter().filter_map(|p| p.value).collect();
    Ok(TimeSeriesHistory {
        resource: resource.to_string(),
        averages: WindowStats::from_samples(&samples, Rounding::One),
        records,
    })
}

/// Time-ordered series for plotting, ascending by date.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_series_chart(resource: &str, payload: &Value) -> GatewayResult<Vec<TimeSeriesPoint>> {
    let mut records = series_points(resource, payload)?;
    records.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_daily_summary_normalization() {
        let payload = json!({"summary": {
            "steps": 9200,
            "caloriesOut": 2450,
            "floors": 12,
            "restingHeartRate": 61,
            "sedentaryMinutes": 600,
            "lightlyActiveMinutes": 200,
            "fairlyActiveMinutes": 45,
            "veryActiveMinutes": 30,
            "distances": [
                {"activity": "total", "distance": 6.847},
                {"activity": "veryActive", "distance": 2.1}
            ]
        }});
        let record = normalize_activity("2025-08-30", &payload).unwrap().unwrap();
        assert_eq!(record.steps, Some(9200.0));
        assert_eq!(record.distance_km, Some(6.85));
        assert_eq!(record.resting_heart_rate, Some(61.0));
    }

    #[test]
    fn test_missing_summary_yields_none() {
        assert!(normalize_activity("2025-08-30", &json!({}))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_empty_series_yields_empty_records_and_null_averages() {
        let payload = json!({"activities-steps": []});
        let history = build_series_history("steps", &payload).unwrap();
        assert!(history.records.is_empty());
        assert!(history.averages.average.is_none());
    }

    #[test]
    fn test_series_history_descending_with_averages() {
        let payload = json!({"activities-steps": [
            {"dateTime": "2025-08-28", "value": "8000"},
            {"dateTime": "2025-08-30", "value": "10000"},
            {"dateTime": "2025-08-29", "value": "9000"}
        ]});
        let history = build_series_history("steps", &payload).unwrap();
        let dates: Vec<&str> = history.records.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, ["2025-08-30", "2025-08-29", "2025-08-28"]);
        assert_eq!(history.averages.average, Some(9000.0));

        let chart = build_series_chart("steps", &payload).unwrap();
        assert_eq!(chart.first().unwrap().date, "2025-08-28");
    }

    #[test]
    fn test_unparseable_sample_value_becomes_null() {
        let payload = json!({"activities-steps": [
            {"dateTime": "2025-08-30", "value": "n/a"}
        ]});
        let history = build_series_history("steps", &payload).unwrap();
        assert!(history.records[0].value.is_none());
        assert!(history.averages.average.is_none());
    }
}
