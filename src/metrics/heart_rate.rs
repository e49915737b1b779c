// ABOUTME: Heart rate normalization: resting HR and zone minutes per date
// ABOUTME: Range aggregation with resting-HR window statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct HeartPayload {
    #[serde(rename = "activities-heart", default)]
    activities_heart: Vec<RawHeartDay>,
}

#[derive(Debug, Deserialize)]
struct RawHeartDay {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default)]
    value: Option<RawHeartValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHeartValue {
    #[serde(default)]
    resting_heart_rate: Option<f64>,
    #[serde(default)]
    heart_rate_zones: Vec<RawHeartZone>,
}

#[derive(Debug, Deserialize)]
struct RawHeartZone {
    name: String,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    minutes: Option<f64>,
}

/// A provider-defined heart rate zone with time spent in it.
#[derive(Debug, Clone, Serialize)]
pub struct HeartRateZone {
    pub name: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub minutes: Option<f64>,
}

/// Normalized heart rate record for one date.
#[derive(Debug, Clone, Serialize)]
pub struct HeartRateRecord {
    pub date: String,
    pub resting_heart_rate: Option<f64>,
    pub zones: Vec<HeartRateZone>,
}

/// Heart rate history over a range, most recent first.
#[derive(Debug, Serialize)]
pub struct HeartRateHistory {
    pub records: Vec<HeartRateRecord>,
    pub resting_heart_rate: WindowStats,
}

fn normalize_day(day: RawHeartDay) -> HeartRateRecord {
    let (resting, zones) = match day.value {
        Some(value) => (
            value.resting_heart_rate,
            value
                .heart_rate_zones
                .into_iter()
                .map(|z| HeartRateZone {
                    name: z.name,
                    min: z.min,
                    max: z.max,
                    minutes: z.minutes,
                })
                .collect(),
        ),
        None => (None, Vec::new()),
    };

    HeartRateRecord {
        date: day.date_time,
        resting_heart_rate: resting,
        zones,
    }
}

/// Normalize the heart payload for a single date.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_heart_rate(payload: &Value) -> GatewayResult<Option<HeartRateRecord>> {
    let parsed: HeartPayload = parse_payload(payload)?;
    Ok(parsed.activities_heart.into_iter().next().map(normalize_day))
}

/// Aggregate a range payload into a history view, most recent first.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_heart_history(payload: &Value) -> GatewayResult<HeartRateHistory> {
    let parsed: HeartPayload = parse_payload(payload)?;
    let mut records: Vec<HeartRateRecord> = parsed
        .activities_heart
        .into_iter()
        .map(normalize_day)
        .collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let resting: Vec<f64> = records
        .iter()
        .filter_map(|r| r.resting_heart_rate)
        .collect();

    Ok(HeartRateHistory {
        resting_heart_rate: WindowStats::from_samples(&resting, Rounding::One),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resting_hr_and_zones() {
        let payload = json!({"activities-heart": [{
            "dateTime": "2025-08-30",
            "value": {
                "restingHeartRate": 58,
                "heartRateZones": [
                    {"name": "Fat Burn", "min": 98, "max": 137, "minutes": 45},
                    {"name": "Cardio", "min": 137, "max": 167, "minutes": 12}
                ]
            }
        }]});
        let record = normalize_heart_rate(&payload).unwrap().unwrap();
        assert_eq!(record.resting_heart_rate, Some(58.0));
        assert_eq!(record.zones.len(), 2);
        assert_eq!(record.zones[0].name, "Fat Burn");
    }

    #[test]
    fn test_history_sorted_descending() {
        let payload = json!({"activities-heart": [
            {"dateTime": "2025-08-28", "value": {"restingHeartRate": 60}},
            {"dateTime": "2025-08-30", "value": {"restingHeartRate": 62}},
            {"dateTime": "2025-08-29", "value": {}}
        ]});
        let history = build_heart_history(&payload).unwrap();
        assert_eq!(history.records[0].date, "2025-08-30");
        assert_eq!(history.records[2].date, "2025-08-28");
        // day without a resting value is excluded from the window
        assert_eq!(history.resting_heart_rate.average, Some(61.0));
    }
}
