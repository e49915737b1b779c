// ABOUTME: Breathing rate (breaths per minute during sleep) normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct BreathingPayload {
    #[serde(default)]
    br: Vec<RawBreathingDay>,
}

#[derive(Debug, Deserialize)]
struct RawBreathingDay {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default)]
    value: Option<RawBreathingValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBreathingValue {
    #[serde(default)]
    breathing_rate: Option<f64>,
}

/// Normalized full-sleep breathing rate for one date.
#[derive(Debug, Clone, Serialize)]
pub struct BreathingRateRecord {
    pub date: String,
    pub breathing_rate: Option<f64>,
}

/// Breathing rate history over a range, most recent first.
#[derive(Debug, Serialize)]
pub struct BreathingRateHistory {
    pub records: Vec<BreathingRateRecord>,
    pub breathing_rate: WindowStats,
}

fn normalize_day(day: RawBreathingDay) -> BreathingRateRecord {
    BreathingRateRecord {
        date: day.date_time,
        breathing_rate: day.value.as_ref().and_then(|v| v.breathing_rate),
    }
}

/// Normalize the breathing rate payload for a single date.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_breathing_rate(payload: &Value) -> GatewayResult<Option<BreathingRateRecord>> {
    let parsed: BreathingPayload = parse_payload(payload)?;
    Ok(parsed.br.into_iter().next().map(normalize_day))
}

/// Aggregate a range payload into a history view, most recent first.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_breathing_history(payload: &Value) -> GatewayResult<BreathingRateHistory> {
    let parsed: BreathingPayload = parse_payload(payload)?;
    let mut records: Vec<BreathingRateRecord> =
        parsed.br.into_iter().map(normalize_day).collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let samples: Vec<f64> = records.iter().filter_map(|r| r.breathing_rate).collect();
    Ok(BreathingRateHistory {
        breathing_rate: WindowStats::from_samples(&samples, Rounding::One),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_and_aggregate() {
        let payload = json!({"br": [
            {"dateTime": "2025-08-29", "value": {"breathingRate": 16.4}},
            {"dateTime": "2025-08-30", "value": {"breathingRate": 17.2}}
        ]});
        let history = build_breathing_history(&payload).unwrap();
        assert_eq!(history.records[0].date, "2025-08-30");
        assert_eq!(history.breathing_rate.average, Some(16.8));
    }
}
