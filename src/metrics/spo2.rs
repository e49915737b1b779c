// ABOUTME: SpO2 (blood oxygen saturation) normalization and range aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! SpO2 normalizer.
//!
//! The provider returns a single object for by-date queries and a bare array
//! for ranges; both shapes are accepted here.

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawSpo2Day {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default)]
    value: Option<RawSpo2Value>,
}

#[derive(Debug, Deserialize)]
struct RawSpo2Value {
    #[serde(default)]
    avg: Option<f64>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

/// Normalized SpO2 record for one date (percent saturation).
#[derive(Debug, Clone, Serialize)]
pub struct Spo2Record {
    pub date: String,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// SpO2 history over a range, most recent first.
#[derive(Debug, Serialize)]
pub struct Spo2History {
    pub records: Vec<Spo2Record>,
    pub avg: WindowStats,
}

fn normalize_day(day: RawSpo2Day) -> Spo2Record {
    Spo2Record {
        date: day.date_time,
        avg: day.value.as_ref().and_then(|v| v.avg),
        min: day.value.as_ref().and_then(|v| v.min),
        max: day.value.as_ref().and_then(|v| v.max),
    }
}

fn parse_days(payload: &Value) -> GatewayResult<Vec<RawSpo2Day>> {
    if payload.is_array() {
        parse_payload(payload)
    } else if payload.get("dateTime").is_some() {
        Ok(vec![parse_payload(payload)?])
    } else {
        Ok(Vec::new())
    }
}

/// Normalize the SpO2 payload for a single date.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_spo2(payload: &Value) -> GatewayResult<Option<Spo2Record>> {
    Ok(parse_days(payload)?.into_iter().next().map(normalize_day))
}

/// Aggregate a range payload into a history view, most recent first.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_spo2_history(payload: &Value) -> GatewayResult<Spo2History> {
    let mut records: Vec<Spo2Record> = parse_days(payload)?
        .into_iter()
        .map(normalize_day)
        .collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let samples: Vec<f64> = records.iter().filter_map(|r| r.avg).collect();
    Ok(Spo2History {
        avg: WindowStats::from_samples(&samples, Rounding::One),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_object_shape() {
        let payload = json!({"dateTime": "2025-08-30", "value": {"avg": 96.4, "min": 94.1, "max": 98.0}});
        let record = normalize_spo2(&payload).unwrap().unwrap();
        assert_eq!(record.avg, Some(96.4));
    }

    #[test]
    fn test_array_shape_history() {
        let payload = json!([
            {"dateTime": "2025-08-29", "value": {"avg": 95.0}},
            {"dateTime": "2025-08-30", "value": {"avg": 97.0}}
        ]);
        let history = build_spo2_history(&payload).unwrap();
        assert_eq!(history.records[0].date, "2025-08-30");
        assert_eq!(history.avg.average, Some(96.0));
    }

    #[test]
    fn test_empty_payload() {
        assert!(normalize_spo2(&json!({})).unwrap().is_none());
        let history = build_spo2_history(&json!([])).unwrap();
        assert!(history.records.is_empty());
        assert!(history.avg.average.is_none());
    }
}
