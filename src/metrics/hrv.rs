// ABOUTME: HRV (nightly RMSSD) normalization and range aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{BaselineComparison, Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct HrvPayload {
    #[serde(default)]
    hrv: Vec<RawHrvDay>,
}

#[derive(Debug, Deserialize)]
struct RawHrvDay {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default)]
    value: Option<RawHrvValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHrvValue {
    #[serde(default)]
    daily_rmssd: Option<f64>,
    #[serde(default)]
    deep_rmssd: Option<f64>,
}

/// Normalized HRV record for one date. RMSSD is the root-mean-square of
/// successive heartbeat-interval differences, in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct HrvRecord {
    pub date: String,
    pub daily_rmssd: Option<f64>,
    pub deep_rmssd: Option<f64>,
}

/// HRV history over a range, most recent first.
#[derive(Debug, Serialize)]
pub struct HrvHistory {
    pub records: Vec<HrvRecord>,
    pub daily_rmssd: WindowStats,
}

fn normalize_day(day: RawHrvDay) -> HrvRecord {
    HrvRecord {
        date: day.date_time,
        daily_rmssd: day.value.as_ref().and_then(|v| v.daily_rmssd),
        deep_rmssd: day.value.as_ref().and_then(|v| v.deep_rmssd),
    }
}

/// Normalize the HRV payload for a single date.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_hrv(payload: &Value) -> GatewayResult<Option<HrvRecord>> {
    let parsed: HrvPayload = parse_payload(payload)?;
    Ok(parsed.hrv.into_iter().next().map(normalize_day))
}

/// Aggregate a range payload into a history view, most recent first.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_hrv_history(payload: &Value) -> GatewayResult<HrvHistory> {
    let parsed: HrvPayload = parse_payload(payload)?;
    let mut records: Vec<HrvRecord> = parsed.hrv.into_iter().map(normalize_day).collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let samples: Vec<f64> = records.iter().filter_map(|r| r.daily_rmssd).collect();
    Ok(HrvHistory {
        daily_rmssd: WindowStats::from_samples(&samples, Rounding::One),
        records,
    })
}

/// Deviation of a date's RMSSD from its trailing window (records dated
/// strictly before `date`; the current sample never baselines itself).
#[must_use]
pub fn hrv_baseline(history: &HrvHistory, date: &str) -> BaselineComparison {
    let current = history
        .records
        .iter()
        .find(|r| r.date == date)
        .and_then(|r| r.daily_rmssd);
    let window: Vec<f64> = history
        .records
        .iter()
        .filter(|r| r.date.as_str() < date)
        .filter_map(|r| r.daily_rmssd)
        .collect();
    BaselineComparison::compute(current, &window)
}
