// ABOUTME: Nightly skin temperature normalization (relative to personal baseline)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Skin temperature normalizer.
//!
//! The provider reports a *relative* nightly value — the delta from the
//! wearer's personal baseline in degrees — not an absolute temperature.

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct TemperaturePayload {
    #[serde(rename = "tempSkin", default)]
    temp_skin: Vec<RawTemperatureDay>,
}

#[derive(Debug, Deserialize)]
struct RawTemperatureDay {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default)]
    value: Option<RawTemperatureValue>,
    #[serde(rename = "logType", default)]
    log_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTemperatureValue {
    #[serde(default)]
    nightly_relative: Option<f64>,
}

/// Normalized skin temperature record for one date.
#[derive(Debug, Clone, Serialize)]
pub struct TemperatureRecord {
    pub date: String,
    /// Delta from personal baseline, degrees.
    pub nightly_relative: Option<f64>,
    pub log_type: Option<String>,
}

/// Skin temperature history over a range, most recent first.
#[derive(Debug, Serialize)]
pub struct TemperatureHistory {
    pub records: Vec<TemperatureRecord>,
    pub nightly_relative: WindowStats,
}

fn normalize_day(day: RawTemperatureDay) -> TemperatureRecord {
    TemperatureRecord {
        date: day.date_time,
        nightly_relative: day.value.as_ref().and_then(|v| v.nightly_relative),
        log_type: day.log_type,
    }
}

/// Normalize the skin temperature payload for a single date.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_temperature(payload: &Value) -> GatewayResult<Option<TemperatureRecord>> {
    let parsed: TemperaturePayload = parse_payload(payload)?;
    Ok(parsed.temp_skin.into_iter().next().map(normalize_day))
}

/// Aggregate a range payload into a history view, most recent first.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_temperature_history(payload: &Value) -> GatewayResult<TemperatureHistory> {
    let parsed: TemperaturePayload = parse_payload(payload)?;
    let mut records: Vec<TemperatureRecord> =
        parsed.temp_skin.into_iter().map(normalize_day).collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let samples: Vec<f64> = records.iter().filter_map(|r| r.nightly_relative).collect();
    Ok(TemperatureHistory {
        nightly_relative: WindowStats::from_samples(&samples, Rounding::Two),
        records,
    })
}
