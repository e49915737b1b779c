// ABOUTME: Active Zone Minutes normalization (fat burn / cardio / peak)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct AzmPayload {
    #[serde(rename = "activities-active-zone-minutes", default)]
    days: Vec<RawAzmDay>,
}

#[derive(Debug, Deserialize)]
struct RawAzmDay {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default)]
    value: Option<RawAzmValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAzmValue {
    #[serde(default)]
    fat_burn_active_zone_minutes: Option<f64>,
    #[serde(default)]
    cardio_active_zone_minutes: Option<f64>,
    #[serde(default)]
    peak_active_zone_minutes: Option<f64>,
    #[serde(default)]
    active_zone_minutes: Option<f64>,
}

/// Normalized Active Zone Minutes record for one date.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveZoneRecord {
    pub date: String,
    pub fat_burn_minutes: Option<f64>,
    pub cardio_minutes: Option<f64>,
    pub peak_minutes: Option<f64>,
    pub total_minutes: Option<f64>,
}

/// AZM history over a range, most recent first.
#[derive(Debug, Serialize)]
pub struct ActiveZoneHistory {
    pub records: Vec<ActiveZoneRecord>,
    pub total_minutes: WindowStats,
}

fn normalize_day(day: RawAzmDay) -> ActiveZoneRecord {
    let value = day.value.as_ref();
    ActiveZoneRecord {
        date: day.date_time,
        fat_burn_minutes: value.and_then(|v| v.fat_burn_active_zone_minutes),
        cardio_minutes: value.and_then(|v| v.cardio_active_zone_minutes),
        peak_minutes: value.and_then(|v| v.peak_active_zone_minutes),
        total_minutes: value.and_then(|v| v.active_zone_minutes),
    }
}

/// Normalize the AZM payload for a single date.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_active_zone(payload: &Value) -> GatewayResult<Option<ActiveZoneRecord>> {
    let parsed: AzmPayload = parse_payload(payload)?;
    Ok(parsed.days.into_iter().next().map(normalize_day))
}

/// Aggregate a range payload into a history view, most recent first.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_active_zone_history(payload: &Value) -> GatewayResult<ActiveZoneHistory> {
    let parsed: AzmPayload = parse_payload(payload)?;
    let mut records: Vec<ActiveZoneRecord> = parsed.days.into_iter().map(normalize_day).collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let samples: Vec<f64> = records.iter().filter_map(|r| r.total_minutes).collect();
    Ok(ActiveZoneHistory {
        total_minutes: WindowStats::from_samples(&samples, Rounding::One),
        records,
    })
}
