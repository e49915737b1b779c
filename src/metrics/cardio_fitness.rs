// ABOUTME: Cardio fitness (VO2Max) normalization, point value or range string
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Cardio fitness normalizer.
//!
//! The provider reports VO2Max either as a point value (`"44"`) or as a
//! `"low-high"` range string (`"42-46"`) depending on how the score was
//! derived. Both are kept: a parsed point value and the original range.

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct CardioPayload {
    #[serde(rename = "cardioScore", default)]
    cardio_score: Vec<RawCardioDay>,
}

#[derive(Debug, Deserialize)]
struct RawCardioDay {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(default)]
    value: Option<RawCardioValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCardioValue {
    #[serde(default)]
    vo2_max: Option<String>,
}

/// Normalized cardio fitness record for one date.
#[derive(Debug, Clone, Serialize)]
pub struct CardioFitnessRecord {
    pub date: String,
    /// Point VO2Max when the provider reported a single number.
    pub vo2_max: Option<f64>,
    /// Original `"low-high"` string when it reported a range.
    pub vo2_max_range: Option<String>,
}

/// Cardio fitness history over a range, most recent first.
#[derive(Debug, Serialize)]
pub struct CardioFitnessHistory {
    pub records: Vec<CardioFitnessRecord>,
    pub vo2_max: WindowStats,
}

fn normalize_day(day: RawCardioDay) -> CardioFitnessRecord {
    let raw = day.value.and_then(|v| v.vo2_max);
    let (point, range) = match raw {
        Some(s) if s.contains('-') => (None, Some(s)),
        Some(s) => (s.trim().parse::<f64>().ok(), None),
        None => (None, None),
    };

    CardioFitnessRecord {
        date: day.date_time,
        vo2_max: point,
        vo2_max_range: range,
    }
}

/// Normalize the cardio fitness payload for a single date.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_cardio_fitness(payload: &Value) -> GatewayResult<Option<CardioFitnessRecord>> {
    let parsed: CardioPayload = parse_payload(payload)?;
    Ok(parsed.cardio_score.into_iter().next().map(normalize_day))
}

/// Aggregate a range payload into a history view, most recent first. Window
/// stats cover point values only; range-string days contribute no sample.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_cardio_history(payload: &Value) -> GatewayResult<CardioFitnessHistory> {
    let parsed: CardioPayload = parse_payload(payload)?;
    let mut records: Vec<CardioFitnessRecord> =
        parsed.cardio_score.into_iter().map(normalize_day).collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let samples: Vec<f64> = records.iter().filter_map(|r| r.vo2_max).collect();
    Ok(CardioFitnessHistory {
        vo2_max: WindowStats::from_samples(&samples, Rounding::One),
        records,
    })
}
