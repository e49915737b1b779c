// ABOUTME: Sleep log normalization with main-sleep selection and stage percentages
// ABOUTME: History (descending) and stage-chart (ascending) aggregation over ranges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Sleep normalizer.
//!
//! The raw sleep payload is the most intricate of the families: a date may
//! carry several logs (naps plus the main sleep), stage minutes live in a
//! nested per-stage summary, and percentages are derived, never sourced.

use super::parse_payload;
use crate::errors::GatewayResult;
use crate::metrics::stats::{round1, round2, Rounding, WindowStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// Raw provider shapes (v1.2 sleep logs).

#[derive(Debug, Deserialize)]
struct SleepPayload {
    #[serde(default)]
    sleep: Vec<RawSleepEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSleepEntry {
    date_of_sleep: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    minutes_asleep: Option<f64>,
    #[serde(default)]
    minutes_awake: Option<f64>,
    #[serde(default)]
    time_in_bed: Option<f64>,
    #[serde(default)]
    efficiency: Option<f64>,
    #[serde(default)]
    is_main_sleep: bool,
    #[serde(default)]
    levels: Option<RawLevels>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLevels {
    #[serde(default)]
    summary: Option<RawStageSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawStageSummary {
    #[serde(default)]
    deep: Option<RawStage>,
    #[serde(default)]
    light: Option<RawStage>,
    #[serde(default)]
    rem: Option<RawStage>,
    #[serde(default)]
    wake: Option<RawStage>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawStage {
    #[serde(default)]
    minutes: Option<f64>,
}

/// Per-stage minutes and derived percentages.
///
/// Percentages are of total sleep minutes (deep + light + rem, wake excluded)
/// and are `null` when that total is zero or the stage itself is zero/absent.
#[derive(Debug, Clone, Serialize)]
pub struct SleepStages {
    pub deep: Option<f64>,
    pub deep_percent: Option<f64>,
    pub light: Option<f64>,
    pub light_percent: Option<f64>,
    pub rem: Option<f64>,
    pub rem_percent: Option<f64>,
    pub wake: Option<f64>,
}

/// Normalized sleep record for one date.
#[derive(Debug, Clone, Serialize)]
pub struct SleepRecord {
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_hours: Option<f64>,
    pub time_in_bed_minutes: Option<f64>,
    pub minutes_asleep: Option<f64>,
    pub minutes_awake: Option<f64>,
    pub efficiency: Option<f64>,
    pub stages: Option<SleepStages>,
    pub is_main_sleep: bool,
}

/// Sleep history over a date range, most recent first.
#[derive(Debug, Serialize)]
pub struct SleepHistory {
    pub records: Vec<SleepRecord>,
    pub duration_hours: WindowStats,
    pub efficiency: WindowStats,
}

/// Time-ordered stage minutes for plotting, ascending by date.
#[derive(Debug, Clone, Serialize)]
pub struct SleepStagePoint {
    pub date: String,
    pub deep: Option<f64>,
    pub light: Option<f64>,
    pub rem: Option<f64>,
    pub wake: Option<f64>,
}

fn stage_minutes(stage: Option<&RawStage>) -> Option<f64> {
    stage.and_then(|s| s.minutes)
}

fn stage_percent(minutes: Option<f64>, total: f64) -> Option<f64> {
    match minutes {
        Some(m) if m > 0.0 && total > 0.0 => Some(round1(m / total * 100.0)),
        _ => None,
    }
}

fn normalize_entry(entry: &RawSleepEntry) -> SleepRecord {
    let stages = entry
        .levels
        .as_ref()
        .and_then(|levels| levels.summary.as_ref())
        .map(|summary| {
            let deep = stage_minutes(summary.deep.as_ref());
            let light = stage_minutes(summary.light.as_ref());
            let rem = stage_minutes(summary.rem.as_ref());
            let wake = stage_minutes(summary.wake.as_ref());
            // Wake minutes are excluded from the percentage denominator.
            let total =
                deep.unwrap_or(0.0) + light.unwrap_or(0.0) + rem.unwrap_or(0.0);

            SleepStages {
                deep,
                deep_percent: stage_percent(deep, total),
                light,
                light_percent: stage_percent(light, total),
                rem,
                rem_percent: stage_percent(rem, total),
                wake,
            }
        });

    let duration_hours = match entry.minutes_asleep {
        Some(minutes) if minutes > 0.0 => Some(round2(minutes / 60.0)),
        _ => None,
    };

    SleepRecord {
        date: entry.date_of_sleep.clone(),
        start_time: entry.start_time.clone(),
        end_time: entry.end_time.clone(),
        duration_hours,
        time_in_bed_minutes: entry.time_in_bed,
        minutes_asleep: entry.minutes_asleep,
        minutes_awake: entry.minutes_awake,
        efficiency: entry.efficiency,
        stages,
        is_main_sleep: entry.is_main_sleep,
    }
}

/// Pick the entry for a date: the one flagged as main sleep, falling back to
/// the first entry present.
fn choose_entry<'a>(entries: &'a [&'a RawSleepEntry]) -> Option<&'a RawSleepEntry> {
    entries
        .iter()
        .find(|e| e.is_main_sleep)
        .or_else(|| entries.first())
        .copied()
}

/// Normalize the sleep payload for a single date. An absent or empty sleep
/// list yields `None`.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_sleep(payload: &Value) -> GatewayResult<Option<SleepRecord>> {
    let parsed: SleepPayload = parse_payload(payload)?;
    let refs: Vec<&RawSleepEntry> = parsed.sleep.iter().collect();
    Ok(choose_entry(&refs).map(normalize_entry))
}

/// Normalize every raw log entry in arrival order (paged list views).
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn normalize_sleep_list(payload: &Value) -> GatewayResult<Vec<SleepRecord>> {
    let parsed: SleepPayload = parse_payload(payload)?;
    Ok(parsed.sleep.iter().map(normalize_entry).collect())
}

/// Build the per-date records for a range payload: one record per date,
/// main sleep preferred.
fn records_by_date(parsed: &SleepPayload) -> Vec<SleepRecord> {
    let mut by_date: BTreeMap<&str, Vec<&RawSleepEntry>> = BTreeMap::new();
    for entry in &parsed.sleep {
        by_date.entry(&entry.date_of_sleep).or_default().push(entry);
    }

    by_date
        .values()
        .filter_map(|entries| choose_entry(entries))
        .map(normalize_entry)
        .collect()
}

/// Aggregate a range payload into a history view: records sorted descending
/// by date (most recent first) plus window stats over the main sleeps.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_sleep_history(payload: &Value) -> GatewayResult<SleepHistory> {
    let parsed: SleepPayload = parse_payload(payload)?;
    let mut records = records_by_date(&parsed);
    records.sort_by(|a, b| b.date.cmp(&a.date));

    let durations: Vec<f64> = records.iter().filter_map(|r| r.duration_hours).collect();
    let efficiencies: Vec<f64> = records.iter().filter_map(|r| r.efficiency).collect();

    Ok(SleepHistory {
        duration_hours: WindowStats::from_samples(&durations, Rounding::Two),
        efficiency: WindowStats::from_samples(&efficiencies, Rounding::One),
        records,
    })
}

/// Aggregate a range payload into a stage chart: ascending by date for
/// time-ordered plotting.
///
/// # Errors
///
/// Returns a serialization error when the payload does not match the provider
/// shape.
pub fn build_stage_chart(payload: &Value) -> GatewayResult<Vec<SleepStagePoint>> {
    let parsed: SleepPayload = parse_payload(payload)?;
    let mut points: Vec<SleepStagePoint> = records_by_date(&parsed)
        .into_iter()
        .map(|record| {
            let stages = record.stages.as_ref();
            SleepStagePoint {
                date: record.date.clone(),
                deep: stages.and_then(|s| s.deep),
                light: stages.and_then(|s| s.light),
                rem: stages.and_then(|s| s.rem),
                wake: stages.and_then(|s| s.wake),
            }
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(date: &str, main: bool, asleep: f64) -> Value {
        json!({
            "dateOfSleep": date,
            "startTime": format!("{date}T23:10:00.000"),
            "endTime": "2025-08-31T07:00:00.000",
            "minutesAsleep": asleep,
            "minutesAwake": 30,
            "timeInBed": 480,
            "efficiency": 92,
            "isMainSleep": main,
            "levels": {
                "summary": {
                    "deep": {"minutes": 90},
                    "light": {"minutes": 270},
                    "rem": {"minutes": 90},
                    "wake": {"minutes": 30}
                }
            }
        })
    }

    #[test]
    fn test_stage_percentages_and_duration() {
        let payload = json!({"sleep": [entry("2025-08-30", true, 450.0)]});
        let record = normalize_sleep(&payload).unwrap().unwrap();

        assert_eq!(record.duration_hours, Some(7.5));
        let stages = record.stages.unwrap();
        assert_eq!(stages.deep_percent, Some(20.0));
        assert_eq!(stages.light_percent, Some(60.0));
        assert_eq!(stages.rem_percent, Some(20.0));
        assert_eq!(stages.wake, Some(30.0));
    }

    #[test]
    fn test_stage_percentages_sum_to_100() {
        let payload = json!({"sleep": [{
            "dateOfSleep": "2025-08-30",
            "isMainSleep": true,
            "minutesAsleep": 410,
            "levels": {"summary": {
                "deep": {"minutes": 77},
                "light": {"minutes": 241},
                "rem": {"minutes": 92},
                "wake": {"minutes": 41}
            }}
        }]});
        let stages = normalize_sleep(&payload).unwrap().unwrap().stages.unwrap();
        let sum = stages.deep_percent.unwrap()
            + stages.light_percent.unwrap()
            + stages.rem_percent.unwrap();
        assert!((sum - 100.0).abs() <= 0.3, "sum was {sum}");
    }

    #[test]
    fn test_main_sleep_preferred_over_nap() {
        let payload = json!({"sleep": [
            entry("2025-08-30", false, 60.0),
            entry("2025-08-30", true, 450.0),
        ]});
        let record = normalize_sleep(&payload).unwrap().unwrap();
        assert!(record.is_main_sleep);
        assert_eq!(record.minutes_asleep, Some(450.0));
    }

    #[test]
    fn test_no_main_flag_falls_back_to_first() {
        let payload = json!({"sleep": [
            entry("2025-08-30", false, 120.0),
            entry("2025-08-30", false, 90.0),
        ]});
        let record = normalize_sleep(&payload).unwrap().unwrap();
        assert_eq!(record.minutes_asleep, Some(120.0));
    }

    #[test]
    fn test_absent_list_yields_none() {
        assert!(normalize_sleep(&json!({"sleep": []})).unwrap().is_none());
        assert!(normalize_sleep(&json!({})).unwrap().is_none());
    }

    #[test]
    fn test_zero_stage_total_yields_null_percents() {
        let payload = json!({"sleep": [{
            "dateOfSleep": "2025-08-30",
            "isMainSleep": true,
            "minutesAsleep": 0,
            "levels": {"summary": {
                "deep": {"minutes": 0},
                "light": {"minutes": 0},
                "rem": {"minutes": 0}
            }}
        }]});
        let record = normalize_sleep(&payload).unwrap().unwrap();
        assert!(record.duration_hours.is_none());
        let stages = record.stages.unwrap();
        assert!(stages.deep_percent.is_none());
        assert!(stages.light_percent.is_none());
        assert!(stages.rem_percent.is_none());
    }

    #[test]
    fn test_history_descending_chart_ascending() {
        let payload = json!({"sleep": [
            entry("2025-08-28", true, 400.0),
            entry("2025-08-30", true, 450.0),
            entry("2025-08-29", true, 420.0),
        ]});

        let history = build_sleep_history(&payload).unwrap();
        let dates: Vec<&str> = history.records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2025-08-30", "2025-08-29", "2025-08-28"]);

        let chart = build_stage_chart(&payload).unwrap();
        let dates: Vec<&str> = chart.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, ["2025-08-28", "2025-08-29", "2025-08-30"]);
    }

    #[test]
    fn test_history_window_stats() {
        let payload = json!({"sleep": [
            entry("2025-08-29", true, 420.0),
            entry("2025-08-30", true, 450.0),
        ]});
        let history = build_sleep_history(&payload).unwrap();
        // (7.0 + 7.5) / 2
        assert_eq!(history.duration_hours.average, Some(7.25));
        assert_eq!(history.duration_hours.min, Some(7.0));
        assert_eq!(history.duration_hours.max, Some(7.5));
    }
}
