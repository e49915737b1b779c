// ABOUTME: Composite report assembly: daily briefing and weekly summary
// ABOUTME: Per-family failures downgrade to null sub-sections, never abort the report
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Composite reports.
//!
//! A report independently fetches several metric families and merges the
//! successful sub-sections. This is the one place where a family-level
//! failure is intentionally downgraded: a single metric outage yields a null
//! sub-section instead of blanking the whole report. Baseline comparisons are
//! computed from already-fetched history, with the current date excluded from
//! its own window.

use crate::errors::GatewayResult;
use crate::metrics::active_zone::ActiveZoneHistory;
use crate::metrics::activity::{ActivityRecord, TimeSeriesHistory};
use crate::metrics::breathing_rate::BreathingRateRecord;
use crate::metrics::heart_rate::{HeartRateHistory, HeartRateRecord};
use crate::metrics::hrv::{self, HrvHistory, HrvRecord};
use crate::metrics::sleep::{SleepHistory, SleepRecord};
use crate::metrics::spo2::Spo2Record;
use crate::metrics::stats::BaselineComparison;
use crate::metrics::temperature::TemperatureRecord;
use crate::service::{MetricEnvelope, MetricsService};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

/// Trailing window used for briefing baselines: seven prior days plus today.
const BASELINE_FETCH_DAYS: i64 = 8;

/// Morning briefing: today's records across families plus "vs usual"
/// deviations from the trailing week.
#[derive(Debug, Serialize)]
pub struct DailyBriefing {
    pub date: String,
    pub sleep: Option<SleepRecord>,
    pub hrv: Option<HrvRecord>,
    pub heart_rate: Option<HeartRateRecord>,
    pub spo2: Option<Spo2Record>,
    pub breathing_rate: Option<BreathingRateRecord>,
    pub temperature: Option<TemperatureRecord>,
    pub activity: Option<ActivityRecord>,
    pub comparisons: BriefingComparisons,
}

/// Baseline deviations for the briefing's headline metrics.
#[derive(Debug, Serialize, Default)]
pub struct BriefingComparisons {
    pub sleep_duration_hours: BaselineComparison,
    pub hrv_daily_rmssd: BaselineComparison,
    pub resting_heart_rate: BaselineComparison,
}

/// Window statistics for each family over a clamped range.
#[derive(Debug, Serialize)]
pub struct WeeklySummary {
    pub start_date: String,
    pub end_date: String,
    pub sleep: Option<SleepHistory>,
    pub hrv: Option<HrvHistory>,
    pub heart_rate: Option<HeartRateHistory>,
    pub breathing_rate: Option<crate::metrics::breathing_rate::BreathingRateHistory>,
    pub spo2: Option<crate::metrics::spo2::Spo2History>,
    pub temperature: Option<crate::metrics::temperature::TemperatureHistory>,
    pub steps: Option<TimeSeriesHistory>,
    pub active_zone: Option<ActiveZoneHistory>,
}

/// Downgrade a family-level failure to a null sub-section.
fn subsection<T: Serialize>(
    family: &str,
    result: GatewayResult<MetricEnvelope<T>>,
) -> Option<T> {
    match result {
        Ok(envelope) => Some(envelope.data),
        Err(err) => {
            warn!(family, error = %err, "Report sub-section unavailable");
            None
        }
    }
}

/// Assemble the daily briefing. Never fails: each family fetch is wrapped.
pub async fn daily_briefing(service: &MetricsService) -> DailyBriefing {
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let (sleep_hist, hrv_hist, heart_hist, spo2, breathing, temperature, activity) = tokio::join!(
        service.sleep_history(Some(BASELINE_FETCH_DAYS)),
        service.hrv_history(Some(BASELINE_FETCH_DAYS)),
        service.heart_rate_history(Some(BASELINE_FETCH_DAYS)),
        service.spo2_today(),
        service.breathing_rate_today(),
        service.temperature_today(),
        service.activity_today(),
    );

    let sleep_hist = subsection("sleep", sleep_hist);
    let hrv_hist = subsection("hrv", hrv_hist);
    let heart_hist = subsection("heart_rate", heart_hist);

    let mut comparisons = BriefingComparisons::default();

    let sleep = sleep_hist.as_ref().and_then(|history| {
        let current = history.records.iter().find(|r| r.date == today).cloned();
        let window: Vec<f64> = history
            .records
            .iter()
            .filter(|r| r.date < today)
            .filter_map(|r| r.duration_hours)
            .collect();
        comparisons.sleep_duration_hours = BaselineComparison::compute(
            current.as_ref().and_then(|r| r.duration_hours),
            &window,
        );
        current
    });

    let hrv_record = hrv_hist.as_ref().and_then(|history| {
        comparisons.hrv_daily_rmssd = hrv::hrv_baseline(history, &today);
        history.records.iter().find(|r| r.date == today).cloned()
    });

    let heart_record = heart_hist.as_ref().and_then(|history| {
        let current = history.records.iter().find(|r| r.date == today).cloned();
        let window: Vec<f64> = history
            .records
            .iter()
            .filter(|r| r.date < today)
            .filter_map(|r| r.resting_heart_rate)
            .collect();
        comparisons.resting_heart_rate = BaselineComparison::compute(
            current.as_ref().and_then(|r| r.resting_heart_rate),
            &window,
        );
        current
    });

    DailyBriefing {
        date: today,
        sleep,
        hrv: hrv_record,
        heart_rate: heart_record,
        spo2: subsection("spo2", spo2).and_then(|daily| daily.record),
        breathing_rate: subsection("breathing_rate", breathing).and_then(|daily| daily.record),
        temperature: subsection("temperature", temperature).and_then(|daily| daily.record),
        activity: subsection("activity", activity).and_then(|daily| daily.record),
        comparisons,
    }
}

/// Assemble the weekly summary over a clamped day window. Never fails.
pub async fn weekly_summary(service: &MetricsService, days: Option<i64>) -> WeeklySummary {
    let days = crate::gateway::DayRange::STANDARD.clamp(days);
    let (start, end) = crate::gateway::requests::range_ending_today(days);

    let (sleep, hrv_hist, heart, breathing, spo2_hist, temperature, steps, active_zone) = tokio::join!(
        service.sleep_history(Some(days)),
        service.hrv_history(Some(days)),
        service.heart_rate_history(Some(days)),
        service.breathing_rate_history(Some(days)),
        service.spo2_history(Some(days)),
        service.temperature_history(Some(days)),
        service.activity_history("steps", Some(days)),
        service.active_zone_history(Some(days)),
    );

    WeeklySummary {
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: end.format("%Y-%m-%d").to_string(),
        sleep: subsection("sleep", sleep),
        hrv: subsection("hrv", hrv_hist),
        heart_rate: subsection("heart_rate", heart),
        breathing_rate: subsection("breathing_rate", breathing),
        spo2: subsection("spo2", spo2_hist),
        temperature: subsection("temperature", temperature),
        steps: subsection("steps", steps),
        active_zone: subsection("active_zone", active_zone),
    }
}
