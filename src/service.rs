// ABOUTME: Consumer-facing operations: per-family today and history queries
// ABOUTME: Stable envelopes carrying normalized fields, raw_data, and insights
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! The consumer contract.
//!
//! Every metric family exposes a "today" operation and a "history over N
//! days" operation. Each returns a [`MetricEnvelope`]: the normalized fields
//! at the top level, the raw provider payload under `raw_data`, and an
//! `insights` list that is reserved for future use and always empty.

use crate::errors::GatewayResult;
use crate::gateway::requests::{self, range_ending_today, DayRange};
use crate::gateway::Gateway;
use crate::metrics::active_zone::{self, ActiveZoneHistory, ActiveZoneRecord};
use crate::metrics::activity::{self, ActivityRecord, TimeSeriesHistory, TimeSeriesPoint};
use crate::metrics::breathing_rate::{self, BreathingRateHistory, BreathingRateRecord};
use crate::metrics::cardio_fitness::{self, CardioFitnessHistory, CardioFitnessRecord};
use crate::metrics::heart_rate::{self, HeartRateHistory, HeartRateRecord};
use crate::metrics::hrv::{self, HrvHistory, HrvRecord};
use crate::metrics::sleep::{self, SleepHistory, SleepRecord, SleepStagePoint};
use crate::metrics::spo2::{self, Spo2History, Spo2Record};
use crate::metrics::temperature::{self, TemperatureHistory, TemperatureRecord};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

/// Stable response envelope for every consumer operation.
#[derive(Debug, Serialize)]
pub struct MetricEnvelope<T: Serialize> {
    #[serde(flatten)]
    pub data: T,
    /// Raw provider payload, attached verbatim.
    pub raw_data: Value,
    /// Reserved for future use; always empty.
    pub insights: Vec<Value>,
}

impl<T: Serialize> MetricEnvelope<T> {
    fn new(data: T, raw_data: Value) -> Self {
        Self {
            data,
            raw_data,
            insights: Vec::new(),
        }
    }
}

/// A single date's normalized record (null when the provider had no data).
#[derive(Debug, Serialize)]
pub struct Daily<T: Serialize> {
    pub date: String,
    pub record: Option<T>,
}

/// Time-ordered points for plotting.
#[derive(Debug, Serialize)]
pub struct Chart<T: Serialize> {
    pub points: Vec<T>,
}

/// Raw-order paged log list.
#[derive(Debug, Serialize)]
pub struct LogList<T: Serialize> {
    pub records: Vec<T>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Consumer-facing metric operations over one gateway.
pub struct MetricsService {
    gateway: Gateway,
}

impl MetricsService {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// The underlying gateway (report assembly fetches through it too).
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    // Sleep

    pub async fn sleep_today(&self) -> GatewayResult<MetricEnvelope<Daily<SleepRecord>>> {
        let date = today();
        let payload = self.gateway.execute(&requests::sleep_by_date(date)).await?;
        let record = sleep::normalize_sleep(&payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    pub async fn sleep_history(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<SleepHistory>> {
        let days = DayRange::STANDARD.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::sleep_by_range(start, end))
            .await?;
        let history = sleep::build_sleep_history(&payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }

    /// Stage minutes over a range, ascending by date for plotting.
    pub async fn sleep_stage_chart(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<Chart<SleepStagePoint>>> {
        let days = DayRange::STANDARD.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::sleep_by_range(start, end))
            .await?;
        let points = sleep::build_stage_chart(&payload)?;
        Ok(MetricEnvelope::new(Chart { points }, payload))
    }

    /// Paged sleep log list, most recent first (provider ordering).
    pub async fn sleep_log_list(
        &self,
        limit: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<LogList<SleepRecord>>> {
        let limit = DayRange::SLEEP_LIST.clamp(limit);
        let payload = self
            .gateway
            .execute(&requests::sleep_list(today(), limit))
            .await?;
        let records = sleep::normalize_sleep_list(&payload)?;
        Ok(MetricEnvelope::new(LogList { records }, payload))
    }

    // Activity

    pub async fn activity_today(&self) -> GatewayResult<MetricEnvelope<Daily<ActivityRecord>>> {
        let date = today();
        let payload = self
            .gateway
            .execute(&requests::activity_summary(date))
            .await?;
        let record = activity::normalize_activity(&fmt_date(date), &payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    /// Time series for one activity resource, most recent first.
    pub async fn activity_history(
        &self,
        resource: &str,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<TimeSeriesHistory>> {
        let days = DayRange::ACTIVITY_SERIES.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::activity_time_series(resource, start, end))
            .await?;
        let history = activity::build_series_history(resource, &payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }

    /// Time series for one activity resource, ascending for plotting.
    pub async fn activity_chart(
        &self,
        resource: &str,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<Chart<TimeSeriesPoint>>> {
        let days = DayRange::ACTIVITY_SERIES.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::activity_time_series(resource, start, end))
            .await?;
        let points = activity::build_series_chart(resource, &payload)?;
        Ok(MetricEnvelope::new(Chart { points }, payload))
    }

    // Heart rate

    pub async fn heart_rate_today(&self) -> GatewayResult<MetricEnvelope<Daily<HeartRateRecord>>> {
        let date = today();
        let payload = self.gateway.execute(&requests::heart_by_date(date)).await?;
        let record = heart_rate::normalize_heart_rate(&payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    pub async fn heart_rate_history(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<HeartRateHistory>> {
        let days = DayRange::STANDARD.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::heart_by_range(start, end))
            .await?;
        let history = heart_rate::build_heart_history(&payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }

    // HRV

    pub async fn hrv_today(&self) -> GatewayResult<MetricEnvelope<Daily<HrvRecord>>> {
        let date = today();
        let payload = self.gateway.execute(&requests::hrv_by_date(date)).await?;
        let record = hrv::normalize_hrv(&payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    pub async fn hrv_history(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<HrvHistory>> {
        let days = DayRange::VITALS.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::hrv_by_range(start, end))
            .await?;
        let history = hrv::build_hrv_history(&payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }

    // SpO2

    pub async fn spo2_today(&self) -> GatewayResult<MetricEnvelope<Daily<Spo2Record>>> {
        let date = today();
        let payload = self.gateway.execute(&requests::spo2_by_date(date)).await?;
        let record = spo2::normalize_spo2(&payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    pub async fn spo2_history(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<Spo2History>> {
        let days = DayRange::VITALS.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::spo2_by_range(start, end))
            .await?;
        let history = spo2::build_spo2_history(&payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }

    // Breathing rate

    pub async fn breathing_rate_today(
        &self,
    ) -> GatewayResult<MetricEnvelope<Daily<BreathingRateRecord>>> {
        let date = today();
        let payload = self
            .gateway
            .execute(&requests::breathing_rate_by_date(date))
            .await?;
        let record = breathing_rate::normalize_breathing_rate(&payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    pub async fn breathing_rate_history(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<BreathingRateHistory>> {
        let days = DayRange::VITALS.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::breathing_rate_by_range(start, end))
            .await?;
        let history = breathing_rate::build_breathing_history(&payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }

    // Skin temperature

    pub async fn temperature_today(
        &self,
    ) -> GatewayResult<MetricEnvelope<Daily<TemperatureRecord>>> {
        let date = today();
        let payload = self
            .gateway
            .execute(&requests::temperature_by_date(date))
            .await?;
        let record = temperature::normalize_temperature(&payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    pub async fn temperature_history(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<TemperatureHistory>> {
        let days = DayRange::VITALS.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::temperature_by_range(start, end))
            .await?;
        let history = temperature::build_temperature_history(&payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }

    // Cardio fitness

    pub async fn cardio_fitness_today(
        &self,
    ) -> GatewayResult<MetricEnvelope<Daily<CardioFitnessRecord>>> {
        let date = today();
        let payload = self
            .gateway
            .execute(&requests::cardio_fitness_by_date(date))
            .await?;
        let record = cardio_fitness::normalize_cardio_fitness(&payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    pub async fn cardio_fitness_history(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<CardioFitnessHistory>> {
        let days = DayRange::VITALS.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::cardio_fitness_by_range(start, end))
            .await?;
        let history = cardio_fitness::build_cardio_history(&payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }

    // Active Zone Minutes

    pub async fn active_zone_today(
        &self,
    ) -> GatewayResult<MetricEnvelope<Daily<ActiveZoneRecord>>> {
        let date = today();
        let payload = self.gateway.execute(&requests::azm_by_date(date)).await?;
        let record = active_zone::normalize_active_zone(&payload)?;
        Ok(MetricEnvelope::new(
            Daily {
                date: fmt_date(date),
                record,
            },
            payload,
        ))
    }

    pub async fn active_zone_history(
        &self,
        days: Option<i64>,
    ) -> GatewayResult<MetricEnvelope<ActiveZoneHistory>> {
        let days = DayRange::STANDARD.clamp(days);
        let (start, end) = range_ending_today(days);
        let payload = self
            .gateway
            .execute(&requests::azm_by_range(start, end))
            .await?;
        let history = active_zone::build_active_zone_history(&payload)?;
        Ok(MetricEnvelope::new(history, payload))
    }
}
