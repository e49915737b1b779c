// ABOUTME: Per-family payload normalizers and shared aggregation statistics
// ABOUTME: Converts raw provider JSON into stable records with derived numbers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Normalizer & aggregator layer.
//!
//! Each metric family owns its typed raw DTOs and a normalized record shape;
//! all families share the statistics helpers in [`stats`]. The invariant
//! throughout: a numeric field the provider may omit is represented as
//! present-but-null, never absent, so consumers see a fixed schema.

pub mod active_zone;
pub mod activity;
pub mod breathing_rate;
pub mod cardio_fitness;
pub mod heart_rate;
pub mod hrv;
pub mod sleep;
pub mod spo2;
pub mod stats;
pub mod temperature;

use crate::errors::{GatewayError, GatewayResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize a raw payload into a family's typed DTOs.
pub(crate) fn parse_payload<T: DeserializeOwned>(payload: &Value) -> GatewayResult<T> {
    serde_json::from_value(payload.clone())
        .map_err(|err| GatewayError::serialization(format!("Unexpected provider payload: {err}")))
}
