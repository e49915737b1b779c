// ABOUTME: Fitbit Web API gateway with normalized health metrics
// ABOUTME: Token-managed request pipeline plus per-family normalization and baselines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # fitbit-gateway
//!
//! A token-managed gateway to the Fitbit Web API. The crate has two halves:
//!
//! - **Credential management** ([`credentials`]): owns the access/refresh
//!   token pair, loads it from an environment blob or a persisted file,
//!   performs the OAuth refresh handshake when a 401 reveals expiration, and
//!   persists renewed credentials best-effort.
//! - **Metrics gateway & normalizer** ([`gateway`], [`metrics`]): issues
//!   authenticated calls per metric family, recovers once from a 401 via the
//!   credential store, classifies failures, and turns each family's raw
//!   payload into a stable normalized record with derived statistics
//!   (rolling averages, baselines, percentage deviations).
//!
//! Consumers use [`service::MetricsService`] for per-family today/history
//! operations and [`reports`] for composite assemblies.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fitbit_gateway::config::GatewayConfig;
//! use fitbit_gateway::credentials::CredentialStore;
//! use fitbit_gateway::gateway::Gateway;
//! use fitbit_gateway::http_client;
//! use fitbit_gateway::service::MetricsService;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = GatewayConfig::from_env();
//! fitbit_gateway::logging::init_logging(&config)?;
//!
//! let client = http_client::build_client(&config);
//! let store = Arc::new(CredentialStore::new(&config, client.clone()));
//! store.load().await;
//!
//! let service = MetricsService::new(Gateway::new(&config, client, store));
//! let sleep = service.sleep_today().await?;
//! println!("{}", serde_json::to_string_pretty(&sleep)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod errors;
pub mod gateway;
pub mod http_client;
pub mod logging;
pub mod metrics;
pub mod oauth;
pub mod reports;
pub mod secrets;
pub mod service;

pub use errors::{ErrorCode, GatewayError, GatewayResult};
