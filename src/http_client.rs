// ABOUTME: Outbound HTTP client construction with configured timeouts
// ABOUTME: One pooled client built from gateway config, cloned where needed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::config::GatewayConfig;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Connect timeout, separate from the overall request bound.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Build the outbound client for provider API and token-exchange calls.
///
/// Built once at startup and cloned into the store and gateway; reqwest
/// clones share one connection pool. The overall request timeout comes from
/// `timeout_secs`. The gateway and the token exchange also apply the bound
/// per request, so an unconfigured client cannot relax it.
#[must_use]
pub fn build_client(config: &GatewayConfig) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
}
