// ABOUTME: Authenticated, retried, classified HTTP access to the Fitbit API
// ABOUTME: One refresh-and-retry on 401, distinct rate-limit and provider errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! The metrics gateway.
//!
//! [`Gateway::execute`] performs a single authenticated GET described by a
//! [`MetricRequest`] and classifies every failure. The gateway performs no
//! semantic interpretation of successful payloads — the JSON body is handed
//! verbatim to the per-family normalizers. There is no retry beyond the
//! single 401-triggered reattempt; backoff for 429 is delegated to callers.

pub mod requests;

pub use requests::{DayRange, MetricRequest};

use crate::config::GatewayConfig;
use crate::credentials::CredentialStore;
use crate::errors::{GatewayError, GatewayResult};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum characters of a provider error body carried in diagnostics.
const BODY_EXCERPT_CHARS: usize = 200;

/// Authenticated access to the Fitbit Web API.
pub struct Gateway {
    client: reqwest::Client,
    api_base: String,
    /// Fixed bound applied to every outbound call, independent of how the
    /// injected client was built.
    timeout: Duration,
    store: Arc<CredentialStore>,
}

impl Gateway {
    #[must_use]
    pub fn new(config: &GatewayConfig, client: reqwest::Client, store: Arc<CredentialStore>) -> Self {
        Self {
            client,
            api_base: config.api_base.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            store,
        }
    }

    /// Handle to the injected credential store.
    #[must_use]
    pub fn credential_store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Execute one metric request and return the raw JSON payload.
    ///
    /// A 401 triggers one credential refresh followed by exactly one retry of
    /// the identical request; a second 401 after a successful refresh is not
    /// retried again and surfaces as `AuthExpired`.
    ///
    /// # Errors
    ///
    /// * `Unauthenticated` — no access token is held (no HTTP is issued)
    /// * `AuthExpired` — refresh failed, or 401 persisted after refresh
    /// * `RateLimited` — provider returned 429
    /// * `Timeout` / `Unavailable` — transport-level failures
    /// * `ProviderError` — any other non-2xx, with status and body excerpt
    pub async fn execute(&self, request: &MetricRequest) -> GatewayResult<Value> {
        let token = self
            .store
            .access_token()
            .await
            .ok_or_else(GatewayError::unauthenticated)?;

        let response = self.send(request, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "Access token rejected, attempting refresh");
            // Refresh failure surfaces AuthExpired immediately, zero retries.
            let _outcome = self.store.refresh().await?;

            let token = self
                .store
                .access_token()
                .await
                .ok_or_else(|| GatewayError::auth_expired("Credential lost during refresh"))?;
            let retried = self.send(request, &token).await?;
            return Self::classify(retried).await;
        }

        Self::classify(response).await
    }

    async fn send(&self, request: &MetricRequest, token: &str) -> GatewayResult<reqwest::Response> {
        let url = url::Url::parse(&format!("{}{}", self.api_base, request.path))
            .map_err(|err| GatewayError::config(format!("Invalid request URL: {err}")))?;

        debug!(path = %request.path, "Fitbit API request");

        // Transport errors and timeouts are classified by the From impl.
        Ok(self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&request.query)
            .timeout(self.timeout)
            .send()
            .await?)
    }

    /// Map a received response to a payload or a classified error.
    async fn classify(response: reqwest::Response) -> GatewayResult<Value> {
        let status = response.status();

        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|err| GatewayError::serialization(err.to_string()).with_source(err));
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(GatewayError::auth_expired(
                "Authentication still rejected after token refresh",
            )),
            StatusCode::TOO_MANY_REQUESTS => Err(GatewayError::rate_limited()),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(GatewayError::provider(status.as_u16(), truncate(&body)))
            }
        }
    }
}

/// Truncate a provider body to a bounded diagnostic excerpt.
fn truncate(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_bounds_excerpt() {
        let long = "x".repeat(1000);
        assert_eq!(truncate(&long).len(), BODY_EXCERPT_CHARS);
        assert_eq!(truncate("short"), "short");
    }
}
