// ABOUTME: OAuth2 refresh-token exchange against the Fitbit token endpoint
// ABOUTME: Basic-auth POST with grant_type=refresh_token form body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Fitbit `OAuth2` token handling.
//!
//! Expiration is discovered reactively through 401 responses, so the exchange
//! here only ever runs the `refresh_token` grant. Token lifetimes reported by
//! the provider are not tracked.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Fitbit OAuth 2.0 token response.
#[derive(Debug, Deserialize)]
pub struct FitbitTokenResponse {
    /// The access token
    pub access_token: String,
    /// Refresh token for obtaining new access tokens
    pub refresh_token: String,
    /// Token lifetime in seconds (informational only)
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated list of granted scopes
    #[serde(default)]
    pub scope: Option<String>,
    /// Fitbit user ID
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Exchange a refresh token for a new access/refresh token pair.
///
/// Fitbit requires client authentication as a Basic header built from
/// `client_id:client_secret`, with only the grant parameters in the form body.
/// The call is bounded by the same fixed outbound timeout as gateway requests.
///
/// # Errors
///
/// Returns an error if the request fails, the provider responds non-2xx, or
/// the response body cannot be parsed. Stored credential state is never
/// touched here; the caller decides what to do with the result.
pub async fn refresh_fitbit_token(
    client: &reqwest::Client,
    api_base: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
    timeout: Duration,
) -> Result<FitbitTokenResponse> {
    let basic = STANDARD.encode(format!("{client_id}:{client_secret}"));
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];

    let response = client
        .post(format!("{api_base}/oauth2/token"))
        .header("Authorization", format!("Basic {basic}"))
        .form(&params)
        .timeout(timeout)
        .send()
        .await
        .context("Token refresh request failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "Fitbit token refresh rejected");
        bail!("Token refresh failed with status {status}");
    }

    response
        .json::<FitbitTokenResponse>()
        .await
        .context("Token refresh response was not valid JSON")
}
