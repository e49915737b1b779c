// ABOUTME: Credential persistence sinks for refreshed token pairs
// ABOUTME: Local file sink plus managed Secret Manager sink (new version per refresh)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Persistence backends for refreshed credentials.
//!
//! Which sink is active depends on the deployment: when a secret resource is
//! configured via `FITBIT_TOKENS_SECRET` refreshed credentials are written
//! back as a new secret version, otherwise they go to the token file. Sink
//! failures are reported to the caller, which treats them as soft warnings —
//! an unpersisted token that is valid in memory still serves the process.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// GCE metadata server endpoint for workload access tokens.
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Destination for a refreshed credential payload.
#[async_trait]
pub trait CredentialSink: Send + Sync {
    /// Write the serialized credential JSON to the backing store.
    async fn write(&self, payload: &str) -> Result<()>;

    /// Human-readable target description for log messages.
    fn describe(&self) -> String;
}

/// Writes credentials to a local JSON file, creating parent directories.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CredentialSink for FileSink {
    async fn write(&self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&self.path, payload)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Credentials written to token file");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Adds a new secret version through the Google Secret Manager REST API,
/// authenticating with a workload token from the GCE metadata server.
pub struct SecretManagerSink {
    client: reqwest::Client,
    /// Full resource name, e.g. `projects/p/secrets/fitbit-tokens`.
    secret_name: String,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl SecretManagerSink {
    #[must_use]
    pub fn new(client: reqwest::Client, secret_name: String) -> Self {
        Self {
            client,
            secret_name,
        }
    }

    async fn workload_token(&self) -> Result<String> {
        let token: MetadataToken = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .context("Metadata server unreachable")?
            .error_for_status()
            .context("Metadata server rejected token request")?
            .json()
            .await
            .context("Metadata token response was not valid JSON")?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl CredentialSink for SecretManagerSink {
    async fn write(&self, payload: &str) -> Result<()> {
        let token = self.workload_token().await?;
        let url = format!(
            "https://secretmanager.googleapis.com/v1/{}:addVersion",
            self.secret_name
        );
        let body = serde_json::json!({
            "payload": { "data": STANDARD.encode(payload) }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("Secret Manager request failed")?;

        let status = response.status();
        if !status.is_success() {
            let excerpt = response.text().await.unwrap_or_default();
            bail!("Secret Manager addVersion returned {status}: {excerpt}");
        }

        info!(secret = %self.secret_name, "Credentials stored as new secret version");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("secret {}", self.secret_name)
    }
}
