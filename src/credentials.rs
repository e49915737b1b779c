// ABOUTME: Credential store owning the Fitbit access/refresh token pair
// ABOUTME: Load precedence, single-flight refresh handshake, soft-failure persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Single source of truth for the active Fitbit credential.
//!
//! The store is constructed once at startup and injected wherever provider
//! calls are made; there is no global lookup. The credential is replaced
//! wholesale on every successful refresh and never partially mutated. No
//! expiry timestamp is tracked — expiration is discovered reactively via a
//! 401 response.

use crate::config::{ClientIdentity, GatewayConfig};
use crate::errors::{GatewayError, GatewayResult};
use crate::oauth;
use crate::secrets::{CredentialSink, FileSink, SecretManagerSink};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// The provider access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of the persistence phase of a refresh.
///
/// Persistence failure is a recorded soft failure, never an error: a token
/// that is valid in memory keeps the current process operating even when the
/// write-back did not land.
#[derive(Debug, Clone, Default)]
pub struct PersistOutcome {
    /// Whether the credential reached the backing store.
    pub persisted: bool,
    /// Soft-failure detail when it did not.
    pub warning: Option<String>,
}

impl PersistOutcome {
    fn ok() -> Self {
        Self {
            persisted: true,
            warning: None,
        }
    }

    fn soft_failure(warning: String) -> Self {
        Self {
            persisted: false,
            warning: Some(warning),
        }
    }
}

/// Owns the active credential and performs the refresh handshake.
pub struct CredentialStore {
    credential: RwLock<Option<Credential>>,
    /// Serializes refreshes so concurrent 401s coalesce onto one exchange.
    refresh_gate: Mutex<()>,
    identity: ClientIdentity,
    api_base: String,
    /// Bound applied to the token exchange, independent of the injected client.
    timeout: Duration,
    env_blob: Option<String>,
    token_file: PathBuf,
    sink: Box<dyn CredentialSink>,
    client: reqwest::Client,
}

impl CredentialStore {
    /// Build a store from configuration. The persistence sink follows the
    /// deployment's credential channel: secret store when a secret resource
    /// is configured, local token file otherwise.
    #[must_use]
    pub fn new(config: &GatewayConfig, client: reqwest::Client) -> Self {
        let sink: Box<dyn CredentialSink> = match &config.tokens_secret {
            Some(secret) => Box::new(SecretManagerSink::new(client.clone(), secret.clone())),
            None => Box::new(FileSink::new(config.token_file.clone())),
        };

        Self {
            credential: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            identity: config.identity.clone(),
            api_base: config.api_base.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            env_blob: config.token_env_blob.clone(),
            token_file: config.token_file.clone(),
            sink,
            client,
        }
    }

    /// Load the initial credential, called once at process start.
    ///
    /// Precedence: environment JSON blob first, persisted token file second.
    /// The first well-formed candidate wins; malformed JSON at either source
    /// is logged and treated as absent. If neither yields a credential the
    /// store starts empty and gateway calls fail with `Unauthenticated`.
    pub async fn load(&self) {
        if let Some(blob) = &self.env_blob {
            match serde_json::from_str::<Credential>(blob) {
                Ok(credential) => {
                    info!("Credentials loaded from environment blob");
                    *self.credential.write().await = Some(credential);
                    return;
                }
                Err(err) => {
                    warn!(error = %err, "FITBIT_TOKENS blob is not valid credential JSON, skipping");
                }
            }
        }

        match tokio::fs::read_to_string(&self.token_file).await {
            Ok(raw) => match serde_json::from_str::<Credential>(&raw) {
                Ok(credential) => {
                    info!(path = %self.token_file.display(), "Credentials loaded from token file");
                    *self.credential.write().await = Some(credential);
                }
                Err(err) => {
                    warn!(
                        path = %self.token_file.display(),
                        error = %err,
                        "Token file is not valid credential JSON, starting unauthenticated"
                    );
                }
            },
            Err(_) => {
                debug!(
                    path = %self.token_file.display(),
                    "No token file found, starting unauthenticated"
                );
            }
        }
    }

    /// Current in-memory access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.credential
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    /// Replace the stored credential out of band (initial OAuth flow, tests).
    pub async fn set_credential(&self, credential: Credential) {
        *self.credential.write().await = Some(credential);
    }

    /// Perform the refresh-token exchange and persist the result.
    ///
    /// Fails immediately, without a network call, when the refresh token or
    /// the client identity is missing. On a rejected exchange the stored
    /// state is left untouched. Concurrent callers are serialized; a caller
    /// that waited while a peer refreshed skips its own exchange and reuses
    /// the peer's token.
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` when the exchange cannot run or is rejected.
    pub async fn refresh(&self) -> GatewayResult<PersistOutcome> {
        let before = self.access_token().await;

        let _guard = self.refresh_gate.lock().await;

        // A peer holding the gate may have already swapped the credential.
        let current = self.access_token().await;
        if current != before {
            debug!("Refresh coalesced onto a concurrent exchange");
            return Ok(PersistOutcome::ok());
        }

        let refresh_token = {
            let stored = self.credential.read().await;
            match stored.as_ref() {
                Some(c) => c.refresh_token.clone(),
                None => {
                    return Err(GatewayError::auth_expired(
                        "Cannot refresh: no credential loaded",
                    ))
                }
            }
        };

        let (Some(client_id), Some(client_secret)) = (
            self.identity.client_id.as_deref(),
            self.identity.client_secret.as_deref(),
        ) else {
            return Err(GatewayError::auth_expired(
                "Cannot refresh: client identity is not configured",
            ));
        };

        let token = oauth::refresh_fitbit_token(
            &self.client,
            &self.api_base,
            client_id,
            client_secret,
            &refresh_token,
            self.timeout,
        )
        .await
        .map_err(|err| GatewayError::auth_expired(format!("Token refresh failed: {err}")))?;

        let credential = Credential {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        };

        // Wholesale atomic swap; the old pair is invalid once Fitbit rotates.
        *self.credential.write().await = Some(credential.clone());
        info!("Fitbit credential refreshed");

        Ok(self.persist(&credential).await)
    }

    /// Write a credential to the configured sink, downgrading any failure to
    /// a soft warning.
    pub async fn persist(&self, credential: &Credential) -> PersistOutcome {
        let payload = match serde_json::to_string_pretty(credential) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "Failed to serialize credential for persistence");
                return PersistOutcome::soft_failure(format!(
                    "credential serialization failed: {err}"
                ));
            }
        };

        match self.sink.write(&payload).await {
            Ok(()) => PersistOutcome::ok(),
            Err(err) => {
                warn!(
                    target = %self.sink.describe(),
                    error = %err,
                    "Credential persistence failed; in-memory token remains valid"
                );
                PersistOutcome::soft_failure(format!(
                    "persistence to {} failed: {err}",
                    self.sink.describe()
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_roundtrip() {
        let credential = Credential {
            access_token: "at".into(),
            refresh_token: "rt".into(),
        };
        let json = serde_json::to_string(&credential).unwrap();
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, credential);
    }

    #[test]
    fn test_persist_outcome_soft_failure() {
        let outcome = PersistOutcome::soft_failure("disk full".into());
        assert!(!outcome.persisted);
        assert!(outcome.warning.as_deref().unwrap().contains("disk full"));
    }
}
