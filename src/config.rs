// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles OAuth client identity, credential sources, and runtime tuning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration for the gateway.
//!
//! All configuration is read once at startup; malformed values are logged and
//! replaced with documented defaults rather than aborting the process.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Default Fitbit Web API host.
pub const DEFAULT_API_BASE: &str = "https://api.fitbit.com";

/// Default outbound request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Strongly typed log level with fallback parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string, defaulting to `Info` for unrecognized values.
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// OAuth client identity used for the refresh-token exchange.
#[derive(Debug, Clone, Default)]
pub struct ClientIdentity {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl ClientIdentity {
    /// True when both halves of the identity are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// Gateway runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// OAuth application identity (`FITBIT_CLIENT_ID` / `FITBIT_CLIENT_SECRET`).
    pub identity: ClientIdentity,
    /// Complete credential JSON supplied via `FITBIT_TOKENS` (precedence #1).
    pub token_env_blob: Option<String>,
    /// Persisted credential file (`FITBIT_TOKEN_FILE`, precedence #2).
    pub token_file: PathBuf,
    /// Managed secret resource name (`FITBIT_TOKENS_SECRET`). When set,
    /// refreshed credentials are written back as a new secret version.
    pub tokens_secret: Option<String>,
    /// API base URL; overridable for tests via `FITBIT_API_BASE`.
    pub api_base: String,
    /// Fixed outbound request timeout in seconds.
    pub timeout_secs: u64,
    /// Log level (`LOG_LEVEL`).
    pub log_level: LogLevel,
    /// Emit JSON-formatted logs (`LOG_FORMAT=json`).
    pub json_logs: bool,
}

impl GatewayConfig {
    /// Load configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let identity = ClientIdentity {
            client_id: non_empty_var("FITBIT_CLIENT_ID"),
            client_secret: non_empty_var("FITBIT_CLIENT_SECRET"),
        };

        let token_file = non_empty_var("FITBIT_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_token_file);

        let timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid HTTP_TIMEOUT_SECS '{raw}', using default {DEFAULT_TIMEOUT_SECS}");
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            identity,
            token_env_blob: non_empty_var("FITBIT_TOKENS"),
            token_file,
            tokens_secret: non_empty_var("FITBIT_TOKENS_SECRET"),
            api_base: non_empty_var("FITBIT_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout_secs,
            log_level: LogLevel::from_str_or_default(
                &env::var("LOG_LEVEL").unwrap_or_default(),
            ),
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

/// Read an env var, treating empty strings as absent.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Default persisted-token location under the user config directory.
fn default_token_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fitbit-gateway")
        .join("tokens.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
        assert_eq!(LogLevel::from_str_or_default(""), LogLevel::Info);
    }

    #[test]
    fn test_client_identity_completeness() {
        let empty = ClientIdentity::default();
        assert!(!empty.is_complete());

        let full = ClientIdentity {
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
        };
        assert!(full.is_complete());
    }
}
