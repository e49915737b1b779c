// ABOUTME: Unified error taxonomy for gateway and normalization failures
// ABOUTME: Maps error kinds to HTTP statuses and a structured response body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Error handling for the Fitbit gateway.
//!
//! Every failure surfaced to a consumer carries an [`ErrorCode`] tag so the
//! outer surface (routes, scheduled jobs) can map it to a distinct HTTP status
//! and decide whether the condition is retryable.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error kind tags surfaced to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No credential is loaded; out-of-band authentication required.
    #[serde(rename = "UNAUTHENTICATED")]
    Unauthenticated,
    /// A 401 that survived (or skipped) the refresh handshake.
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired,
    /// Provider returned 429; caller should back off (~150 requests/hour).
    #[serde(rename = "RATE_LIMITED")]
    RateLimited,
    /// Request exceeded the fixed outbound timeout.
    #[serde(rename = "TIMEOUT")]
    Timeout,
    /// Network/transport failure before a response was received.
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
    /// Any other non-2xx provider response.
    #[serde(rename = "PROVIDER_ERROR")]
    ProviderError,
    /// Missing or malformed process configuration.
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    /// Payload did not match the expected provider shape.
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError,
}

impl ErrorCode {
    /// HTTP status the outer surface should respond with for this kind.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::Unauthenticated | ErrorCode::AuthExpired => 401,
            ErrorCode::RateLimited => 429,
            ErrorCode::Timeout => 504,
            ErrorCode::Unavailable => 503,
            // ProviderError forwards the originating status; 502 is the
            // fallback when none was captured.
            ErrorCode::ProviderError => 502,
            ErrorCode::ConfigError | ErrorCode::SerializationError => 500,
        }
    }

    /// User-facing description of this error kind.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "No Fitbit credentials are loaded",
            ErrorCode::AuthExpired => "Fitbit authentication has expired",
            ErrorCode::RateLimited => "Fitbit API rate limit exceeded",
            ErrorCode::Timeout => "Request to the Fitbit API timed out",
            ErrorCode::Unavailable => "The Fitbit API could not be reached",
            ErrorCode::ProviderError => "The Fitbit API returned an error",
            ErrorCode::ConfigError => "Gateway configuration is missing or invalid",
            ErrorCode::SerializationError => "Provider payload could not be parsed",
        }
    }
}

/// Unified error type for all gateway operations.
#[derive(Debug, Error)]
pub struct GatewayError {
    /// Error kind tag.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Originating HTTP status for `ProviderError`.
    pub provider_status: Option<u16>,
    /// Source error for chaining.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GatewayError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_status: None,
            source: None,
        }
    }

    /// Attach a source error for chaining.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status for the outer surface: the originating provider status
    /// when one was captured, otherwise the kind's canonical mapping.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.provider_status.unwrap_or_else(|| self.code.http_status())
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            ErrorCode::Unauthenticated,
            "No access token loaded; complete the OAuth flow first",
        )
    }

    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthExpired, message)
    }

    pub fn rate_limited() -> Self {
        Self::new(
            ErrorCode::RateLimited,
            "Fitbit rate limit reached; retry after the rolling window resets",
        )
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unavailable, message)
    }

    /// Generic provider failure carrying the status and a body excerpt.
    pub fn provider(status: u16, body_excerpt: impl Into<String>) -> Self {
        let mut err = Self::new(
            ErrorCode::ProviderError,
            format!("Fitbit API error {status}: {}", body_excerpt.into()),
        );
        err.provider_status = Some(status);
        err
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Classify transport-level failures from reqwest.
impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GatewayError::timeout(error.to_string()).with_source(error)
        } else if error.is_decode() {
            GatewayError::serialization(error.to_string()).with_source(error)
        } else {
            GatewayError::unavailable(error.to_string()).with_source(error)
        }
    }
}

/// Result alias used throughout the crate.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Serializable error body for outer surfaces.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorResponseDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<u16>,
}

impl From<GatewayError> for ErrorResponse {
    fn from(error: GatewayError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                provider_status: error.provider_status,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::Unauthenticated.http_status(), 401);
        assert_eq!(ErrorCode::AuthExpired.http_status(), 401);
        assert_eq!(ErrorCode::RateLimited.http_status(), 429);
        assert_eq!(ErrorCode::Timeout.http_status(), 504);
        assert_eq!(ErrorCode::Unavailable.http_status(), 503);
    }

    #[test]
    fn test_provider_error_forwards_status() {
        let err = GatewayError::provider(404, "resource not found");
        assert_eq!(err.http_status(), 404);
        assert_eq!(err.code, ErrorCode::ProviderError);
    }

    #[test]
    fn test_error_response_serialization() {
        let err = GatewayError::provider(500, "upstream exploded");
        let response = ErrorResponse::from(err);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("PROVIDER_ERROR"));
        assert!(json.contains("provider_status"));
    }

    #[test]
    fn test_rate_limited_mapping() {
        let err = GatewayError::rate_limited();
        assert_eq!(err.http_status(), 429);
    }
}
