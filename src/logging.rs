// ABOUTME: Structured logging setup built on tracing-subscriber
// ABOUTME: Configures level filtering and json/pretty output from gateway config
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::config::GatewayConfig;
use anyhow::Result;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level; HTTP-stack noise is
/// capped at `warn` either way. Call once at process start.
///
/// # Errors
///
/// Returns an error if a subscriber was already installed.
pub fn init_logging(config: &GatewayConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()))
        .add_directive(
            "hyper=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
        .add_directive(
            "reqwest=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        );

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_logs {
        let json_layer = fmt::layer()
            .with_target(true)
            .with_writer(io::stdout)
            .json();
        registry.with(json_layer).try_init()?;
    } else {
        let pretty_layer = fmt::layer().with_target(true).with_writer(io::stdout);
        registry.with(pretty_layer).try_init()?;
    }

    info!(
        log.level = %config.log_level,
        api_base = %config.api_base,
        "fitbit-gateway logging initialized"
    );

    Ok(())
}
