// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Polovnjaci upload sideband
//!
//! Local development server that stores pictures posted by the upload page
//! and hands back their public paths.

use polovnjaci::config::Config;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(port = config.upload_port, "Starting Polovnjaci upload sideband");

    tokio::fs::create_dir_all(&config.pictures_dir).await?;
    tracing::info!(path = %config.pictures_dir.display(), "Pictures directory ready");

    let addr = format!("127.0.0.1:{}", config.upload_port);
    let app = polovnjaci::routes::create_router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let mut filter = EnvFilter::from_default_env();
    for directive in ["polovnjaci=debug", "info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry().with(filter).with(format).init();
}
