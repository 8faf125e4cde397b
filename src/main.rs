// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sheet-Relay Bot
//!
//! Long-polls Telegram, logs every text message to a Google Sheets
//! worksheet, and serves a liveness endpoint for process supervisors.

use anyhow::Context;
use sheet_relay::{
    config::Config,
    db::{GoogleSheetsGateway, SheetGateway},
    models::Credential,
    services::{dispatcher, ChatTransport, CommandRouter, DispatcherConfig, TelegramClient},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Startup failures are fatal: nothing touches the network with bad config.
    let config = Config::from_env().context("Failed to load configuration")?;
    let credential =
        Credential::validate(&config.google_credentials).context("Invalid GOOGLE_CREDENTIALS")?;
    tracing::info!(
        project = %credential.project_id,
        client_email = %credential.client_email,
        "Service account credential validated"
    );

    let gateway: Arc<dyn SheetGateway> = Arc::new(
        GoogleSheetsGateway::new(
            credential,
            &config.sheet_id,
            &config.worksheet,
            &config.sheets_api_base,
            config.http_timeout,
        )
        .context("Failed to initialize Google Sheets gateway")?,
    );

    let transport: Arc<dyn ChatTransport> = Arc::new(
        TelegramClient::new(
            &config.telegram_api_base,
            &config.bot_token,
            config.http_timeout,
        )
        .context("Failed to initialize Telegram client")?,
    );

    let router = CommandRouter::new(gateway);

    // Liveness server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Liveness server listening");
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, sheet_relay::routes::create_router()).await {
            tracing::error!(error = %e, "Liveness server failed");
        }
    });

    tracing::info!("Bot running (long polling)");
    dispatcher::run(
        transport,
        router,
        DispatcherConfig {
            worker_count: config.worker_count,
            queue_capacity: config.queue_capacity,
            ..Default::default()
        },
        shutdown_signal(),
    )
    .await;

    server.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sheet_relay=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
