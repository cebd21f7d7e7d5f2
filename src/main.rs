mod auth;
mod config;
mod demo;
mod error;
mod export;
mod generator;
mod models;
mod openrouter;
mod prompt;
mod routes;

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{CorsLayer, Any};
use tracing_subscriber::{fmt, EnvFilter};

use crate::auth::ForwardedAuth;
use crate::config::AppConfig;
use crate::demo::DemoGenerator;
use crate::export::ArboardClipboard;
use crate::generator::ScriptGenerator;
use crate::openrouter::OpenRouterClient;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let generator: Arc<dyn ScriptGenerator> = if config.demo_mode {
        tracing::info!("Demo mode enabled - scripts are rendered offline");
        Arc::new(DemoGenerator)
    } else {
        if config.completion.api_key.is_none() {
            tracing::warn!("OPENROUTER_API_KEY is not set; generation requests will fail until it is configured");
        }
        Arc::new(OpenRouterClient::new(config.completion.clone()).context("failed to build completion client")?)
    };
    tracing::info!(model = %config.completion.model, generator = generator.name(), "Completion backend ready");

    let state = AppState::new(
        generator,
        Arc::new(ArboardClipboard),
        Arc::new(ForwardedAuth::new(config.auth.clone())),
    );

    let app = router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
