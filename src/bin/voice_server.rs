//! Workout voice command server
//!
//! Serves `/api/health`, `/api/speech` and `/api/interpret`. Configuration
//! comes from the environment (see `AppConfig`), optionally via `.env`.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coach_voice::api::{create_router, AppState};
use coach_voice::service::{build_matcher, build_transcriber};
use coach_voice::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "coach_voice=debug,coach_intent=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting workout voice command server");

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let matcher = build_matcher(&config).context("Failed to build interpreter")?;

    let mut state = AppState::new(matcher);
    if let Some(transcriber) =
        build_transcriber(&config).context("Failed to build speech-to-text client")?
    {
        state = state.with_transcriber(transcriber);
    }
    if !state.speech_ready() {
        tracing::warn!("Speech pipeline incomplete, /api/speech will answer 503");
    }

    let app = create_router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
