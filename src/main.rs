//! Grid Jury Server
//!
//! Chat transports relay signed commands to `POST /commands`; rendering
//! adapters read the board from `GET /session` or stream it over `GET /ws`.
//! A background task applies the daily tick while a game is running.

mod app;
mod commands;
mod config;
mod game;
mod http;
mod util;
mod ws;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::AppState;
use crate::config::Config;
use crate::game::GameService;
use crate::http::build_router;
use crate::util::time::init_server_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    init_tracing(&config);
    init_server_time();

    info!(
        board_size = config.game.board_size,
        starting_health = config.game.starting_health,
        starting_points = config.game.starting_points,
        rate_limit = config.command_rate_limit,
        "Starting Grid Jury Server"
    );

    let state = AppState::new(config.clone());
    let game = state.game.clone();
    let router = build_router(state);

    let listener = TcpListener::bind(config.server_addr).await?;
    info!(addr = %config.server_addr, "Listening for commands and renderers");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(game))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Text logs by default, JSON lines when `LOG_FORMAT=json`
fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Wait for Ctrl+C or SIGTERM, then stop the tick task
async fn shutdown_signal(game: Arc<GameService>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    if game.destroy_session() {
        info!("Open game session closed on shutdown");
    }
}
