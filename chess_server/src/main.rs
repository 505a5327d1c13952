//! Chess Agent — A2A agent that plays chess through a UCI engine.
//!
//! A standalone binary speaking JSON-RPC 2.0 (A2A `message/send` and
//! `execute`). Each conversation context is one game; every user move is
//! answered by the engine (Stockfish by default) and a rendered board.

mod config;
mod error;
mod metrics;
mod models;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::services::agent::ChessAgent;
use crate::services::artifact_service::BoardImages;
use crate::services::board_store::spawn_sweeper;
use crate::services::engine::UciEngine;

#[derive(Parser)]
#[command(name = "chess-agent", about = "A2A Chess Agent")]
struct Cli {
    /// Server port
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,

    /// UCI engine executable
    #[arg(long, env = "CHESS_ENGINE_PATH", default_value = "/usr/games/stockfish")]
    engine_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();

    tracing::info!("Starting Chess Agent...");

    let config = config::AgentConfig::from_env(cli.engine_path);
    tokio::fs::create_dir_all(&config.board_dir).await?;
    tracing::info!(
        engine = %config.engine_path,
        movetime_ms = config.engine_movetime_ms,
        board_dir = %config.board_dir.display(),
        "Agent configured"
    );

    let engine = Arc::new(UciEngine::from_config(&config));
    let agent = Arc::new(ChessAgent::new(engine, BoardImages::from_config(&config)));

    let sweeper = spawn_sweeper(
        agent.boards().clone(),
        config.session_idle(),
    );

    // Initialize metrics
    let metrics_handle = metrics::init_metrics();

    let state = routes::AgentRouterState {
        agent: agent.clone(),
        http: reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?,
        config: config.clone(),
        metrics: metrics_handle,
    };

    let app = routes::with_layers(
        routes::agent_router(state),
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let addr = SocketAddr::new(cli.host, cli.port);
    tracing::info!("Chess Agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Clearing game sessions...");
    sweeper.abort();
    agent.cleanup().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
