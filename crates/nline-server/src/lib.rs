//! HTTP match-making and game server for N-in-a-row.
//!
//! Devices register anonymously, ask for a match on an N×N board (3..=7),
//! poll until paired, then alternate moves until someone completes a line.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/devices` | Register a device (`{alias?}`) |
//! | GET | `/devices` | List connected devices |
//! | GET | `/devices/{id}/info` | Connection status and stats |
//! | POST | `/matches` | Pair with a waiting opponent or queue (`{device_id, size?}`) |
//! | GET | `/matches/waiting-status?device_id=` | Paired, waiting or idle |
//! | POST | `/matches/{id}/moves` | Play `{device_id, x, y}` |
//! | POST | `/matches/{id}/surrender` | Concede `{device_id}` |
//! | GET | `/matches/{id}` | Board, turn, winner, size, players |
//! | GET | `/healthz` | Liveness |
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `NLINE_BIND` | Listen address (default: `0.0.0.0:5000`) |
//! | `NLINE_DISCONNECT_TIMEOUT` | Seconds before an idle device is dropped (default: 300) |
//! | `NLINE_REAP_INTERVAL` | Seconds between reaper passes, 0 disables (default: 30) |

pub mod config;
pub mod error;
pub mod handlers;
pub mod reaper;
pub mod state;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use error::{ApiError, ConfigError};
pub use reaper::Reaper;
pub use state::AppState;

/// Build the API router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route(
            "/devices",
            get(handlers::list_devices).post(handlers::register_device),
        )
        .route("/devices/:device_id/info", get(handlers::device_info))
        .route("/matches", post(handlers::request_match))
        .route("/matches/waiting-status", get(handlers::waiting_status))
        .route("/matches/:match_id", get(handlers::match_state))
        .route("/matches/:match_id/moves", post(handlers::make_move))
        .route("/matches/:match_id/surrender", post(handlers::surrender))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, serve until Ctrl-C, then stop the reaper.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;
    let state = AppState::new(config.disconnect_timeout());
    let reaper = config
        .reap_interval()
        .map(|interval| Reaper::spawn(state.clone(), interval));

    let listener = TcpListener::bind(&config.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        disconnect_timeout_secs = config.disconnect_timeout_secs,
        "listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(reaper) = reaper {
        reaper.stop().await;
    }
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
