// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local external interface: a loopback-only HTTP + WebSocket server
//! exposing queue status and a manual resume-now/clear surface, per §6.
//! Disabled by default; `autoresumed start --http <addr>` opts in.

pub mod http;
pub mod ws;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::delivery::Orchestrator;
use crate::scheduler::Scheduler;

/// Shared state every handler sees via axum's `State` extractor.
pub struct AppState {
    pub queue_path: PathBuf,
    pub scheduler: Arc<Scheduler>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the router: `GET /status`, `POST /resume-now`, `POST /clear`,
/// `GET /ws` for the countdown/queue/outcome event stream.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(http::status))
        .route("/resume-now", post(http::resume_now))
        .route("/clear", post(http::clear))
        .route("/ws", get(ws::ws_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve the local interface until `shutdown` is cancelled. Binds
/// to loopback only — this is a local control surface, not a network API.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>, shutdown: CancellationToken) -> anyhow::Result<()> {
    if !addr.ip().is_loopback() {
        anyhow::bail!("the local interface only binds loopback addresses, got {addr}");
    }
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "local interface listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
