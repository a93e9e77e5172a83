// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /status`, `POST /resume-now`, `POST /clear` handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::delivery::DeliveryTarget;
use crate::event::EventStatus;
use crate::iface::AppState;
use crate::queue;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub detected: bool,
    pub queue: Vec<crate::event::RateLimitEvent>,
    pub sessions: Vec<String>,
    pub last_hook_run: Option<chrono::DateTime<chrono::Utc>>,
}

/// `GET /status` — the queue document shape documented in the external
/// interfaces, plus a derived `detected` flag.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match queue::load(&state.queue_path) {
        Ok(q) => {
            let detected = q.queue.iter().any(|e| !e.status.is_terminal());
            Json(StatusResponse { detected, queue: q.queue, sessions: q.sessions, last_hook_run: q.last_hook_run })
                .into_response()
        }
        Err(e) => {
            tracing::warn!("status handler: failed to load queue: {e:#}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResumeNowResponse {
    pub triggered: bool,
    pub success: Option<bool>,
    pub message: String,
}

/// `POST /resume-now` — bypass the countdown and deliver immediately for
/// the current pending head, if any.
pub async fn resume_now(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let queue = match queue::load(&state.queue_path) {
        Ok(q) => q,
        Err(e) => {
            return Json(ResumeNowResponse {
                triggered: false,
                success: None,
                message: format!("failed to load queue: {e}"),
            })
        }
    };
    let Some(event) = queue::peek_next_pending(&queue).cloned() else {
        return Json(ResumeNowResponse { triggered: false, success: None, message: "no pending event".to_string() });
    };

    // Pending only advances to Waiting; Resuming is reached from there, the
    // same two-step sequence the scheduler's own countdown uses.
    if let Err(e) = queue::update_status(&state.queue_path, event.id, EventStatus::Waiting) {
        return Json(ResumeNowResponse {
            triggered: false,
            success: None,
            message: format!("failed to mark event waiting: {e}"),
        });
    }
    if let Err(e) = queue::update_status(&state.queue_path, event.id, EventStatus::Resuming) {
        return Json(ResumeNowResponse {
            triggered: false,
            success: None,
            message: format!("failed to mark event resuming: {e}"),
        });
    }

    let target = DeliveryTarget { session_pid: event.session_pid, transcript_path: Some(event.transcript_path.clone()) };
    let outcome = state.orchestrator.deliver(&target).await;
    let next_status = if outcome.success { EventStatus::Completed } else { EventStatus::Failed };
    if let Err(e) = queue::update_status(&state.queue_path, event.id, next_status) {
        tracing::warn!("resume-now: failed to record final status: {e:#}");
    }

    Json(ResumeNowResponse {
        triggered: true,
        success: Some(outcome.success),
        message: outcome.error.unwrap_or_else(|| "delivered".to_string()),
    })
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

/// `POST /clear` — empty the queue document.
pub async fn clear(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match queue::clear(&state.queue_path) {
        Ok(()) => Json(ClearResponse { cleared: true }),
        Err(e) => {
            tracing::warn!("clear handler failed: {e:#}");
            Json(ClearResponse { cleared: false })
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
