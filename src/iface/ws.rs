// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket event stream: forwards countdown ticks, delivery outcomes, and
//! queue-document changes to any connected client. Read-only — this
//! channel does not accept client commands; use the HTTP routes for those.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::TierName;
use crate::iface::AppState;
use crate::queue;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IfaceEvent {
    Countdown { event_id: Uuid, remaining_secs: u64 },
    DeliveryOutcome { event_id: Uuid, success: bool, tier_used: Option<TierName>, error: Option<String> },
    QueueChanged { pending_count: usize },
}

pub async fn ws_handler(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(state, socket))
}

async fn handle_connection(state: Arc<AppState>, mut socket: WebSocket) {
    let mut ticks = state.scheduler.subscribe();
    let mut outcomes = state.scheduler.subscribe_outcomes();
    let mut queue_poll = tokio::time::interval(Duration::from_secs(2));
    let mut last_pending_count = None;

    loop {
        tokio::select! {
            tick = ticks.recv() => {
                let Ok(tick) = tick else { continue };
                let event = IfaceEvent::Countdown { event_id: tick.event_id, remaining_secs: tick.remaining.as_secs() };
                if send(&mut socket, &event).await.is_err() {
                    break;
                }
            }
            outcome = outcomes.recv() => {
                let Ok(outcome) = outcome else { continue };
                let event = IfaceEvent::DeliveryOutcome {
                    event_id: outcome.event_id,
                    success: outcome.success,
                    tier_used: outcome.tier_used,
                    error: outcome.error,
                };
                if send(&mut socket, &event).await.is_err() {
                    break;
                }
            }
            _ = queue_poll.tick() => {
                if let Ok(q) = queue::load(&state.queue_path) {
                    let pending_count = q.queue.iter().filter(|e| !e.status.is_terminal()).count();
                    if last_pending_count != Some(pending_count) {
                        last_pending_count = Some(pending_count);
                        if send(&mut socket, &IfaceEvent::QueueChanged { pending_count }).await.is_err() {
                            break;
                        }
                    }
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }
}

async fn send(socket: &mut WebSocket, event: &IfaceEvent) -> Result<(), axum::Error> {
    let text = serde_json::to_string(event).unwrap_or_default();
    socket.send(Message::Text(text.into())).await
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
