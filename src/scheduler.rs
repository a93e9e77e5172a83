// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler / countdown: drains the event queue's pending head one event
//! at a time, emitting a per-second progress tick, then triggers delivery
//! once the deadline (plus a safety delay) elapses.
//!
//! Only one countdown runs at a time, matching the "at most one `resuming`
//! entry" invariant. Dedup uses the same self-rescheduling `AtomicBool`
//! shape used elsewhere in this crate for a single in-flight retry timer.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::Configuration;
use crate::delivery::{DeliveryTarget, Orchestrator};
use crate::event::EventStatus;
use crate::notifier::Notifier;
use crate::{queue, timeres};

/// One second-granularity countdown update, broadcast to the WebSocket
/// endpoint and `status --watch`-style terminal output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTick {
    pub event_id: Uuid,
    pub remaining: Duration,
}

/// Broadcast once a delivery attempt for an event reaches a terminal state,
/// consumed by the local WebSocket interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcomeEvent {
    pub event_id: Uuid,
    pub success: bool,
    pub tier_used: Option<crate::event::TierName>,
    pub error: Option<String>,
}

pub struct Scheduler {
    queue_path: PathBuf,
    config: Configuration,
    tick_tx: broadcast::Sender<CountdownTick>,
    outcome_tx: broadcast::Sender<DeliveryOutcomeEvent>,
    active: AtomicBool,
    current_event_id: RwLock<Option<Uuid>>,
}

impl Scheduler {
    pub fn new(queue_path: PathBuf, config: Configuration) -> (Arc<Self>, broadcast::Receiver<CountdownTick>) {
        let (tick_tx, tick_rx) = broadcast::channel(64);
        let (outcome_tx, _) = broadcast::channel(64);
        let scheduler = Arc::new(Self {
            queue_path,
            config,
            tick_tx,
            outcome_tx,
            active: AtomicBool::new(false),
            current_event_id: RwLock::new(None),
        });
        (scheduler, tick_rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CountdownTick> {
        self.tick_tx.subscribe()
    }

    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<DeliveryOutcomeEvent> {
        self.outcome_tx.subscribe()
    }

    pub async fn current_event_id(&self) -> Option<Uuid> {
        *self.current_event_id.read().await
    }

    /// Called whenever the queue document changes. If no countdown is
    /// already running, spawns one that drains the queue until it's empty
    /// of pending entries or shutdown is requested.
    pub fn ensure_running(
        self: &Arc<Self>,
        orchestrator: Arc<Orchestrator>,
        notifier: Arc<dyn Notifier>,
        shutdown: CancellationToken,
    ) {
        if self.active.swap(true, Ordering::AcqRel) {
            return;
        }
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.drain_queue(orchestrator, notifier, shutdown).await;
            scheduler.active.store(false, Ordering::Release);
        });
    }

    async fn drain_queue(
        self: &Arc<Self>,
        orchestrator: Arc<Orchestrator>,
        notifier: Arc<dyn Notifier>,
        shutdown: CancellationToken,
    ) {
        loop {
            if shutdown.is_cancelled() {
                return;
            }
            let head = match queue::load(&self.queue_path) {
                Ok(q) => queue::peek_next_pending(&q).cloned(),
                Err(e) => {
                    tracing::warn!("scheduler: failed to load queue: {e:#}");
                    return;
                }
            };
            let Some(event) = head else { return };

            *self.current_event_id.write().await = Some(event.id);
            let completed = self.run_one(event, &orchestrator, notifier.as_ref(), &shutdown).await;
            *self.current_event_id.write().await = None;

            if !completed {
                return;
            }
        }
    }

    /// Run a single event end to end: countdown, safety delay, delivery,
    /// status update, notification on exhausted failure. Returns `false`
    /// if shutdown was requested mid-countdown (caller stops draining).
    async fn run_one(
        &self,
        event: crate::event::RateLimitEvent,
        orchestrator: &Orchestrator,
        notifier: &dyn Notifier,
        shutdown: &CancellationToken,
    ) -> bool {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            let now = Utc::now();
            let remaining = timeres::remaining(event.reset_time, now);
            let _ = self.tick_tx.send(CountdownTick { event_id: event.id, remaining });
            if remaining.is_zero() {
                break;
            }
            tokio::select! {
                _ = shutdown.cancelled() => return false,
                _ = ticker.tick() => {}
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => return false,
            _ = tokio::time::sleep(Duration::from_secs(self.config.post_reset_delay_sec)) => {}
        }

        if let Err(e) = queue::update_status(&self.queue_path, event.id, EventStatus::Waiting) {
            tracing::warn!("scheduler: failed to mark event waiting: {e:#}");
        }
        if let Err(e) = queue::update_status(&self.queue_path, event.id, EventStatus::Resuming) {
            tracing::warn!("scheduler: failed to mark event resuming: {e:#}");
            return true;
        }

        let target = DeliveryTarget {
            session_pid: event.session_pid,
            transcript_path: Some(event.transcript_path.clone()),
        };
        let outcome = orchestrator.deliver(&target).await;

        tracing::info!(
            success = outcome.success,
            tier_used = ?outcome.tier_used,
            tiers_attempted = ?outcome.tiers_attempted,
            "delivery attempt finished"
        );

        let _ = self.outcome_tx.send(DeliveryOutcomeEvent {
            event_id: event.id,
            success: outcome.success,
            tier_used: outcome.tier_used,
            error: outcome.error.clone(),
        });

        if outcome.success {
            if let Err(e) = queue::update_status(&self.queue_path, event.id, EventStatus::Completed) {
                tracing::warn!("scheduler: failed to mark event completed: {e:#}");
            }
        } else {
            if let Err(e) = queue::update_status(&self.queue_path, event.id, EventStatus::Failed) {
                tracing::warn!("scheduler: failed to mark event failed: {e:#}");
            }
            notifier.notify_delivery_failed(&format!(
                "Manual intervention needed: resume delivery failed for session {:?} ({})",
                event.session_pid,
                outcome.error.unwrap_or_default()
            ));
        }

        true
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
