// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core data model: [`RateLimitEvent`], [`EventQueue`], [`DeliveryTier`], and
//! [`VerificationProbe`], per the on-disk schema documented in the external
//! interfaces.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a [`RateLimitEvent`]. Transitions are monotone:
/// `pending -> waiting -> resuming -> {completed | failed}`, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Waiting,
    Resuming,
    Completed,
    Failed,
}

impl EventStatus {
    /// Whether `self -> next` is a legal forward transition.
    pub fn can_advance_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, next),
            (Pending, Waiting)
                | (Waiting, Resuming)
                | (Resuming, Completed)
                | (Resuming, Failed)
                // Allow idempotent re-application of the same status.
                | (Pending, Pending)
                | (Waiting, Waiting)
                | (Resuming, Resuming)
                | (Completed, Completed)
                | (Failed, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Failed)
    }
}

/// One pending or historical rate-limit detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitEvent {
    pub id: Uuid,
    pub reset_time: DateTime<Utc>,
    pub timezone: String,
    pub message: String,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_pid: Option<u32>,
    pub transcript_path: PathBuf,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Which source produced this event — informational, echoed in logs
    /// and the HTTP status document.
    #[serde(default = "default_source")]
    pub source: EventSource,
}

fn default_source() -> EventSource {
    EventSource::Hook
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Hook,
    TranscriptPoll,
}

impl RateLimitEvent {
    pub fn new(
        reset_time: DateTime<Utc>,
        timezone: impl Into<String>,
        message: impl Into<String>,
        transcript_path: PathBuf,
        session_pid: Option<u32>,
        source: EventSource,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reset_time,
            timezone: timezone.into(),
            message: message.into(),
            detected_at: Utc::now(),
            session_pid,
            transcript_path,
            status: EventStatus::Pending,
            completed_at: None,
            source,
        }
    }

    /// Apply a forward status transition, setting `completed_at` on
    /// terminal statuses. Returns an error if the transition would move
    /// backward.
    pub fn advance(&mut self, next: EventStatus) -> anyhow::Result<()> {
        if !self.status.can_advance_to(next) {
            anyhow::bail!("illegal status transition {:?} -> {:?}", self.status, next);
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// The on-disk queue document, schema version `2` (see [`EventQueue::version`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventQueue {
    #[serde(default = "current_version")]
    pub version: u32,
    pub queue: Vec<RateLimitEvent>,
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub last_hook_run: Option<DateTime<Utc>>,
}

fn current_version() -> u32 {
    2
}

impl Default for EventQueue {
    fn default() -> Self {
        Self { version: current_version(), queue: Vec::new(), sessions: Vec::new(), last_hook_run: None }
    }
}

/// Legacy flat form, accepted on read and promoted to a single-entry queue.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyStatusDocument {
    pub detected: bool,
    #[serde(default)]
    pub reset_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub claude_pid: Option<u32>,
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
}

impl LegacyStatusDocument {
    pub fn into_queue(self) -> EventQueue {
        let mut queue = EventQueue::default();
        if self.detected {
            if let Some(reset_time) = self.reset_time {
                queue.queue.push(RateLimitEvent::new(
                    reset_time,
                    self.timezone.unwrap_or_default(),
                    self.message.unwrap_or_default(),
                    self.transcript_path.unwrap_or_default(),
                    self.claude_pid,
                    EventSource::Hook,
                ));
            }
        }
        queue
    }
}

/// Static descriptor for one delivery mechanism in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierName {
    Tmux,
    Pty,
    Native,
}

impl TierName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tmux => "tmux",
            Self::Pty => "pty",
            Self::Native => "native",
        }
    }

    /// Total order over tiers, 1 = highest priority.
    pub fn priority(self) -> u8 {
        match self {
            Self::Tmux => 1,
            Self::Pty => 2,
            Self::Native => 3,
        }
    }

    pub const ALL_BY_PRIORITY: [TierName; 3] = [TierName::Tmux, TierName::Pty, TierName::Native];
}

impl std::fmt::Display for TierName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tier's availability as probed for a specific attempt; availability is
/// re-evaluated at attempt time, never cached across attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryTier {
    pub name: TierName,
    pub available: bool,
}

/// Transient per-attempt verification record, see [`crate::verify`].
#[derive(Debug, Clone)]
pub struct VerificationProbe {
    pub transcript_path: Option<PathBuf>,
    pub baseline_mtime: Option<std::time::SystemTime>,
    pub baseline_size: u64,
    pub sent_at: DateTime<Utc>,
    /// Active-path per-poll timeout, used when `transcript_path` is `Some`.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Passive-path horizon, used when `transcript_path` is `None` — a
    /// distinct, larger window than `timeout` (spec.md §4.8).
    pub passive_timeout: Duration,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
