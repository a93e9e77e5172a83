// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery orchestrator: attempts keystroke delivery via a prioritized
//! chain of tiers, each with its own availability probe, attempt, and
//! error mapping, with retry-with-backoff once every tier has been tried
//! once without a confirmed success.

pub mod keystrokes;
pub mod native;
pub mod process;
pub mod pty;
pub mod tmux;

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;

use crate::config::Configuration;
use crate::event::TierName;
use crate::verify;

/// Outcome of a single tier attempt; distinguishes (a) transient failures
/// (retry the same tier next round), (b) permanent-unavailable failures
/// (downgrade to the next tier for this event), from a clean send, whose
/// success is not assumed until the active verifier confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    Sent,
    Unavailable(String),
    TransientFailure(String),
}

/// Target session descriptor the orchestrator delivers to.
#[derive(Debug, Clone)]
pub struct DeliveryTarget {
    pub session_pid: Option<u32>,
    pub transcript_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub tier_used: Option<TierName>,
    pub tiers_attempted: Vec<TierName>,
    pub error: Option<String>,
}

async fn probe(tier: TierName, session_pid: Option<u32>) -> bool {
    match tier {
        TierName::Tmux => tmux::probe_available(session_pid).await,
        TierName::Pty => pty::probe_available(session_pid).await,
        TierName::Native => native::probe_available(session_pid).await,
    }
}

async fn send(tier: TierName, session_pid: Option<u32>, steps: &[keystrokes::NudgeStep]) -> TierOutcome {
    match tier {
        TierName::Tmux => tmux::attempt(session_pid, steps).await,
        TierName::Pty => pty::attempt(session_pid, steps).await,
        TierName::Native => native::attempt(session_pid, steps).await,
    }
}

/// Attempt a send on `tier` and, if it reports `Sent`, actively verify it.
/// Returns `Ok(true)` on confirmed success, `Ok(false)` on an unconfirmed
/// or failed attempt, `Err` never — tier/verifier failures are folded into
/// `Ok(false)` so the orchestrator can keep trying other tiers.
async fn attempt_and_verify(
    tier: TierName,
    target: &DeliveryTarget,
    steps: &[keystrokes::NudgeStep],
    config: &Configuration,
) -> bool {
    match send(tier, target.session_pid, steps).await {
        TierOutcome::Sent => {
            let sent_at = Utc::now();
            let probe = verify::baseline(
                target.transcript_path.as_deref(),
                sent_at,
                Duration::from_millis(config.active_verification_timeout_ms),
                Duration::from_millis(config.active_verification_poll_ms),
                Duration::from_secs(config.verification_window_sec),
            );
            verify::verify(&probe).await.verified
        }
        TierOutcome::Unavailable(reason) => {
            tracing::debug!("tier {tier} unavailable: {reason}");
            false
        }
        TierOutcome::TransientFailure(reason) => {
            tracing::warn!("tier {tier} transient failure: {reason}");
            false
        }
    }
}

pub struct Orchestrator {
    config: Configuration,
}

impl Orchestrator {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    /// Implements the four-step algorithm: initial pass over available
    /// tiers in priority order, then a bounded retry schedule over the
    /// tiers that never confirmed, re-probing availability each round.
    pub async fn deliver(&self, target: &DeliveryTarget) -> DeliveryOutcome {
        let steps = keystrokes::resume_sequence(&self.config.resume_prompt);
        let mut tiers_attempted = Vec::new();

        for tier in TierName::ALL_BY_PRIORITY {
            if !probe(tier, target.session_pid).await {
                continue;
            }
            tiers_attempted.push(tier);
            if attempt_and_verify(tier, target, &steps, &self.config).await {
                return DeliveryOutcome {
                    success: true,
                    tier_used: Some(tier),
                    tiers_attempted,
                    error: None,
                };
            }
        }

        if tiers_attempted.is_empty() {
            return DeliveryOutcome {
                success: false,
                tier_used: None,
                tiers_attempted,
                error: Some("no delivery tier is available in this environment".to_string()),
            };
        }

        for retry_index in 0..self.config.max_retries as usize {
            tokio::time::sleep(self.config.backoff_for(retry_index)).await;

            let mut candidates = tiers_attempted.clone();
            candidates.sort_by_key(|t| t.priority());
            let mut retried = false;
            for tier in candidates {
                if !probe(tier, target.session_pid).await {
                    continue;
                }
                retried = true;
                if attempt_and_verify(tier, target, &steps, &self.config).await {
                    return DeliveryOutcome {
                        success: true,
                        tier_used: Some(tier),
                        tiers_attempted,
                        error: None,
                    };
                }
                break;
            }
            if !retried {
                tracing::debug!("retry round {retry_index}: no previously-attempted tier is currently available");
            }
        }

        DeliveryOutcome {
            success: false,
            tier_used: None,
            tiers_attempted,
            error: Some("all delivery tiers exhausted after retries".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
