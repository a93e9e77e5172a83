use super::*;
use crate::config::Configuration;

#[tokio::test]
async fn deliver_fails_fast_with_no_tiers_available() {
    // In a bare test sandbox there is no tmux, no pty-backed session_pid,
    // and no X/Wayland display — every tier's probe should report
    // unavailable, and the orchestrator must not enter its retry loop.
    let orchestrator = Orchestrator::new(Configuration::default());
    let target = DeliveryTarget { session_pid: None, transcript_path: None };

    let outcome = orchestrator.deliver(&target).await;
    assert!(!outcome.success);
    assert!(outcome.tiers_attempted.is_empty());
    assert!(outcome.tier_used.is_none());
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn tiers_attempted_is_always_a_priority_prefix_of_available_tiers() {
    let orchestrator = Orchestrator::new(Configuration::default());
    let target = DeliveryTarget { session_pid: Some(std::process::id()), transcript_path: None };
    let outcome = orchestrator.deliver(&target).await;

    let mut sorted = outcome.tiers_attempted.clone();
    sorted.sort_by_key(|t| t.priority());
    assert_eq!(sorted, outcome.tiers_attempted);
}
