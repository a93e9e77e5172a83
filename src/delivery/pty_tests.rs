use super::*;

#[tokio::test]
async fn probe_available_is_false_without_session_pid() {
    assert!(!probe_available(None).await);
}

#[tokio::test]
async fn probe_available_is_false_for_nonexistent_pid() {
    // pid 1 almost never exposes a readable /proc/1/fd/0 to an unprivileged
    // test process, and certainly isn't a pty in CI.
    assert!(!probe_available(Some(1)).await);
}

#[tokio::test]
async fn attempt_is_unavailable_without_session_pid() {
    let steps = super::super::keystrokes::resume_sequence("continue");
    let outcome = attempt(None, &steps).await;
    assert!(matches!(outcome, TierOutcome::Unavailable(_)));
}
