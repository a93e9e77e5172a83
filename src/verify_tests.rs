use serial_test::serial;

use super::*;

fn fresh_line(ts: DateTime<Utc>) -> String {
    format!(r#"{{"timestamp":"{}","text":"ok, continuing"}}"#, ts.to_rfc3339())
}

#[tokio::test]
async fn verify_succeeds_when_new_fresh_record_appears() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.jsonl");
    std::fs::write(&path, "").unwrap();

    let sent_at = Utc::now();
    let probe =
        baseline(Some(&path), sent_at, Duration::from_millis(500), Duration::from_millis(50), Duration::from_secs(90));

    let write_path = path.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(&write_path, fresh_line(Utc::now()) + "\n").unwrap();
    });

    let result = verify(&probe).await;
    assert!(result.verified);
    assert!(result.new_bytes > 0);
}

#[tokio::test]
async fn verify_times_out_without_new_activity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.jsonl");
    std::fs::write(&path, "").unwrap();

    let probe =
        baseline(Some(&path), Utc::now(), Duration::from_millis(150), Duration::from_millis(30), Duration::from_secs(90));
    let result = verify(&probe).await;
    assert!(!result.verified);
}

#[tokio::test]
async fn verify_ignores_stale_records_written_before_sent_at() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.jsonl");
    std::fs::write(&path, "").unwrap();

    let sent_at = Utc::now() + chrono::Duration::seconds(5);
    let probe =
        baseline(Some(&path), sent_at, Duration::from_millis(150), Duration::from_millis(30), Duration::from_secs(90));

    std::fs::write(&path, fresh_line(Utc::now()) + "\n").unwrap();

    let result = verify(&probe).await;
    assert!(!result.verified);
}

#[tokio::test]
#[serial]
async fn passive_verify_succeeds_when_no_transcript_path_and_no_new_events() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("AUTORESUME_STATE_DIR", dir.path());

    let probe =
        baseline(None, Utc::now(), Duration::from_millis(50), Duration::from_millis(10), Duration::from_millis(50));
    let result = verify(&probe).await;
    assert!(result.verified);

    std::env::remove_var("AUTORESUME_STATE_DIR");
}

#[tokio::test]
#[serial]
async fn passive_verify_waits_the_passive_window_not_the_active_timeout() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("AUTORESUME_STATE_DIR", dir.path());

    // Active timeout is tiny; if verify_passive used it instead of
    // passive_timeout, this would return almost immediately.
    let probe = baseline(
        None,
        Utc::now(),
        Duration::from_millis(5),
        Duration::from_millis(1),
        Duration::from_millis(120),
    );
    let start = tokio::time::Instant::now();
    let result = verify(&probe).await;
    assert!(result.verified);
    assert!(start.elapsed() >= Duration::from_millis(120));

    std::env::remove_var("AUTORESUME_STATE_DIR");
}
