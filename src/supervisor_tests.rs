use super::*;

#[test]
fn acquire_pid_lock_writes_current_pid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.pid");
    let lock = acquire_pid_lock(&path).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, std::process::id().to_string());
    lock.release();
    assert!(!path.exists());
}

#[test]
fn acquire_pid_lock_removes_stale_file_from_a_dead_process() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.pid");
    // A PID that is extremely unlikely to be alive in the test sandbox.
    std::fs::write(&path, "999999").unwrap();
    let lock = acquire_pid_lock(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), std::process::id().to_string());
    lock.release();
}

#[test]
fn acquire_pid_lock_rejects_a_live_conflicting_process() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.pid");
    // Our own PID is always alive, so this simulates a live conflicting daemon.
    std::fs::write(&path, std::process::id().to_string()).unwrap();
    let err = acquire_pid_lock(&path).unwrap_err();
    assert!(err.to_string().contains("SINGLE_INSTANCE_CONFLICT"));
}

#[test]
fn rotate_log_if_needed_renames_when_over_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("daemon.log");
    let rotated_path = dir.path().join("daemon.log.1");
    std::fs::write(&log_path, vec![b'x'; 2 * 1024 * 1024]).unwrap();

    rotate_log_if_needed(&log_path, &rotated_path, 1);

    assert!(!log_path.exists());
    assert!(rotated_path.exists());
}

#[test]
fn rotate_log_if_needed_leaves_small_files_alone() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("daemon.log");
    let rotated_path = dir.path().join("daemon.log.1");
    std::fs::write(&log_path, b"small").unwrap();

    rotate_log_if_needed(&log_path, &rotated_path, 1);

    assert!(log_path.exists());
    assert!(!rotated_path.exists());
}

#[test]
fn rotation_layer_rotates_on_the_hundredth_event() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("daemon.log");
    let rotated_path = dir.path().join("daemon.log.1");
    std::fs::write(&log_path, vec![b'x'; 2 * 1024 * 1024]).unwrap();

    let layer = RotationLayer::new(log_path.clone(), rotated_path.clone(), 1);
    for n in 1..=100u64 {
        let prior = layer.counter.fetch_add(1, Ordering::Relaxed) + 1;
        if prior % 100 == 0 {
            rotate_log_if_needed(&layer.log_path, &layer.rotated_path, layer.max_size_mb);
        }
        if n < 100 {
            assert!(log_path.exists(), "must not rotate before the 100th call");
        }
    }
    assert!(rotated_path.exists());
}

#[tokio::test(start_paused = true)]
async fn throttle_crash_loop_sleeps_when_started_recently() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join(".last-start");
    std::fs::write(&marker, Utc::now().timestamp().to_string()).unwrap();

    let start = tokio::time::Instant::now();
    throttle_crash_loop(&marker).await;
    // Virtual time under `start_paused` advances instantly past the sleep.
    assert!(start.elapsed() >= Duration::from_secs(29));
    assert!(marker.exists());
}

#[tokio::test]
async fn throttle_crash_loop_does_not_block_on_a_stale_marker() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join(".last-start");
    std::fs::write(&marker, (Utc::now().timestamp() - 3600).to_string()).unwrap();

    let start = tokio::time::Instant::now();
    throttle_crash_loop(&marker).await;
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn bind_keepalive_returns_an_ephemeral_loopback_listener() {
    let listener = bind_keepalive().await.unwrap();
    let addr = listener.local_addr().unwrap();
    assert!(addr.ip().is_loopback());
    assert_ne!(addr.port(), 0);
}
