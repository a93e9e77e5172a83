use serial_test::serial;

use super::*;

#[test]
fn layout_matches_filesystem_contract() {
    let dir = StateDir::at(PathBuf::from("/tmp/autoresume-test-layout"));
    assert_eq!(dir.queue_file(), PathBuf::from("/tmp/autoresume-test-layout/status.json"));
    assert_eq!(dir.pid_file(), PathBuf::from("/tmp/autoresume-test-layout/daemon.pid"));
    assert_eq!(dir.log_file(), PathBuf::from("/tmp/autoresume-test-layout/daemon.log"));
    assert_eq!(dir.rotated_log_file(), PathBuf::from("/tmp/autoresume-test-layout/daemon.log.1"));
    assert_eq!(dir.heartbeat_file(), PathBuf::from("/tmp/autoresume-test-layout/heartbeat.json"));
    assert_eq!(dir.last_start_file(), PathBuf::from("/tmp/autoresume-test-layout/.last-start"));
    assert_eq!(dir.config_file(), PathBuf::from("/tmp/autoresume-test-layout/config.json"));
}

#[test]
#[serial]
fn resolve_honors_env_override() {
    std::env::set_var("AUTORESUME_STATE_DIR", "/tmp/autoresume-test-env");
    let dir = StateDir::resolve().unwrap();
    assert_eq!(dir.root(), Path::new("/tmp/autoresume-test-env"));
    std::env::remove_var("AUTORESUME_STATE_DIR");
}
