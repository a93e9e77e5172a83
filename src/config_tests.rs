use super::*;

#[test]
fn defaults_are_conservative() {
    let config = Configuration::default();
    assert_eq!(config.resume_prompt, "continue");
    assert_eq!(config.check_interval_ms, 5000);
    assert_eq!(config.post_reset_delay_sec, 10);
    assert_eq!(config.max_retries, 4);
    assert_eq!(config.retry_backoff_sec, vec![10, 20, 40, 60]);
    assert_eq!(config.verification_window_sec, 90);
    assert_eq!(config.active_verification_timeout_ms, 30_000);
    assert_eq!(config.active_verification_poll_ms, 2_000);
    assert!(config.transcript_polling_enabled);
    assert_eq!(config.max_log_size_mb, 1);
    assert_eq!(config.memory_ceiling_mb, 200);
    assert_eq!(config.interface_addr, None);
}

#[test]
fn set_interface_addr_accepts_a_loopback_socket_and_a_disable_keyword() {
    let mut config = Configuration::default();
    config.set("interface_addr", "127.0.0.1:4317").unwrap();
    assert_eq!(config.interface_addr.as_deref(), Some("127.0.0.1:4317"));
    config.set("interface_addr", "none").unwrap();
    assert_eq!(config.interface_addr, None);
}

#[test]
fn backoff_clamps_to_last_entry() {
    let config = Configuration::default();
    assert_eq!(config.backoff_for(0), std::time::Duration::from_secs(10));
    assert_eq!(config.backoff_for(3), std::time::Duration::from_secs(60));
    assert_eq!(config.backoff_for(99), std::time::Duration::from_secs(60));
}

#[test]
fn load_missing_file_returns_defaults() {
    let config = Configuration::load(std::path::Path::new("/nonexistent/config.json")).unwrap();
    assert_eq!(config, Configuration::default());
}

#[test]
fn load_ignores_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"resume_prompt": "go", "something_new": 42}"#).unwrap();
    let config = Configuration::load(&path).unwrap();
    assert_eq!(config.resume_prompt, "go");
    assert_eq!(config.max_retries, 4);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut config = Configuration::default();
    config.set("max_retries", "7").unwrap();
    config.save(&path).unwrap();
    let reloaded = Configuration::load(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn set_rejects_unknown_key() {
    let mut config = Configuration::default();
    assert!(config.set("not_a_real_key", "1").is_err());
}

#[test]
fn set_parses_backoff_list() {
    let mut config = Configuration::default();
    config.set("retry_backoff_sec", "5, 15, 30").unwrap();
    assert_eq!(config.retry_backoff_sec, vec![5, 15, 30]);
}

#[test]
fn cli_validate_rejects_bad_log_format() {
    let cli = Cli::parse_from(["autoresumed", "--log-format", "xml", "status"]);
    assert!(cli.validate().is_err());
}

#[test]
fn cli_validate_accepts_defaults() {
    let cli = Cli::parse_from(["autoresumed", "status"]);
    assert!(cli.validate().is_ok());
}
