use std::path::PathBuf;

use proptest::prelude::*;

use super::*;
use crate::event::EventSource;

fn sample_event(reset_time: chrono::DateTime<Utc>) -> RateLimitEvent {
    RateLimitEvent::new(
        reset_time,
        "Asia/Dhaka",
        "You've hit your limit",
        PathBuf::from("/tmp/t.jsonl"),
        Some(100),
        EventSource::Hook,
    )
}

#[test]
fn load_missing_file_initializes_empty_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let queue = load(&path).unwrap();
    assert!(queue.queue.is_empty());
    assert!(path.exists());
}

#[test]
fn enqueue_then_peek_returns_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    enqueue(&path, sample_event(Utc::now() + chrono::Duration::seconds(30))).unwrap();
    let queue = load(&path).unwrap();
    assert!(peek_next_pending(&queue).is_some());
}

#[test]
fn duplicate_reset_time_does_not_grow_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let reset_time = Utc::now() + chrono::Duration::seconds(30);
    enqueue(&path, sample_event(reset_time)).unwrap();
    let queue = enqueue(&path, sample_event(reset_time)).unwrap();
    assert_eq!(queue.queue.len(), 1);
}

#[test]
fn peek_returns_smallest_reset_time_among_two_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let later = Utc::now() + chrono::Duration::seconds(60);
    let sooner = Utc::now() + chrono::Duration::seconds(10);
    enqueue(&path, sample_event(later)).unwrap();
    let queue = enqueue(&path, sample_event(sooner)).unwrap();
    let head = peek_next_pending(&queue).unwrap();
    assert_eq!(head.reset_time, sooner);
}

#[test]
fn update_status_to_completed_removes_entry_from_peek() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let event = sample_event(Utc::now() + chrono::Duration::seconds(5));
    let id = event.id;
    enqueue(&path, event).unwrap();
    update_status(&path, id, EventStatus::Waiting).unwrap();
    update_status(&path, id, EventStatus::Resuming).unwrap();
    let queue = update_status(&path, id, EventStatus::Completed).unwrap();
    assert!(peek_next_pending(&queue).is_none());
}

#[test]
fn corrupt_queue_file_is_backed_up_and_reinitialized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    std::fs::write(&path, "{ not json").unwrap();

    let queue = load(&path).unwrap();
    assert!(queue.queue.is_empty());

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains("corrupt"))
        .collect();
    assert_eq!(backups.len(), 1);

    // The original path now holds a fresh, valid document.
    let reloaded = load(&path).unwrap();
    assert!(reloaded.queue.is_empty());
}

#[test]
fn legacy_flat_form_is_promoted_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let legacy = r#"{
        "detected": true,
        "reset_time": "2026-07-28T20:00:00Z",
        "timezone": "Asia/Dhaka",
        "message": "hit limit",
        "claude_pid": 999,
        "transcript_path": "/tmp/t.jsonl"
    }"#;
    std::fs::write(&path, legacy).unwrap();
    let queue = load(&path).unwrap();
    assert_eq!(queue.queue.len(), 1);
    assert_eq!(queue.queue[0].session_pid, Some(999));
}

#[test]
fn prune_removes_old_completed_entries_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let mut old_completed = sample_event(Utc::now());
    old_completed.status = EventStatus::Completed;
    old_completed.completed_at = Some(Utc::now() - chrono::Duration::hours(48));
    let mut recent_completed = sample_event(Utc::now());
    recent_completed.status = EventStatus::Completed;
    recent_completed.completed_at = Some(Utc::now());
    let pending = sample_event(Utc::now() + chrono::Duration::seconds(60));

    let mut queue = EventQueue::default();
    queue.queue.push(old_completed);
    queue.queue.push(recent_completed.clone());
    queue.queue.push(pending.clone());
    save(&path, &queue).unwrap();

    let pruned = prune(&path, chrono::Duration::hours(24)).unwrap();
    assert_eq!(pruned.queue.len(), 2);
    assert!(pruned.queue.iter().any(|e| e.id == recent_completed.id));
    assert!(pruned.queue.iter().any(|e| e.id == pending.id));
}

#[test]
fn touch_hook_run_updates_timestamp_without_adding_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let queue = touch_hook_run(&path).unwrap();
    assert!(queue.queue.is_empty());
    assert!(queue.last_hook_run.is_some());
}

#[test]
fn clear_empties_the_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    enqueue(&path, sample_event(Utc::now() + chrono::Duration::seconds(5))).unwrap();
    clear(&path).unwrap();
    let queue = load(&path).unwrap();
    assert!(queue.queue.is_empty());
}

proptest! {
    #[test]
    fn peek_next_pending_is_always_the_minimum(offsets in proptest::collection::vec(1i64..100_000, 1..20)) {
        let base = Utc::now();
        let mut queue = EventQueue::default();
        for offset in &offsets {
            queue.queue.push(sample_event(base + chrono::Duration::seconds(*offset)));
        }
        if let Some(head) = peek_next_pending(&queue) {
            for entry in &queue.queue {
                prop_assert!(head.reset_time <= entry.reset_time);
            }
        }
    }

    #[test]
    fn queue_round_trips_through_json_for_any_event_count(offsets in proptest::collection::vec(1i64..100_000, 0..10)) {
        let base = Utc::now();
        let mut queue = EventQueue::default();
        for offset in &offsets {
            queue.queue.push(sample_event(base + chrono::Duration::seconds(*offset)));
        }
        let json = serde_json::to_string(&queue).unwrap();
        let reloaded: EventQueue = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(reloaded, queue);
    }
}
