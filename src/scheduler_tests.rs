use std::sync::Mutex;

use super::*;
use crate::event::{EventSource, RateLimitEvent};

struct RecordingNotifier {
    failures: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify_delivery_failed(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}

fn fast_config() -> Configuration {
    let mut config = Configuration::default();
    config.post_reset_delay_sec = 0;
    config.max_retries = 0;
    config.active_verification_timeout_ms = 50;
    config.active_verification_poll_ms = 10;
    config
}

#[tokio::test]
async fn drains_a_single_event_to_failed_with_no_tiers_available() {
    let dir = tempfile::tempdir().unwrap();
    let queue_path = dir.path().join("status.json");

    let event = RateLimitEvent::new(
        Utc::now() + chrono::Duration::milliseconds(50),
        "UTC",
        "hit limit",
        dir.path().join("transcript.jsonl"),
        None,
        EventSource::Hook,
    );
    let id = event.id;
    queue::enqueue(&queue_path, event).unwrap();

    let (scheduler, mut ticks) = Scheduler::new(queue_path.clone(), fast_config());
    let orchestrator = Arc::new(Orchestrator::new(fast_config()));
    let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier { failures: Mutex::new(Vec::new()) });
    let shutdown = CancellationToken::new();

    scheduler.ensure_running(orchestrator, Arc::clone(&notifier), shutdown.clone());

    // Drain at least one tick and wait for the event to reach a terminal state.
    let _ = tokio::time::timeout(Duration::from_secs(5), ticks.recv()).await;

    let mut final_status = None;
    for _ in 0..200 {
        let queue = queue::load(&queue_path).unwrap();
        if let Some(entry) = queue.queue.iter().find(|e| e.id == id) {
            if entry.status.is_terminal() {
                final_status = Some(entry.status);
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(final_status, Some(EventStatus::Failed));
}

#[tokio::test]
async fn ensure_running_is_idempotent_while_a_countdown_is_active() {
    let dir = tempfile::tempdir().unwrap();
    let queue_path = dir.path().join("status.json");
    queue::save(&queue_path, &crate::event::EventQueue::default()).unwrap();

    let (scheduler, _ticks) = Scheduler::new(queue_path, fast_config());
    assert!(!scheduler.active.load(Ordering::Acquire));

    let orchestrator = Arc::new(Orchestrator::new(fast_config()));
    let notifier: Arc<dyn Notifier> = Arc::new(crate::notifier::NoopNotifier);
    let shutdown = CancellationToken::new();

    scheduler.ensure_running(Arc::clone(&orchestrator), Arc::clone(&notifier), shutdown.clone());
    // Second call while the first drain task may still be running must not
    // spawn a second drain loop; the dedup flag makes this a no-op.
    scheduler.ensure_running(orchestrator, notifier, shutdown);
}
