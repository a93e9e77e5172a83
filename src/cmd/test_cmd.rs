// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `test <seconds>` — run a synthetic countdown and execute delivery,
//! without going through the hook/transcript-detection path.

use std::path::PathBuf;

use crate::config::Configuration;
use crate::delivery::Orchestrator;
use crate::event::{EventSource, RateLimitEvent};
use crate::paths::StateDir;
use crate::scheduler::Scheduler;

pub async fn run(state_dir: StateDir, seconds: u64) -> i32 {
    let config = Configuration::load(&state_dir.config_file()).unwrap_or_default();
    let queue_path = state_dir.queue_file();

    let event = RateLimitEvent::new(
        chrono::Utc::now() + chrono::Duration::seconds(seconds as i64),
        "UTC",
        "synthetic test countdown",
        PathBuf::new(),
        None,
        EventSource::Hook,
    );
    if let Err(e) = crate::queue::enqueue(&queue_path, event) {
        eprintln!("error: failed to enqueue synthetic event: {e:#}");
        return 1;
    }

    let (scheduler, mut ticks) = Scheduler::new(queue_path.clone(), config.clone());
    let orchestrator = std::sync::Arc::new(Orchestrator::new(config));
    let notifier = std::sync::Arc::new(crate::notifier::NoopNotifier);
    let shutdown = tokio_util::sync::CancellationToken::new();

    scheduler.ensure_running(orchestrator, notifier, shutdown.clone());

    while let Ok(tick) = ticks.recv().await {
        println!("resuming in {}s...", tick.remaining.as_secs());
        if tick.remaining.is_zero() {
            break;
        }
    }

    // Poll until the event reaches a terminal status.
    loop {
        if let Ok(q) = crate::queue::load(&queue_path) {
            if q.queue.iter().all(|e| e.status.is_terminal()) {
                break;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    }

    0
}
