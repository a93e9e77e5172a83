// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status watcher: two independent observers feeding the scheduler.
//!
//! The queue-file observer stats `status.json` on a fixed interval and
//! reacts to `notify` events; the transcript poller is a fallback that
//! scans the project tree for unprocessed rate-limit sentinels when the
//! external hook hasn't run recently.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::event::{EventQueue, EventSource, RateLimitEvent};
use crate::{analyzer, queue};

/// Watches `status.json` for mtime changes and surfaces the queue's head
/// pending event whenever it changes.
pub struct QueueWatcher {
    path: PathBuf,
    check_interval: Duration,
    last_mtime: Option<SystemTime>,
}

impl QueueWatcher {
    pub fn new(path: PathBuf, check_interval: Duration) -> Self {
        Self { path, check_interval, last_mtime: None }
    }

    fn current_mtime(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Check once for an mtime change; if changed, load and return the
    /// queue. Never errors the caller — read failures are logged and
    /// treated as "no change".
    pub fn poll_once(&mut self) -> Option<EventQueue> {
        let mtime = self.current_mtime()?;
        if self.last_mtime == Some(mtime) {
            return None;
        }
        self.last_mtime = Some(mtime);
        match queue::load(&self.path) {
            Ok(q) => Some(q),
            Err(e) => {
                tracing::warn!("status watcher: failed to load queue document: {e:#}");
                None
            }
        }
    }

    /// Run until `shutdown` is cancelled, sending the reloaded queue on
    /// every observed mtime change via both a `notify` wake and a polling
    /// fallback, matching the dual-path convention used for transcript
    /// watching elsewhere in this crate.
    pub async fn run(mut self, queue_tx: mpsc::Sender<EventQueue>, shutdown: CancellationToken) {
        let (wake_tx, mut wake_rx) = mpsc::channel::<()>(1);
        let _notify_watcher = setup_notify_watcher(&self.path, wake_tx);

        let mut interval = tokio::time::interval(self.check_interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = wake_rx.recv() => {}
                _ = interval.tick() => {}
            }
            if let Some(changed) = self.poll_once() {
                if queue_tx.send(changed).await.is_err() {
                    break;
                }
            }
        }
    }
}

fn setup_notify_watcher(path: &Path, wake_tx: mpsc::Sender<()>) -> Option<notify::RecommendedWatcher> {
    use notify::{RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |_: notify::Result<notify::Event>| {
        let _ = wake_tx.try_send(());
    })
    .ok()?;
    let watch_dir = path.parent().unwrap_or(path);
    watcher.watch(watch_dir, RecursiveMode::NonRecursive).ok()?;
    Some(watcher)
}

/// Fallback transcript poller: every 30 seconds, scans `root` (depth ≤ 3)
/// for the most recently modified `*.jsonl` transcript. If it was touched
/// within `max_age` and yields a sentinel, enqueues the event — but only
/// when the queue has no currently-pending entry (the hook path is
/// authoritative when it's running).
pub struct TranscriptPoller {
    root: PathBuf,
    poll_interval: Duration,
    max_age: Duration,
}

impl TranscriptPoller {
    pub fn new(root: PathBuf) -> Self {
        Self { root, poll_interval: Duration::from_secs(30), max_age: Duration::from_secs(600) }
    }

    /// Walk `root` up to 3 levels deep and return the most recently
    /// modified `*.jsonl` file, if any.
    pub fn find_latest_transcript(&self) -> Option<PathBuf> {
        let mut best: Option<(PathBuf, SystemTime)> = None;
        walk(&self.root, 0, 3, &mut best);
        best.map(|(path, _)| path)
    }

    pub async fn run(self, queue_path: PathBuf, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }
            self.tick(&queue_path);
        }
    }

    fn tick(&self, queue_path: &Path) {
        let Some(transcript) = self.find_latest_transcript() else { return };
        let Ok(metadata) = std::fs::metadata(&transcript) else { return };
        let Ok(modified) = metadata.modified() else { return };
        let Ok(age) = SystemTime::now().duration_since(modified) else { return };
        if age > self.max_age {
            return;
        }

        let Ok(existing) = queue::load(queue_path) else { return };
        if queue::peek_next_pending(&existing).is_some() {
            return;
        }

        let Some(result) = analyzer::scan_file(&transcript) else { return };
        let event = RateLimitEvent::new(
            result.reset_time_utc,
            result.timezone,
            result.raw_message,
            transcript,
            None,
            EventSource::TranscriptPoll,
        );
        if let Err(e) = queue::enqueue(queue_path, event) {
            tracing::warn!("transcript poller: failed to enqueue detected event: {e:#}");
        }
    }
}

fn walk(dir: &Path, depth: u8, max_depth: u8, best: &mut Option<(PathBuf, SystemTime)>) {
    let Ok(entries) = std::fs::read_dir(dir) else { return };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else { continue };
        if metadata.is_dir() {
            if depth < max_depth {
                walk(&path, depth + 1, max_depth, best);
            }
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let Ok(modified) = metadata.modified() else { continue };
        let is_newer = best.as_ref().map(|(_, t)| modified > *t).unwrap_or(true);
        if is_newer {
            *best = Some((path, modified));
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
