// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable event queue: a single JSON document with atomic-replace write
//! semantics, shared read/write between the supervisor and the external
//! hook invocation of the transcript analyzer.

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::event::{EventQueue, EventStatus, LegacyStatusDocument, RateLimitEvent};

/// Write `bytes` to `path` atomically: write to a sibling temp file, fsync,
/// then rename over the destination. The rename gives all-or-nothing
/// visibility to concurrent readers.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        use std::io::Write;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load the queue document, promoting the legacy flat form and recovering
/// from a corrupt file by backing it up and reinitializing — per the
/// "never crash the caller" contract.
pub fn load(path: &Path) -> anyhow::Result<EventQueue> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let fresh = EventQueue::default();
            save(path, &fresh)?;
            return Ok(fresh);
        }
        Err(e) => return Err(e.into()),
    };

    if let Ok(queue) = serde_json::from_str::<EventQueue>(&contents) {
        return Ok(queue);
    }
    if let Ok(legacy) = serde_json::from_str::<LegacyStatusDocument>(&contents) {
        let queue = legacy.into_queue();
        save(path, &queue)?;
        return Ok(queue);
    }

    tracing::warn!("queue document at {} is not valid JSON, backing up and reinitializing", path.display());
    let backup_path = path.with_extension(format!("json.corrupt.{}", Utc::now().timestamp()));
    let _ = std::fs::rename(path, &backup_path);
    let fresh = EventQueue::default();
    save(path, &fresh)?;
    Ok(fresh)
}

pub fn save(path: &Path, queue: &EventQueue) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(queue)?;
    atomic_write(path, json.as_bytes())
}

/// Append `event` unless a `pending` entry already shares its `reset_time`
/// within 1-second granularity (deduplication). Each call is its own
/// critical section: read-modify-write-rename against the on-disk file.
pub fn enqueue(path: &Path, mut event: RateLimitEvent) -> anyhow::Result<EventQueue> {
    let mut queue = load(path)?;

    let duplicate = queue.queue.iter().any(|existing| {
        existing.status == EventStatus::Pending
            && (existing.reset_time - event.reset_time).num_seconds().abs() < 1
    });

    if !duplicate {
        if !queue.sessions.contains(&session_key(&event)) {
            queue.sessions.push(session_key(&event));
        }
        event.status = EventStatus::Pending;
        queue.queue.push(event);
    }
    queue.last_hook_run = Some(Utc::now());

    save(path, &queue)?;
    Ok(queue)
}

/// Record that the analyzer hook ran without finding a rate-limit event, so
/// `last_hook_run` still reflects the most recent invocation.
pub fn touch_hook_run(path: &Path) -> anyhow::Result<EventQueue> {
    let mut queue = load(path)?;
    queue.last_hook_run = Some(Utc::now());
    save(path, &queue)?;
    Ok(queue)
}

fn session_key(event: &RateLimitEvent) -> String {
    event.session_pid.map(|pid| pid.to_string()).unwrap_or_else(|| event.transcript_path.display().to_string())
}

/// The `pending` entry with the smallest `reset_time`, if any.
pub fn peek_next_pending(queue: &EventQueue) -> Option<&RateLimitEvent> {
    queue
        .queue
        .iter()
        .filter(|e| e.status == EventStatus::Pending)
        .min_by_key(|e| e.reset_time)
}

/// Apply a forward status transition to the entry with `id` and persist it.
pub fn update_status(path: &Path, id: Uuid, next: EventStatus) -> anyhow::Result<EventQueue> {
    let mut queue = load(path)?;
    if let Some(entry) = queue.queue.iter_mut().find(|e| e.id == id) {
        entry.advance(next)?;
    }
    save(path, &queue)?;
    Ok(queue)
}

/// Remove `completed`/`failed` entries older than `retention`.
pub fn prune(path: &Path, retention: chrono::Duration) -> anyhow::Result<EventQueue> {
    let mut queue = load(path)?;
    let cutoff = Utc::now() - retention;
    queue.queue.retain(|e| match (e.status, e.completed_at) {
        (EventStatus::Completed | EventStatus::Failed, Some(completed_at)) => completed_at > cutoff,
        (EventStatus::Completed | EventStatus::Failed, None) => false,
        _ => true,
    });
    save(path, &queue)?;
    Ok(queue)
}

/// Clear the queue document entirely (the `reset` command).
pub fn clear(path: &Path) -> anyhow::Result<()> {
    save(path, &EventQueue::default())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
