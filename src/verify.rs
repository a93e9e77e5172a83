// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active verifier: confirms a delivery attempt took effect by polling the
//! session transcript for new activity after a baseline mark, rather than
//! trusting a tier's subprocess exit code.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::event::VerificationProbe;
use crate::queue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub verified: bool,
    pub new_bytes: u64,
    pub elapsed: Duration,
}

/// Build a baseline probe for `transcript_path` taken right before a
/// delivery attempt. `timeout` bounds the active per-poll path (used when
/// `transcript_path` is `Some`); `passive_timeout` bounds the passive
/// fallback horizon (used when it's `None`) — these are distinct knobs per
/// spec.md §4.8 and must not be conflated.
pub fn baseline(
    transcript_path: Option<&Path>,
    sent_at: DateTime<Utc>,
    timeout: Duration,
    poll_interval: Duration,
    passive_timeout: Duration,
) -> VerificationProbe {
    let (baseline_mtime, baseline_size) = transcript_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| (m.modified().ok(), m.len()))
        .unwrap_or((None, 0));

    VerificationProbe {
        transcript_path: transcript_path.map(Path::to_path_buf),
        baseline_mtime,
        baseline_size,
        sent_at,
        timeout,
        poll_interval,
        passive_timeout,
    }
}

/// Poll until `timeout` elapses or the transcript shows new, well-formed
/// activity timestamped at or after `sent_at`.
pub async fn verify(probe: &VerificationProbe) -> VerificationResult {
    let Some(transcript_path) = probe.transcript_path.as_deref() else {
        return verify_passive(probe).await;
    };

    let start = tokio::time::Instant::now();
    loop {
        if let Some(mut result) = check_once(transcript_path, probe) {
            result.elapsed = start.elapsed();
            return result;
        }
        if start.elapsed() >= probe.timeout {
            return VerificationResult { verified: false, new_bytes: 0, elapsed: start.elapsed() };
        }
        tokio::time::sleep(probe.poll_interval.min(probe.timeout.saturating_sub(start.elapsed()).max(Duration::from_millis(1)))).await;
    }
}

fn check_once(transcript_path: &Path, probe: &VerificationProbe) -> Option<VerificationResult> {
    let metadata = std::fs::metadata(transcript_path).ok()?;
    let mtime = metadata.modified().ok();
    let size = metadata.len();

    let mtime_advanced = match (mtime, probe.baseline_mtime) {
        (Some(m), Some(b)) => m > b,
        (Some(_), None) => true,
        _ => false,
    };
    if !mtime_advanced || size <= probe.baseline_size {
        return None;
    }

    let new_bytes = size - probe.baseline_size;
    let tail = read_tail(transcript_path, probe.baseline_size).unwrap_or_default();
    let has_fresh_record = tail.lines().any(|line| line_is_fresh(line, probe.sent_at));

    has_fresh_record.then(|| VerificationResult { verified: true, new_bytes, elapsed: Duration::ZERO })
}

fn line_is_fresh(line: &str, sent_at: DateTime<Utc>) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(line.trim()) else { return false };
    let Some(ts) = value.get("timestamp").and_then(|v| v.as_str()) else { return false };
    let Ok(parsed) = DateTime::parse_from_rfc3339(ts) else { return false };
    parsed.with_timezone(&Utc) >= sent_at
}

fn read_tail(path: &Path, from_byte: u64) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    file.seek(SeekFrom::Start(from_byte))?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)?;
    Ok(buf)
}

/// Fallback when no transcript is available to poll: wait the full
/// verification window and treat silence (no new rate-limit event
/// enqueued since `sent_at`) as success.
async fn verify_passive(probe: &VerificationProbe) -> VerificationResult {
    tokio::time::sleep(probe.passive_timeout).await;
    let queue_path = match crate::paths::StateDir::resolve() {
        Ok(dir) => dir.queue_file(),
        Err(_) => return VerificationResult { verified: true, new_bytes: 0, elapsed: probe.passive_timeout },
    };
    let verified = match queue::load(&queue_path) {
        Ok(q) => !q.queue.iter().any(|e| e.detected_at > probe.sent_at),
        Err(_) => true,
    };
    VerificationResult { verified, new_bytes: 0, elapsed: probe.passive_timeout }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
