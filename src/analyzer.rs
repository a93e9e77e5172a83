// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transcript analyzer: line-by-line scan of a newline-delimited JSON
//! transcript for rate-limit sentinels.
//!
//! Two invocation paths share this scanner: the external hook (stdin
//! payload, see [`HookPayload`]) and the supervisor's own transcript
//! poller ([`crate::watcher`]).

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::timeres;

/// A detected rate-limit event, not yet wrapped as a [`crate::event::RateLimitEvent`]
/// (the caller attaches `transcript_path`/`session_pid`/`source`).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerResult {
    pub reset_time_utc: DateTime<Utc>,
    pub timezone: String,
    pub raw_message: String,
}

/// Stdin payload for the external hook invocation path.
#[derive(Debug, Clone, Deserialize)]
pub struct HookPayload {
    pub transcript_path: PathBuf,
    #[serde(default)]
    pub session_id: String,
}

#[allow(clippy::unwrap_used)]
static SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hit your limit|rate limit exceeded|try again in").unwrap());

/// Matches `resets 8pm (Asia/Dhaka)` / `resets 8:30am (UTC)`. The preceding
/// "You've" may use either an ASCII or curly apostrophe; that's handled by
/// not anchoring on it at all — we only need the `resets ...` token itself.
#[allow(clippy::unwrap_used)]
static RESET_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)resets\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)\s*\(([^)]+)\)").unwrap()
});

/// Matches `try again in 4h32m` / `try again in 58 minutes`.
#[allow(clippy::unwrap_used)]
static DURATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)try again in\s+(?:(\d+)\s*h(?:ours?)?)?\s*(?:(\d+)\s*m(?:in(?:ute)?s?)?)?").unwrap()
});

/// Scan a single already-extracted text blob for a rate-limit sentinel and
/// resolve it to an absolute UTC instant.
///
/// Returns `None` if no sentinel matches, or if a sentinel matches but no
/// reset-time token can be extracted from it (logged once at `warn`).
pub fn scan_text(text: &str, now: DateTime<Utc>) -> Option<AnalyzerResult> {
    if !SENTINEL.is_match(text) {
        return None;
    }

    if let Some(caps) = RESET_TOKEN.captures(text) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let meridiem = caps.get(3)?.as_str();
        let zone = caps.get(4)?.as_str().trim();

        return match timeres::resolve(hour, minute, meridiem, zone, now) {
            Ok(reset_time_utc) => {
                Some(AnalyzerResult { reset_time_utc, timezone: zone.to_string(), raw_message: text.to_string() })
            }
            Err(e) => {
                tracing::warn!("transcript analyzer: could not resolve reset time: {e:#}");
                None
            }
        };
    }

    if let Some(caps) = DURATION_TOKEN.captures(text) {
        let hours: i64 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let minutes: i64 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        if hours == 0 && minutes == 0 {
            tracing::warn!("transcript analyzer: sentinel matched but no duration token found");
            return None;
        }
        let reset_time_utc = now + chrono::Duration::hours(hours) + chrono::Duration::minutes(minutes);
        return Some(AnalyzerResult { reset_time_utc, timezone: "UTC".to_string(), raw_message: text.to_string() });
    }

    tracing::warn!("transcript analyzer: sentinel matched but no reset-time token found");
    None
}

/// Recursively collect every string leaf in a JSON value into one blob so
/// the sentinel/time-token regexes can match regardless of which field the
/// assistant client used to carry the message.
fn flatten_strings(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::String(s) => {
            out.push_str(s);
            out.push(' ');
        }
        serde_json::Value::Array(items) => items.iter().for_each(|v| flatten_strings(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| flatten_strings(v, out)),
        _ => {}
    }
}

/// Scan a single NDJSON line. Malformed JSON is skipped (returns `None`)
/// without aborting the caller's line loop.
pub fn scan_line(line: &str) -> Option<AnalyzerResult> {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return None,
    };
    let mut text = String::new();
    flatten_strings(&value, &mut text);
    scan_text(&text, Utc::now())
}

/// Scan a transcript file line-by-line, never loading it whole into memory.
/// Returns the first match found, or `None` on no match, unreadable file,
/// or an absent file (all logged, never panics).
pub fn scan_file(path: &Path) -> Option<AnalyzerResult> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("transcript analyzer: could not open {}: {e}", path.display());
            return None;
        }
    };
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("transcript analyzer: read error on {}: {e}", path.display());
                return None;
            }
        };
        if let Some(result) = scan_line(&line) {
            return Some(result);
        }
    }
    None
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
