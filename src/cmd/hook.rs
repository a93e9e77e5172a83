// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hook` (hidden) — read a transcript-analyzer payload from stdin, scan
//! the named transcript, and enqueue a detected event. Always exits 0;
//! analysis failures are logged, not surfaced to the calling assistant.

use std::io::Read;

use crate::analyzer::{self, HookPayload};
use crate::event::{EventSource, RateLimitEvent};
use crate::paths::StateDir;
use crate::queue;

pub fn run(state_dir: StateDir) -> i32 {
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        tracing::warn!("hook: failed to read stdin: {e}");
        return 0;
    }

    let payload: HookPayload = match serde_json::from_str(&input) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("hook: invalid payload: {e}");
            return 0;
        }
    };

    let Some(result) = analyzer::scan_file(&payload.transcript_path) else {
        if let Err(e) = queue::touch_hook_run(&state_dir.queue_file()) {
            tracing::warn!("hook: failed to record hook run: {e:#}");
        }
        return 0;
    };

    let session_pid = payload.session_id.parse::<u32>().ok();
    let event = RateLimitEvent::new(
        result.reset_time_utc,
        result.timezone,
        result.raw_message,
        payload.transcript_path,
        session_pid,
        EventSource::Hook,
    );

    if let Err(e) = queue::enqueue(&state_dir.queue_file(), event) {
        tracing::warn!("hook: failed to enqueue detected event: {e:#}");
    }

    0
}
