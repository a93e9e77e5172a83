// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared keystroke-sequence encoder used by every delivery tier.

use std::time::Duration;

/// One element of a keystroke sequence: raw bytes to write, plus an
/// optional pause before the next element. Tiers that can batch writes
/// (tmux `send-keys`) and tiers that must write byte-by-byte (a raw PTY
/// device) both consume the same step list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NudgeStep {
    pub bytes: Vec<u8>,
    pub delay_after: Option<Duration>,
}

const INTER_STEP_PAUSE: Duration = Duration::from_millis(120);

/// Build the fixed four-element resume sequence: `ESC` (dismiss any
/// interactive menu), `Ctrl+U` (clear the line buffer), the literal resume
/// prompt, then `Enter`.
pub fn resume_sequence(resume_prompt: &str) -> Vec<NudgeStep> {
    vec![
        NudgeStep { bytes: vec![0x1b], delay_after: Some(INTER_STEP_PAUSE) },
        NudgeStep { bytes: vec![0x15], delay_after: Some(INTER_STEP_PAUSE) },
        NudgeStep { bytes: resume_prompt.as_bytes().to_vec(), delay_after: Some(INTER_STEP_PAUSE) },
        NudgeStep { bytes: b"\r".to_vec(), delay_after: None },
    ]
}

/// Flatten a step list into one byte buffer for transports (like a raw PTY
/// write) that send the whole sequence in one syscall rather than pausing
/// between elements themselves.
pub fn flatten(steps: &[NudgeStep]) -> Vec<u8> {
    steps.iter().flat_map(|s| s.bytes.iter().copied()).collect()
}

#[cfg(test)]
#[path = "keystrokes_tests.rs"]
mod tests;
