// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier 2: pseudo-terminal device write. Unix-like systems only; this tier
//! is absent on Windows. Works when the display is locked.

use std::io::Write;
use std::path::PathBuf;

use super::keystrokes::NudgeStep;
use super::TierOutcome;

/// Resolve the `/dev/pts/<N>` (or platform-equivalent) device backing a
/// session's stdin, if any.
#[cfg(unix)]
fn pty_device_for(session_pid: u32) -> Option<PathBuf> {
    let link = format!("/proc/{session_pid}/fd/0");
    let target = std::fs::read_link(link).ok()?;
    let is_pty = target.to_str()?.starts_with("/dev/pts/") || target.to_str()?.starts_with("/dev/tty");
    is_pty.then_some(target)
}

#[cfg(not(unix))]
fn pty_device_for(_session_pid: u32) -> Option<PathBuf> {
    None
}

fn can_write(path: &std::path::Path) -> bool {
    std::fs::OpenOptions::new().write(true).open(path).is_ok()
}

pub async fn probe_available(session_pid: Option<u32>) -> bool {
    let Some(pid) = session_pid else { return false };
    match pty_device_for(pid) {
        Some(device) => can_write(&device),
        None => false,
    }
}

/// Write the translated byte sequence to the PTY device: control
/// characters for ESC/Ctrl+U, literal bytes for the prompt, `\r` for
/// Enter, honoring each step's inter-element delay.
pub async fn attempt(session_pid: Option<u32>, steps: &[NudgeStep]) -> TierOutcome {
    let Some(pid) = session_pid else {
        return TierOutcome::Unavailable("no session_pid to target a pty".to_string());
    };
    let Some(device) = pty_device_for(pid) else {
        return TierOutcome::Unavailable(format!("no pty device found for pid {pid}"));
    };

    let mut file = match std::fs::OpenOptions::new().write(true).open(&device) {
        Ok(f) => f,
        Err(e) => return TierOutcome::Unavailable(format!("cannot open {}: {e}", device.display())),
    };

    for step in steps {
        if let Err(e) = file.write_all(&step.bytes) {
            return TierOutcome::TransientFailure(format!("write to {} failed: {e}", device.display()));
        }
        if let Some(delay) = step.delay_after {
            tokio::time::sleep(delay).await;
        }
    }
    TierOutcome::Sent
}

#[cfg(test)]
#[path = "pty_tests.rs"]
mod tests;
