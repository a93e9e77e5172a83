// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! macOS native injection via the accessibility/scripting bridge
//! (`osascript` + System Events). Requires accessibility permissions
//! granted to the supervisor's binary.
//!
//! The script text is passed as a single `-e` argv element, never written
//! to a temp file and executed — avoiding the fragile generated-shell
//! pattern this tier replaces.

use tokio::process::Command;

use crate::delivery::keystrokes::NudgeStep;
use crate::delivery::TierOutcome;

pub async fn probe_available(_session_pid: Option<u32>) -> bool {
    which("osascript").is_some()
}

fn script_for_step(step: &NudgeStep) -> String {
    if step.bytes == [0x1b] {
        "key code 53".to_string() // Escape
    } else if step.bytes == [0x15] {
        "key code 32 using control down".to_string() // Ctrl+U ('u' is key code 32)
    } else if step.bytes == b"\r" {
        "key code 36".to_string() // Return
    } else {
        let text = String::from_utf8_lossy(&step.bytes).replace('\\', "\\\\").replace('"', "\\\"");
        format!("keystroke \"{text}\"")
    }
}

pub async fn attempt(_session_pid: Option<u32>, steps: &[NudgeStep]) -> TierOutcome {
    if which("osascript").is_none() {
        return TierOutcome::Unavailable("osascript not found".to_string());
    }

    for step in steps {
        let line = script_for_step(step);
        let script = format!(
            "tell application \"System Events\"\nset frontApp to name of first application process whose frontmost is true\ntell process frontApp\n{line}\nend tell\nend tell"
        );
        let status = Command::new("osascript").args(["-e", &script]).status().await;
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => return TierOutcome::TransientFailure(format!("osascript exited {s}")),
            Err(e) => return TierOutcome::TransientFailure(format!("osascript failed to spawn: {e}")),
        }
        if let Some(delay) = step.delay_after {
            tokio::time::sleep(delay).await;
        }
    }
    TierOutcome::Sent
}

fn which(binary: &str) -> Option<std::path::PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).map(|dir| dir.join(binary)).find(|p| p.is_file())
}

#[cfg(test)]
#[path = "macos_tests.rs"]
mod tests;
