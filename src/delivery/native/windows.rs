// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windows native injection: an out-of-process PowerShell script drives
//! `System.Windows.Forms.SendKeys` against the foreground window. The
//! script body is passed via `-Command` as a single argv element, not
//! written to a temp `.ps1` file.

use tokio::process::Command;

use crate::delivery::keystrokes::NudgeStep;
use crate::delivery::TierOutcome;

pub async fn probe_available(_session_pid: Option<u32>) -> bool {
    which("powershell").is_some()
}

fn sendkeys_token(step: &NudgeStep) -> String {
    if step.bytes == [0x1b] {
        "{ESC}".to_string()
    } else if step.bytes == [0x15] {
        "^u".to_string()
    } else if step.bytes == b"\r" {
        "{ENTER}".to_string()
    } else {
        String::from_utf8_lossy(&step.bytes).replace('{', "{{}").replace('}', "{}}").replace('^', "{^}")
    }
}

pub async fn attempt(_session_pid: Option<u32>, steps: &[NudgeStep]) -> TierOutcome {
    if which("powershell").is_none() {
        return TierOutcome::Unavailable("powershell not found".to_string());
    }

    for step in steps {
        let token = sendkeys_token(step);
        let command = format!(
            "Add-Type -AssemblyName System.Windows.Forms; [System.Windows.Forms.SendKeys]::SendWait('{token}')"
        );
        let status = Command::new("powershell").args(["-NoProfile", "-Command", &command]).status().await;
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => return TierOutcome::TransientFailure(format!("powershell exited {s}")),
            Err(e) => return TierOutcome::TransientFailure(format!("powershell failed to spawn: {e}")),
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
#[path = "windows_tests.rs"]
mod tests;
