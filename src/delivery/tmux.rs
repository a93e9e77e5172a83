// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier 1: session-multiplexer pane delivery.
//!
//! Works even when the display is locked — this is its primary value
//! proposition over tier 3.

use std::time::Duration;

use tokio::process::Command;

use super::keystrokes::NudgeStep;
use super::process::ancestors;
use super::TierOutcome;

/// `tmux` is on `PATH` and `session_pid` resolves to a pane within an
/// active session. Availability is re-probed at every attempt, never
/// cached.
pub async fn probe_available(session_pid: Option<u32>) -> bool {
    if which("tmux").is_none() {
        return false;
    }
    let Some(pid) = session_pid else { return false };
    find_pane(pid).await.is_some()
}

/// One `(pane_pid, session_name, pane_id)` triple enumerated from `tmux
/// list-panes -a`.
struct Pane {
    pane_pid: u32,
    pane_id: String,
}

async fn list_panes() -> Vec<Pane> {
    let output = Command::new("tmux")
        .args(["list-panes", "-a", "-F", "#{pane_pid} #{pane_id}"])
        .output()
        .await;
    let Ok(output) = output else { return vec![] };
    if !output.status.success() {
        return vec![];
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let pane_pid: u32 = parts.next()?.parse().ok()?;
            let pane_id = parts.next()?.to_string();
            Some(Pane { pane_pid, pane_id })
        })
        .collect()
}

/// Walk the process-parent chain from `session_pid` upward until one of
/// its ancestors matches a pane's shell PID.
async fn find_pane(session_pid: u32) -> Option<String> {
    let panes = list_panes().await;
    if panes.is_empty() {
        return None;
    }
    let chain = ancestors(session_pid);
    chain.into_iter().find_map(|candidate| {
        panes.iter().find(|p| p.pane_pid == candidate).map(|p| p.pane_id.clone())
    })
}

pub async fn attempt(session_pid: Option<u32>, steps: &[NudgeStep]) -> TierOutcome {
    let Some(pid) = session_pid else {
        return TierOutcome::Unavailable("no session_pid to target a pane".to_string());
    };
    let Some(pane_id) = find_pane(pid).await else {
        return TierOutcome::Unavailable(format!("no tmux pane found for pid {pid}"));
    };

    for step in steps {
        let text = String::from_utf8_lossy(&step.bytes).into_owned();
        let status = Command::new("tmux")
            .args(["send-keys", "-t", &pane_id, "-l", &text])
            .status()
            .await;
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => return TierOutcome::TransientFailure(format!("tmux send-keys exited {s}")),
            Err(e) => return TierOutcome::TransientFailure(format!("tmux send-keys failed to spawn: {e}")),
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
#[path = "tmux_tests.rs"]
mod tests;
