// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linux/X11 native injection. Uses `xdotool`, which drives the X test
//! extension (synthetic keystrokes injected into the X input stream) for
//! its `key`/`type` subcommands — the synthetic-event path many terminal
//! emulators silently ignore is deliberately avoided.
//!
//! Every invocation spawns `xdotool` directly with an argv array; no shell
//! script is generated or executed.

use tokio::process::Command;

use crate::delivery::keystrokes::NudgeStep;
use crate::delivery::process::ancestors;
use crate::delivery::TierOutcome;

const TERMINAL_CLASSES: &[&str] = &["Alacritty", "kitty", "Gnome-terminal", "XTerm", "konsole"];
const ASSISTANT_COMMAND_PATTERNS: &[&str] = &["claude", "codex", "gemini"];

async fn xdotool(args: &[&str]) -> Option<String> {
    let output = Command::new("xdotool").args(args).output().await.ok()?;
    output.status.success().then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub async fn probe_available(session_pid: Option<u32>) -> bool {
    if which("xdotool").is_none() {
        return false;
    }
    find_window(session_pid).await.is_some()
}

/// Window discovery in priority order, stopping at the first match.
async fn find_window(session_pid: Option<u32>) -> Option<u64> {
    if let Some(pid) = session_pid {
        for candidate in ancestors(pid) {
            if let Some(id) = window_for_pid(candidate).await {
                return Some(id);
            }
        }
        return None;
    }

    for pid in live_assistant_pids() {
        for candidate in ancestors(pid) {
            if let Some(id) = window_for_pid(candidate).await {
                return Some(id);
            }
        }
    }

    for class in TERMINAL_CLASSES {
        if let Some(id) = search_by_class(class).await {
            return Some(id);
        }
    }
    None
}

async fn window_for_pid(pid: u32) -> Option<u64> {
    let pid_str = pid.to_string();
    let out = xdotool(&["search", "--pid", &pid_str]).await?;
    out.lines().next()?.parse().ok()
}

async fn search_by_class(class: &str) -> Option<u64> {
    let out = xdotool(&["search", "--class", class]).await?;
    out.lines().next()?.parse().ok()
}

fn live_assistant_pids() -> Vec<u32> {
    let Ok(entries) = std::fs::read_dir("/proc") else { return vec![] };
    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str()?.parse::<u32>().ok())
        .filter(|pid| {
            std::fs::read_to_string(format!("/proc/{pid}/comm"))
                .map(|comm| ASSISTANT_COMMAND_PATTERNS.iter().any(|p| comm.trim() == *p))
                .unwrap_or(false)
        })
        .collect()
}

/// Count shell children of the emulator's window-owning process, used to
/// decide how many tabs to cycle through.
fn shell_tab_count(emulator_pid: u32) -> usize {
    let Ok(entries) = std::fs::read_dir("/proc") else { return 1 };
    let count = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str()?.parse::<u32>().ok())
        .filter(|pid| parent_of(*pid) == Some(emulator_pid))
        .count();
    count.max(1)
}

fn parent_of(pid: u32) -> Option<u32> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let after_comm = stat.rsplit_once(')')?.1;
    after_comm.split_whitespace().nth(1)?.parse().ok()
}

pub async fn attempt(session_pid: Option<u32>, steps: &[NudgeStep]) -> TierOutcome {
    let Some(window) = find_window(session_pid).await else {
        return TierOutcome::Unavailable("no X window found for session".to_string());
    };

    let original_focus = xdotool(&["getactivewindow"]).await;

    let tabs = session_pid.map(shell_tab_count).unwrap_or(1);
    let window_str = window.to_string();

    for tab in 0..tabs {
        if let Err(e) = inject_into_window(&window_str, steps).await {
            return TierOutcome::TransientFailure(e);
        }
        if tab + 1 < tabs {
            let status =
                Command::new("xdotool").args(["key", "--window", &window_str, "ctrl+Next"]).status().await;
            if status.map(|s| !s.success()).unwrap_or(true) {
                return TierOutcome::TransientFailure("failed to cycle to next tab".to_string());
            }
        }
    }

    if let Some(original) = original_focus {
        let _ = Command::new("xdotool").args(["windowactivate", &original]).status().await;
    }

    TierOutcome::Sent
}

async fn inject_into_window(window: &str, steps: &[NudgeStep]) -> Result<(), String> {
    for step in steps {
        let result = if step.bytes == [0x1b] {
            Command::new("xdotool").args(["key", "--window", window, "Escape"]).status().await
        } else if step.bytes == [0x15] {
            Command::new("xdotool").args(["key", "--window", window, "ctrl+u"]).status().await
        } else if step.bytes == b"\r" {
            Command::new("xdotool").args(["key", "--window", window, "Return"]).status().await
        } else {
            let text = String::from_utf8_lossy(&step.bytes).into_owned();
            Command::new("xdotool").args(["type", "--window", window, &text]).status().await
        };
        match result {
            Ok(s) if s.success() => {}
            Ok(s) => return Err(format!("xdotool exited {s}")),
            Err(e) => return Err(format!("xdotool failed to spawn: {e}")),
        }
        if let Some(delay) = step.delay_after {
            tokio::time::sleep(delay).await;
        }
    }
    Ok(())
}

fn which(binary: &str) -> Option<std::path::PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).map(|dir| dir.join(binary)).find(|p| p.is_file())
}

#[cfg(test)]
#[path = "linux_tests.rs"]
mod tests;
