// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform-abstracted process-tree operations used to map an assistant
//! session PID to an owning terminal window: `ancestors(pid)` plus the
//! liveness check every tier's availability probe depends on.

use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Whether `pid` refers to a live process, probed via a signal-0 `kill`.
pub fn is_process_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Walk the parent-process chain starting at `pid`, returning `pid` itself
/// followed by each ancestor up to (but not including) pid 1 or the first
/// unreadable entry.
#[cfg(target_os = "linux")]
pub fn ancestors(pid: u32) -> Vec<u32> {
    let mut chain = vec![pid];
    let mut current = pid;
    loop {
        let Some(parent) = parent_of(current) else { break };
        if parent == 0 || parent == 1 || parent == current {
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

#[cfg(target_os = "linux")]
fn parent_of(pid: u32) -> Option<u32> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    // Fields after the (possibly space-containing) comm field in parens.
    let after_comm = stat.rsplit_once(')')?.1;
    let ppid_field = after_comm.split_whitespace().nth(1)?;
    ppid_field.parse().ok()
}

#[cfg(not(target_os = "linux"))]
pub fn ancestors(pid: u32) -> Vec<u32> {
    vec![pid]
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
