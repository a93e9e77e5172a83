// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `status` — whether the daemon is running, plus a queue summary.

use crate::delivery::process::is_process_alive;
use crate::paths::StateDir;
use crate::queue;

pub fn run(state_dir: StateDir) -> i32 {
    let running_pid = std::fs::read_to_string(state_dir.pid_file())
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&pid| is_process_alive(pid));

    match running_pid {
        Some(pid) => println!("autoresume is running (pid {pid})"),
        None => println!("autoresume is not running"),
    }

    match queue::load(&state_dir.queue_file()) {
        Ok(q) => {
            let pending = q.queue.iter().filter(|e| !e.status.is_terminal()).count();
            println!("queue: {} pending, {} total, {} sessions", pending, q.queue.len(), q.sessions.len());
            if let Some(last_hook_run) = q.last_hook_run {
                println!("last hook run: {last_hook_run}");
            }
            for event in &q.queue {
                println!(
                    "  [{:?}] reset at {} ({}), source={:?}",
                    event.status, event.reset_time, event.timezone, event.source
                );
            }
        }
        Err(e) => {
            eprintln!("error: failed to load queue: {e:#}");
            return 1;
        }
    }

    0
}
