// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stop` — signal a running supervisor and wait for it to exit.

use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::delivery::process::is_process_alive;
use crate::paths::StateDir;

const GRACE_PERIOD: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub async fn run(state_dir: StateDir) -> i32 {
    let pid_file = state_dir.pid_file();
    let Ok(contents) = std::fs::read_to_string(&pid_file) else {
        println!("autoresume is not running (no pid file)");
        return 0;
    };
    let Ok(pid) = contents.trim().parse::<u32>() else {
        eprintln!("error: pid file is corrupt");
        return 1;
    };
    if !is_process_alive(pid) {
        println!("autoresume is not running (stale pid file)");
        let _ = std::fs::remove_file(&pid_file);
        return 0;
    }

    if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_err() {
        eprintln!("error: failed to signal pid {pid}");
        return 1;
    }

    let deadline = tokio::time::Instant::now() + GRACE_PERIOD;
    while tokio::time::Instant::now() < deadline {
        if !is_process_alive(pid) {
            println!("stopped");
            return 0;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    println!("autoresume did not stop within {GRACE_PERIOD:?}, sending SIGKILL");
    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
    0
}
