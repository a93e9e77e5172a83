// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reset` — clear the queue document.

use crate::paths::StateDir;
use crate::queue;

pub fn run(state_dir: StateDir) -> i32 {
    match queue::clear(&state_dir.queue_file()) {
        Ok(()) => {
            println!("queue cleared");
            0
        }
        Err(e) => {
            eprintln!("error: failed to clear queue: {e:#}");
            1
        }
    }
}
