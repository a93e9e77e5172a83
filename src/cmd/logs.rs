// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `logs [--lines N]` — tail the log file.

use crate::paths::StateDir;

pub fn run(state_dir: StateDir, lines: usize) -> i32 {
    let contents = match std::fs::read_to_string(state_dir.log_file()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to read log file: {e}");
            return 1;
        }
    };

    let all_lines: Vec<&str> = contents.lines().collect();
    let start = all_lines.len().saturating_sub(lines);
    for line in &all_lines[start..] {
        println!("{line}");
    }
    0
}
