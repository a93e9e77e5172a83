// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `config` / `config set <key> <value>` — show or modify configuration.

use crate::config::{Configuration, ConfigCommand};
use crate::paths::StateDir;

pub fn run(state_dir: StateDir, command: ConfigCommand) -> i32 {
    let config_path = state_dir.config_file();
    let mut config = match Configuration::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to load configuration: {e:#}");
            return 1;
        }
    };

    match command {
        ConfigCommand::Show => {
            match serde_json::to_string_pretty(&config) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("error: failed to serialize configuration: {e}");
                    return 1;
                }
            }
            0
        }
        ConfigCommand::Set { key, value } => match config.set(&key, &value) {
            Ok(()) => match config.save(&config_path) {
                Ok(()) => {
                    println!("{key} = {value}");
                    0
                }
                Err(e) => {
                    eprintln!("error: failed to save configuration: {e:#}");
                    1
                }
            },
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
    }
}
