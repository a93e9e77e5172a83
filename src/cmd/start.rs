// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `start` / `monitor` — launch the supervisor in the foreground.

use crate::config::Configuration;
use crate::error::ErrorKind;
use crate::paths::StateDir;

pub async fn run(state_dir: StateDir, http: Option<String>) -> i32 {
    let mut config = match Configuration::load(&state_dir.config_file()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to load configuration: {e:#}");
            return 1;
        }
    };
    if let Some(addr) = http {
        config.interface_addr = Some(addr);
    }

    match crate::supervisor::run(state_dir, config).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(app_err) = e.downcast_ref::<crate::error::AppError>() {
                eprintln!("error: {app_err}");
                return app_err.kind.exit_code();
            }
            eprintln!("error: {e:#}");
            ErrorKind::Fatal.exit_code()
        }
    }
}
