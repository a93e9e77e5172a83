// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup: a file-backed subscriber for the supervisor (`start`),
//! a stdout subscriber for one-shot subcommands.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::paths::StateDir;
use crate::supervisor::RotationLayer;

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Initialize a file-backed subscriber writing to `daemon.log`, with
/// call-counted rotation layered on top. Returns the worker guard, which
/// must be held for the process lifetime to flush buffered writes.
pub fn init_file_logging(
    state_dir: &StateDir,
    log_level: &str,
    json: bool,
    max_log_size_mb: u64,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    state_dir.ensure_exists()?;
    let log_path = state_dir.log_file();
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().ok_or_else(|| anyhow::anyhow!("log path has no parent"))?,
        log_path.file_name().ok_or_else(|| anyhow::anyhow!("log path has no file name"))?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let rotation_layer = RotationLayer::new(log_path, state_dir.rotated_log_file(), max_log_size_mb);
    let filter = env_filter(log_level);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(non_blocking).json())
            .with(rotation_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(non_blocking))
            .with(rotation_layer)
            .init();
    }

    Ok(guard)
}

/// Initialize a stdout subscriber for one-shot subcommands (`status`,
/// `config show`, ...). Uses `try_init` so repeated calls across tests
/// don't panic.
pub fn init_stdout_logging(log_level: &str, json: bool) {
    let filter = env_filter(log_level);
    let result = if json {
        fmt::fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt::fmt().with_env_filter(filter).try_init()
    };
    drop(result);
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
