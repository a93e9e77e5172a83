// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument surface and the JSON-backed runtime [`Configuration`] document.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Supervisor for automatically resuming an AI coding assistant after a
/// provider-imposed rate limit resets.
#[derive(Debug, Parser)]
#[command(name = "autoresumed", version, about)]
pub struct Cli {
    /// Override the per-user state directory (tests, containers).
    #[arg(long, env = "AUTORESUME_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Log format (json or text).
    #[arg(long, env = "AUTORESUME_LOG_FORMAT", default_value = "json", global = true)]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "AUTORESUME_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Launch the supervisor in the foreground.
    Start {
        /// Bind the local HTTP/WebSocket interface to this loopback address
        /// (e.g. `127.0.0.1:4317`), overriding `interface_addr` in config.
        #[arg(long)]
        http: Option<String>,
    },
    /// Alias for `start`.
    Monitor {
        #[arg(long)]
        http: Option<String>,
    },
    /// Stop a running supervisor.
    Stop,
    /// Print whether the daemon is running, plus the current queue summary.
    Status,
    /// Stop then start the supervisor.
    Restart,
    /// Run a synthetic countdown of `seconds` and execute delivery.
    Test {
        seconds: u64,
    },
    /// Clear the queue document.
    Reset,
    /// Tail the log file.
    Logs {
        #[arg(long, default_value = "100")]
        lines: usize,
    },
    /// Show or modify configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Internal: read a transcript-analyzer hook payload from stdin.
    #[command(hide = true)]
    Hook,
}

#[derive(Debug, clap::Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Set a single configuration key.
    Set {
        key: String,
        value: String,
    },
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid --log-format {other:?}, expected json or text"),
        }
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!("invalid --log-level {other:?}"),
        }
        Ok(())
    }
}

/// Runtime-reloadable configuration document (`config.json`), per §3.
///
/// Missing keys take the defaults below; unknown keys are ignored by
/// `serde`'s default deserialization behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub resume_prompt: String,
    pub check_interval_ms: u64,
    pub post_reset_delay_sec: u64,
    pub max_retries: u32,
    pub retry_backoff_sec: Vec<u64>,
    pub verification_window_sec: u64,
    pub active_verification_timeout_ms: u64,
    pub active_verification_poll_ms: u64,
    pub transcript_polling_enabled: bool,
    pub max_log_size_mb: u64,
    pub memory_ceiling_mb: u64,
    /// Loopback address for the optional HTTP/WebSocket interface
    /// (`127.0.0.1:PORT`). `None` leaves both servers disabled, the default.
    pub interface_addr: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            resume_prompt: "continue".to_string(),
            check_interval_ms: 5000,
            post_reset_delay_sec: 10,
            max_retries: 4,
            retry_backoff_sec: vec![10, 20, 40, 60],
            verification_window_sec: 90,
            active_verification_timeout_ms: 30_000,
            active_verification_poll_ms: 2_000,
            transcript_polling_enabled: true,
            max_log_size_mb: 1,
            memory_ceiling_mb: 200,
            interface_addr: None,
        }
    }
}

impl Configuration {
    /// Backoff for retry index `i`, clamped to the last configured value.
    pub fn backoff_for(&self, retry_index: usize) -> std::time::Duration {
        let secs = self
            .retry_backoff_sec
            .get(retry_index)
            .or_else(|| self.retry_backoff_sec.last())
            .copied()
            .unwrap_or(60);
        std::time::Duration::from_secs(secs)
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Write atomically (write to sibling temp file, rename), per the
    /// filesystem contract every document writer in this crate follows.
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::queue::atomic_write(path, json.as_bytes())
    }

    /// Apply a single `key=value` override; used by `config set`. Unknown
    /// keys are rejected (distinct from the read-side "unknown keys
    /// ignored" policy, which protects forward-compatible readers, not
    /// typo'd writers).
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "resume_prompt" => self.resume_prompt = value.to_string(),
            "check_interval_ms" => self.check_interval_ms = value.parse()?,
            "post_reset_delay_sec" => self.post_reset_delay_sec = value.parse()?,
            "max_retries" => self.max_retries = value.parse()?,
            "retry_backoff_sec" => {
                self.retry_backoff_sec =
                    value.split(',').map(|s| s.trim().parse()).collect::<Result<_, _>>()?;
            }
            "verification_window_sec" => self.verification_window_sec = value.parse()?,
            "active_verification_timeout_ms" => self.active_verification_timeout_ms = value.parse()?,
            "active_verification_poll_ms" => self.active_verification_poll_ms = value.parse()?,
            "transcript_polling_enabled" => self.transcript_polling_enabled = value.parse()?,
            "max_log_size_mb" => self.max_log_size_mb = value.parse()?,
            "memory_ceiling_mb" => self.memory_ceiling_mb = value.parse()?,
            "interface_addr" => {
                self.interface_addr = match value {
                    "" | "none" | "disabled" => None,
                    addr => {
                        addr.parse::<std::net::SocketAddr>()?;
                        Some(addr.to_string())
                    }
                };
            }
            other => anyhow::bail!("unknown configuration key {other:?}"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
