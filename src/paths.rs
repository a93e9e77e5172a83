// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout under the per-user state directory.
//!
//! `<home>/.autoresume/auto-resume/` holds the queue document, PID file,
//! logs, heartbeat, crash-loop marker, and config — the same single
//! well-known directory convention the command surface in §6 assumes.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Resolve the state directory, honoring `AUTORESUME_STATE_DIR` for tests
    /// and containerized deployments before falling back to the OS home dir.
    pub fn resolve() -> anyhow::Result<Self> {
        if let Ok(dir) = std::env::var("AUTORESUME_STATE_DIR") {
            return Ok(Self::at(PathBuf::from(dir)));
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("could not resolve home directory"))?;
        Ok(Self::at(home.join(".autoresume").join("auto-resume")))
    }

    pub fn at(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_exists(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn queue_file(&self) -> PathBuf {
        self.root.join("status.json")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.root.join("daemon.pid")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("daemon.log")
    }

    pub fn rotated_log_file(&self) -> PathBuf {
        self.root.join("daemon.log.1")
    }

    pub fn heartbeat_file(&self) -> PathBuf {
        self.root.join("heartbeat.json")
    }

    pub fn last_start_file(&self) -> PathBuf {
        self.root.join(".last-start")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
