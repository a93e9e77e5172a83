// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Self-supervision: single-instance PID lock, heartbeat, memory watchdog,
//! crash-loop throttle, log rotation, and the signal-driven shutdown that
//! ties the watcher, scheduler, and delivery orchestrator into one
//! long-running process.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, System};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::{Context, Layer};

use crate::config::Configuration;
use crate::delivery::Orchestrator;
use crate::error::{AppError, ErrorKind};
use crate::iface::{self, AppState};
use crate::paths::StateDir;
use crate::scheduler::Scheduler;
use crate::watcher::{QueueWatcher, TranscriptPoller};

/// Held for the supervisor's lifetime; the PID file is released (unlinked)
/// only on graceful shutdown.
pub struct PidLock {
    file: std::fs::File,
    path: PathBuf,
}

/// Acquire single-instance ownership of the PID file. If an existing PID
/// file's process is live, returns `SingleInstanceConflict`. A stale PID
/// file (process gone) is removed and startup continues.
pub fn acquire_pid_lock(path: &Path) -> anyhow::Result<PidLock> {
    if let Ok(contents) = std::fs::read_to_string(path) {
        if let Ok(existing_pid) = contents.trim().parse::<u32>() {
            if crate::delivery::process::is_process_alive(existing_pid) {
                anyhow::bail!(AppError::new(
                    ErrorKind::SingleInstanceConflict,
                    format!("supervisor already running with pid {existing_pid}")
                ));
            }
        }
        let _ = std::fs::remove_file(path);
    }

    let file = std::fs::OpenOptions::new().create(true).write(true).truncate(false).open(path)?;
    file.try_lock_exclusive().map_err(|_| {
        AppError::new(ErrorKind::SingleInstanceConflict, "another process holds the PID file lock".to_string())
    })?;

    file.set_len(0)?;
    use std::io::Write;
    (&file).write_all(std::process::id().to_string().as_bytes())?;
    file.sync_all()?;

    Ok(PidLock { file, path: path.to_path_buf() })
}

impl PidLock {
    pub fn release(self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Crash-loop throttle: if the last start was within 30 seconds, sleep out
/// the remainder rather than exiting — exiting would feed the external
/// process manager's restart counter and make the loop worse.
pub async fn throttle_crash_loop(path: &Path) {
    const MIN_INTERVAL: Duration = Duration::from_secs(30);

    if let Ok(contents) = std::fs::read_to_string(path) {
        if let Ok(last_start) = contents.trim().parse::<i64>() {
            let elapsed = Utc::now().timestamp() - last_start;
            if elapsed >= 0 && (elapsed as u64) < MIN_INTERVAL.as_secs() {
                let remaining = MIN_INTERVAL - Duration::from_secs(elapsed as u64);
                tracing::warn!("crash-loop throttle: started {elapsed}s ago, sleeping {remaining:?} before proceeding");
                tokio::time::sleep(remaining).await;
            }
        }
    }
    let _ = crate::queue::atomic_write(path, Utc::now().timestamp().to_string().as_bytes());
}

#[derive(Debug, Serialize, Deserialize)]
struct Heartbeat {
    timestamp: i64,
    pid: u32,
}

async fn run_heartbeat(path: PathBuf, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = interval.tick() => {}
        }
        let heartbeat = Heartbeat { timestamp: Utc::now().timestamp(), pid: std::process::id() };
        if let Ok(json) = serde_json::to_vec(&heartbeat) {
            if let Err(e) = crate::queue::atomic_write(&path, &json) {
                tracing::warn!("heartbeat write failed: {e:#}");
            }
        }
    }
}

async fn run_memory_watchdog(ceiling_mb: u64, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = interval.tick() => {}
        }
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
        let Some(process) = system.process(pid) else { continue };
        let rss_mb = process.memory() / (1024 * 1024);
        if rss_mb > ceiling_mb {
            tracing::error!("memory watchdog: {rss_mb} MiB exceeds ceiling {ceiling_mb} MiB, exiting");
            std::process::exit(ErrorKind::MemoryCeilingExceeded.exit_code());
        }
    }
}

const MAX_ROTATION_SIZE_DEFAULT_MIB: u64 = 1;

fn rotate_log_if_needed(log_path: &Path, rotated_path: &Path, max_size_mb: u64) {
    let max_bytes = max_size_mb.max(1) * 1024 * 1024;
    let Ok(metadata) = std::fs::metadata(log_path) else { return };
    if metadata.len() < max_bytes {
        return;
    }
    let _ = std::fs::rename(log_path, rotated_path);
}

/// A `tracing_subscriber` layer that counts emitted events and checks log
/// rotation every 100 calls, per the rotation cadence.
pub struct RotationLayer {
    counter: AtomicU64,
    log_path: PathBuf,
    rotated_path: PathBuf,
    max_size_mb: u64,
}

impl RotationLayer {
    pub fn new(log_path: PathBuf, rotated_path: PathBuf, max_size_mb: u64) -> Self {
        Self { counter: AtomicU64::new(0), log_path, rotated_path, max_size_mb }
    }
}

impl<S> Layer<S> for RotationLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 100 == 0 {
            rotate_log_if_needed(&self.log_path, &self.rotated_path, self.max_size_mb);
        }
    }
}

impl Default for RotationLayer {
    fn default() -> Self {
        Self::new(PathBuf::new(), PathBuf::new(), MAX_ROTATION_SIZE_DEFAULT_MIB)
    }
}

/// Bind a loopback socket held for the process lifetime so a service
/// manager without a controlling terminal sees a live I/O registration
/// even when no other I/O is pending. Reused by the external interface
/// layer when local servers are enabled; otherwise held idle.
pub async fn bind_keepalive() -> anyhow::Result<tokio::net::TcpListener> {
    Ok(tokio::net::TcpListener::bind("127.0.0.1:0").await?)
}

/// Run the supervisor to completion: acquires the PID lock, starts the
/// heartbeat/watchdog/rotation-backed logging, wires the queue watcher and
/// transcript poller into the scheduler, and blocks until SIGINT/SIGTERM.
pub async fn run(state_dir: StateDir, config: Configuration) -> anyhow::Result<i32> {
    state_dir.ensure_exists()?;
    throttle_crash_loop(&state_dir.last_start_file()).await;

    let pid_lock = acquire_pid_lock(&state_dir.pid_file())?;
    let shutdown = CancellationToken::new();

    let queue_path = state_dir.queue_file();
    crate::queue::load(&queue_path)?; // ensure a valid document exists before watchers start

    let _keepalive = bind_keepalive().await?;

    let heartbeat_task = tokio::spawn(run_heartbeat(state_dir.heartbeat_file(), shutdown.clone()));
    let watchdog_task = tokio::spawn(run_memory_watchdog(config.memory_ceiling_mb, shutdown.clone()));

    let (scheduler, _ticks) = Scheduler::new(queue_path.clone(), config.clone());
    let orchestrator = Arc::new(Orchestrator::new(config.clone()));
    let notifier: Arc<dyn crate::notifier::Notifier> = Arc::from(crate::notifier::select());

    let (queue_tx, mut queue_rx) = tokio::sync::mpsc::channel(16);
    let queue_watcher = QueueWatcher::new(queue_path.clone(), Duration::from_millis(config.check_interval_ms));
    let watcher_task = tokio::spawn(queue_watcher.run(queue_tx, shutdown.clone()));

    let poller_task = config.transcript_polling_enabled.then(|| {
        let root = dirs::home_dir().unwrap_or_default().join(".autoresume").join("projects");
        let poller = TranscriptPoller::new(root);
        tokio::spawn(poller.run(queue_path.clone(), shutdown.clone()))
    });

    scheduler.ensure_running(Arc::clone(&orchestrator), Arc::clone(&notifier), shutdown.clone());

    let iface_task = match &config.interface_addr {
        Some(addr) => match addr.parse::<std::net::SocketAddr>() {
            Ok(addr) => {
                let state = Arc::new(AppState {
                    queue_path: queue_path.clone(),
                    scheduler: Arc::clone(&scheduler),
                    orchestrator: Arc::clone(&orchestrator),
                });
                let iface_shutdown = shutdown.clone();
                Some(tokio::spawn(async move {
                    if let Err(e) = iface::serve(addr, state, iface_shutdown).await {
                        tracing::error!("local interface server exited: {e:#}");
                    }
                }))
            }
            Err(e) => {
                tracing::warn!("invalid interface_addr {addr:?}, local interface disabled: {e}");
                None
            }
        },
        None => None,
    };

    let dispatch_shutdown = shutdown.clone();
    let dispatch_scheduler = Arc::clone(&scheduler);
    let dispatch_orchestrator = Arc::clone(&orchestrator);
    let dispatch_notifier = Arc::clone(&notifier);
    let dispatch_task = tokio::spawn(async move {
        while queue_rx.recv().await.is_some() {
            dispatch_scheduler.ensure_running(
                Arc::clone(&dispatch_orchestrator),
                Arc::clone(&dispatch_notifier),
                dispatch_shutdown.clone(),
            );
        }
    });

    wait_for_shutdown_signal(shutdown.clone()).await;

    watcher_task.abort();
    if let Some(task) = poller_task {
        task.abort();
    }
    if let Some(task) = iface_task {
        task.abort();
    }
    dispatch_task.abort();
    heartbeat_task.abort();
    watchdog_task.abort();

    let _ = std::fs::remove_file(state_dir.heartbeat_file());
    pid_lock.release();

    Ok(0)
}

/// Wait for SIGTERM/SIGINT and cancel `shutdown` for a graceful stop. A
/// second signal forces an immediate exit, in case a delivery tier attempt
/// is wedged on a blocking subprocess call.
#[cfg(unix)]
async fn wait_for_shutdown_signal(shutdown: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(_) => return,
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sigint.recv() => tracing::info!("received SIGINT"),
    }
    shutdown.cancel();

    tokio::select! {
        _ = sigterm.recv() => tracing::warn!("received signal again, forcing exit"),
        _ = sigint.recv() => tracing::warn!("received signal again, forcing exit"),
    }
    std::process::exit(130);
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    shutdown.cancel();
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
