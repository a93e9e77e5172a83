// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tier 3: platform-native GUI keystroke injection, behind a common
//! interface with one variant per platform. Does NOT work when the
//! display is locked — a known limitation that justifies tiers 1 and 2.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

use super::keystrokes::NudgeStep;
use super::TierOutcome;

/// An opaque platform window handle, as returned by `windows_for_pid`.
pub type WindowId = u64;

pub async fn probe_available(session_pid: Option<u32>) -> bool {
    #[cfg(target_os = "linux")]
    {
        linux::probe_available(session_pid).await
    }
    #[cfg(target_os = "macos")]
    {
        macos::probe_available(session_pid).await
    }
    #[cfg(target_os = "windows")]
    {
        windows::probe_available(session_pid).await
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = session_pid;
        false
    }
}

pub async fn attempt(session_pid: Option<u32>, steps: &[NudgeStep]) -> TierOutcome {
    #[cfg(target_os = "linux")]
    {
        linux::attempt(session_pid, steps).await
    }
    #[cfg(target_os = "macos")]
    {
        macos::attempt(session_pid, steps).await
    }
    #[cfg(target_os = "windows")]
    {
        windows::attempt(session_pid, steps).await
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = (session_pid, steps);
        TierOutcome::Unavailable("native injection not implemented on this platform".to_string())
    }
}
