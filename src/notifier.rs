// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification capability.
//!
//! The legacy behavior this replaces loaded optional features (notifications,
//! analytics, dashboard) defensively and degraded to no-ops when their
//! prerequisites were missing. Here that's a capability interface with a
//! no-op default, and a richer implementation plugged in at startup when a
//! display is available — no dynamic loading or try/catch-per-feature.

/// Desktop notification capability the supervisor depends on.
pub trait Notifier: Send + Sync {
    /// "Manual intervention needed" — emitted when all delivery tiers are
    /// exhausted for an event.
    fn notify_delivery_failed(&self, message: &str);
}

/// Default implementation: does nothing. Selected when no display is
/// available (headless service, container, SSH session without X/Wayland).
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_delivery_failed(&self, message: &str) {
        tracing::info!("notifier: (no-op) {message}");
    }
}

/// Desktop notification via `notify-rust`, selected when a display is
/// present.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify_delivery_failed(&self, message: &str) {
        let result = notify_rust::Notification::new()
            .summary("autoresume: manual intervention needed")
            .body(message)
            .show();
        if let Err(e) = result {
            tracing::warn!("desktop notification failed, falling back to log: {e}");
        }
    }
}

/// Whether a graphical display appears to be present, used at startup to
/// choose between [`DesktopNotifier`] and [`NoopNotifier`].
pub fn display_available() -> bool {
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

/// Select the richest notifier available in the current environment.
pub fn select() -> Box<dyn Notifier> {
    if display_available() {
        Box::new(DesktopNotifier)
    } else {
        Box::new(NoopNotifier)
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
