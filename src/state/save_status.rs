//! Transient status messages for the save lifecycle.

use std::time::Duration;
use web_time::Instant;

use crate::constants::SUCCESS_STATUS_TTL;

/// Severity of a status message, for styling by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// A status message and when it was posted.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveStatus {
    pub kind: StatusKind,
    pub message: String,
    pub posted_at: Instant,
}

/// Holds the latest save status.
///
/// Success messages expire after a short time; info and error messages stay
/// until the next save attempt replaces them.
#[derive(Debug, Clone)]
pub struct SaveStatusTracker {
    current: Option<SaveStatus>,
    success_ttl: Duration,
}

impl Default for SaveStatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveStatusTracker {
    pub fn new() -> Self {
        Self {
            current: None,
            success_ttl: SUCCESS_STATUS_TTL,
        }
    }

    fn post(&mut self, kind: StatusKind, message: String) {
        log::trace!("Save status: {:?} {}", kind, message);
        self.current = Some(SaveStatus {
            kind,
            message,
            posted_at: Instant::now(),
        });
    }

    pub fn saving(&mut self) {
        self.post(StatusKind::Info, "Saving...".to_string());
    }

    pub fn succeeded(&mut self) {
        self.post(
            StatusKind::Success,
            "Annotations saved successfully!".to_string(),
        );
    }

    pub fn failed(&mut self, reason: &str) {
        self.post(
            StatusKind::Error,
            format!("Failed to save annotations: {reason}"),
        );
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Status visible right now.
    pub fn current(&self) -> Option<&SaveStatus> {
        self.current_at(Instant::now())
    }

    /// Status visible at `now`.
    pub fn current_at(&self, now: Instant) -> Option<&SaveStatus> {
        self.current.as_ref().filter(|status| {
            status.kind != StatusKind::Success
                || now.saturating_duration_since(status.posted_at) < self.success_ttl
        })
    }
}
