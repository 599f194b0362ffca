//! Transient Notifications
//!
//! Every flow turns its own failures (and notable successes) into short-lived
//! notifications instead of returning errors to the caller.

use chrono::{DateTime, Duration, Utc};

/// How long a notification stays visible, in seconds
pub const TOAST_DURATION_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A single user-facing message
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.raised_at >= Duration::seconds(TOAST_DURATION_SECS)
    }

    pub fn icon(&self) -> &'static str {
        match self.kind {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✕",
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon(), self.message)
    }
}

/// Collects notifications raised by the flows
#[derive(Debug, Default)]
pub struct Notifier {
    queue: Vec<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message.into());
    }

    fn push(&mut self, kind: NotificationKind, message: String) {
        match kind {
            NotificationKind::Success => tracing::info!(%message, "notification"),
            NotificationKind::Error => tracing::warn!(%message, "notification"),
        }
        self.queue.push(Notification {
            kind,
            message,
            raised_at: Utc::now(),
        });
    }

    /// Notifications still visible at `now`
    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Notification> {
        self.queue.iter().filter(move |n| !n.is_expired(now))
    }

    /// Drop notifications that have auto-dismissed
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.queue.retain(|n| !n.is_expired(now));
    }

    /// Take everything raised so far
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }

    pub fn last(&self) -> Option<&Notification> {
        self.queue.last()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
