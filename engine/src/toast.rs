//! Transient, non-blocking notifications.
//!
//! Toasts auto-close after [`TOAST_LIFETIME`]. Pushing a toast identical to
//! one already on screen refreshes it rather than stacking a duplicate.

use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    level: ToastLevel,
    text: String,
    expires_at: Instant,
}

impl Toast {
    #[must_use]
    pub fn level(&self) -> ToastLevel {
        self.level
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

#[derive(Debug)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    lifetime: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(TOAST_LIFETIME)
    }
}

impl ToastQueue {
    #[must_use]
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, level: ToastLevel, text: impl Into<String>, now: Instant) {
        let text = text.into();
        // Refresh in place and move to the end so it reads as newest.
        self.toasts
            .retain(|toast| !(toast.level == level && toast.text == text));
        self.toasts.push(Toast {
            level,
            text,
            expires_at: now + self.lifetime,
        });
    }

    /// Drop toasts whose lifetime has elapsed.
    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    /// Toasts on screen, newest last.
    #[must_use]
    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}
