//! Quiet-period debouncing for keystroke-driven inputs.
//!
//! A [`Debouncer`] holds the latest raw value of one input and forwards it
//! only once the input has been quiet for the configured interval, and only
//! when it differs from the value forwarded last. It owns no timer: the
//! caller asks for [`Debouncer::deadline`] and polls once it has passed.

use std::time::Duration;
use tokio::time::Instant;

/// Default quiet interval for free-text inputs.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    /// Latest raw value, forwarded or not
    current: T,
    /// Last value handed downstream
    forwarded: T,
    deadline: Option<Instant>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, quiet: Duration) -> Self {
        Self {
            quiet,
            current: initial.clone(),
            forwarded: initial,
            deadline: None,
        }
    }

    /// Record a raw value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.current = value;
        self.deadline = Some(now + self.quiet);
    }

    /// Forward the pending value if the quiet period has elapsed.
    ///
    /// Returns `None` while still waiting, when nothing is pending, or when
    /// the settled value equals the last forwarded one.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                if self.current == self.forwarded {
                    None
                } else {
                    self.forwarded = self.current.clone();
                    Some(self.forwarded.clone())
                }
            }
            _ => None,
        }
    }

    /// Overwrite the value without emitting and cancel any pending change.
    pub fn reset(&mut self, value: T) {
        self.current = value.clone();
        self.forwarded = value;
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The value most recently forwarded downstream.
    pub fn value(&self) -> &T {
        &self.forwarded
    }

    /// The raw value as last typed, which may not have settled yet.
    pub fn raw(&self) -> &T {
        &self.current
    }
}
