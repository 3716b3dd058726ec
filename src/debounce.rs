//! Logical trailing-edge debouncer.
//!
//! The debouncer owns no thread or timer; the caller feeds it the current
//! [`Instant`] and asks whether the pending action has settled.

use std::time::{Duration, Instant};

/// Coalesces bursts of triggers into one action after input settles.
///
/// Every [`trigger`](Self::trigger) restarts the delay. The action is due
/// once `delay` has passed since the last trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Creates an idle debouncer that fires `delay` after the last trigger.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules the action, pushing back any earlier deadline.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once when the deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Clears the pending action, returning whether one was pending.
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Drops the pending action.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(200);

    #[test]
    fn fires_once_after_settling() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        assert!(!debouncer.poll(start + DELAY));

        debouncer.trigger(start);
        assert!(debouncer.is_pending());
        assert!(!debouncer.poll(start + Duration::from_millis(199)));
        assert!(debouncer.poll(start + DELAY));
        assert!(!debouncer.poll(start + DELAY * 2), "fires only once");
    }

    #[test]
    fn retrigger_restarts_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger(start);
        debouncer.trigger(start + Duration::from_millis(150));
        assert!(!debouncer.poll(start + Duration::from_millis(300)));
        assert!(debouncer.poll(start + Duration::from_millis(350)));
    }

    #[test]
    fn flush_and_cancel() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        assert!(!debouncer.flush());
        debouncer.trigger(now);
        assert!(debouncer.flush());
        assert!(!debouncer.is_pending());

        debouncer.trigger(now);
        debouncer.cancel();
        assert!(!debouncer.poll(now + DELAY));
    }
}
