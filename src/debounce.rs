//! Quiet-period debouncing for search input.
//!
//! Every keystroke replaces the pending value and restarts the quiet period.
//! The value is released once no input arrived for the whole period. Time is
//! passed in explicitly, so callers decide which clock drives the debouncer.
use std::time::{Duration, Instant};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Debouncer {
            quiet,
            pending: None,
        }
    }

    /// Record new input at time `now`
    pub fn input(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until the pending value settles
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, at)| (*at + self.quiet).saturating_duration_since(now))
    }

    /// Take the pending value if the quiet period has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.remaining(now) {
            Some(left) if left.is_zero() => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop pending input, e.g. when filters are cleared explicitly
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.input("m", start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), Some("m"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn new_input_restarts_the_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.input("m", start);
        debouncer.input("ma", start + Duration::from_millis(200));
        debouncer.input("mac", start + Duration::from_millis(400));
        assert_eq!(debouncer.poll(start + Duration::from_millis(650)), None);
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(650)),
            Some(Duration::from_millis(50))
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(700)), Some("mac"));
    }

    #[test]
    fn cancel_drops_input() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.input(1, start);
        debouncer.cancel();
        assert_eq!(debouncer.remaining(start), None);
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
