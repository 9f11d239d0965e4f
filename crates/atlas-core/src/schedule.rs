// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Frame-driven scheduling primitives.
//!
//! The UI runs on a single cooperative loop, so delayed work is modelled as
//! deadlines that the owner polls every frame. Every primitive here is a
//! plain value with explicit `cancel`/`flush` operations; time is always
//! passed in, never read from a global clock.

use std::time::{Duration, Instant};

/// Coalesces a burst of values into the last one, released after a quiet
/// period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a value and push the deadline out by the full delay.
    pub fn call(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Release the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

/// Lets at most one update through per interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true (and starts a new interval) when an update may proceed.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Cancellable one-shot timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn schedule(&mut self, at: Instant) {
        self.at = Some(at);
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// True once when the deadline has passed; the timer disarms itself.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

/// Exponential backoff for retrying surface setup.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    attempts: u32,
}

impl Backoff {
    /// Default first retry delay.
    pub const INITIAL: Duration = Duration::from_millis(150);
    /// Default delay cap.
    pub const MAX: Duration = Duration::from_secs(5);

    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
            attempts: 0,
        }
    }

    /// Delay before the next attempt; doubles up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        self.attempts += 1;
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
        self.attempts = 0;
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Self::INITIAL, Self::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_debouncer_coalesces_to_last_value() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.call(2021, t0);
        debouncer.call(2020, t0 + ms(100));
        debouncer.call(2019, t0 + ms(200));

        assert_eq!(debouncer.poll(t0 + ms(300)), None);
        assert_eq!(debouncer.poll(t0 + ms(499)), None);
        assert_eq!(debouncer.poll(t0 + ms(500)), Some(2019));
        assert_eq!(debouncer.poll(t0 + ms(900)), None);
    }

    #[test]
    fn test_debouncer_flush_and_cancel() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.call("a", t0);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.flush(), Some("a"));
        assert!(!debouncer.is_pending());

        debouncer.call("b", t0);
        debouncer.cancel();
        assert_eq!(debouncer.poll(t0 + ms(1000)), None);
        assert_eq!(debouncer.flush(), None);
    }

    #[test]
    fn test_throttle() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(ms(8));
        assert!(throttle.try_acquire(t0));
        assert!(!throttle.try_acquire(t0 + ms(4)));
        assert!(throttle.try_acquire(t0 + ms(8)));
        throttle.reset();
        assert!(throttle.try_acquire(t0 + ms(9)));
    }

    #[test]
    fn test_deadline_fires_once() {
        let t0 = Instant::now();
        let mut deadline = Deadline::default();
        deadline.schedule(t0 + ms(500));
        assert!(!deadline.fire(t0 + ms(100)));
        assert!(deadline.fire(t0 + ms(500)));
        assert!(!deadline.fire(t0 + ms(600)));

        deadline.schedule(t0);
        deadline.cancel();
        assert!(!deadline.fire(t0 + ms(600)));
    }

    #[test]
    fn test_backoff_doubles_to_cap() {
        let mut backoff = Backoff::new(ms(150), ms(1000));
        assert_eq!(backoff.next_delay(), ms(150));
        assert_eq!(backoff.next_delay(), ms(300));
        assert_eq!(backoff.next_delay(), ms(600));
        assert_eq!(backoff.next_delay(), ms(1000));
        assert_eq!(backoff.next_delay(), ms(1000));
        assert_eq!(backoff.attempts(), 5);
        backoff.reset();
        assert_eq!(backoff.next_delay(), ms(150));
    }
}
