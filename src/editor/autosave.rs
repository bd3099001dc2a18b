// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Debounced background save.
//!
//! Every project change restarts the timer; the save fires once the project
//! has been quiet for the whole delay. The caller supplies the clock so the
//! debouncer stays deterministic.

use std::time::{Duration, Instant};

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
    last_revision: Option<u64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            last_revision: None,
        }
    }

    /// Restart the timer.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Restart the timer if `revision` differs from the last one observed.
    /// The first observation only records the revision.
    pub fn observe(&mut self, revision: u64, now: Instant) {
        if self.last_revision.is_some_and(|previous| previous != revision) {
            self.touch(now);
        }
        self.last_revision = Some(revision);
    }

    /// Returns `true` exactly once per quiet period, when the deadline has
    /// passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the pending save, if one is pending.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapid_edits_coalesce_into_one_save() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(1000));
        debouncer.observe(0, start);

        let mut fired = 0;
        for step in 1..=20u64 {
            let now = start + Duration::from_millis(step * 100);
            debouncer.observe(step, now);
            if debouncer.poll(now) {
                fired += 1;
            }
        }
        assert_eq!(fired, 0);

        let quiet = start + Duration::from_millis(2000 + 1000);
        assert!(debouncer.poll(quiet));
        assert!(!debouncer.poll(quiet + Duration::from_secs(5)));
    }

    #[test]
    fn test_first_observation_does_not_schedule() {
        let now = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.observe(42, now);
        assert!(!debouncer.is_pending());
        debouncer.observe(42, now);
        assert!(!debouncer.is_pending());
        debouncer.observe(43, now);
        assert_eq!(debouncer.remaining(now), Some(DEFAULT_AUTOSAVE_DELAY));
    }
}
