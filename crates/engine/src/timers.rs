// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The timer wheel: a flat deadline table keyed by `TimerKind`. At most one
//! kill timer and one pid-discovery timer can be armed per job at a time, so
//! `TimerKind` alone is a sufficient key — no separate `TimerId` allocation
//! is needed to later cancel a specific timer.

use oj_core::{Clock, TimerKind};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct TimerWheel {
    deadlines: HashMap<TimerKind, Instant>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, clock: &impl Clock, kind: TimerKind, duration: Duration) {
        self.deadlines.insert(kind, clock.now() + duration);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.deadlines.remove(&kind);
    }

    /// Remove and return every timer whose deadline has passed.
    pub fn expired(&mut self, clock: &impl Clock) -> Vec<TimerKind> {
        let now = clock.now();
        let fired: Vec<TimerKind> =
            self.deadlines.iter().filter(|(_, deadline)| **deadline <= now).map(|(k, _)| *k).collect();
        for kind in &fired {
            self.deadlines.remove(kind);
        }
        fired
    }

    /// Shortest remaining duration until the next timer fires, if any are armed.
    pub fn next_deadline(&self, clock: &impl Clock) -> Option<Duration> {
        let now = clock.now();
        self.deadlines.values().map(|d| d.saturating_duration_since(now)).min()
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
