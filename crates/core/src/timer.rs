// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifiers for the two timer kinds the state machine arms:
//! the kill-timer (TERM → KILL escalation) and the pid-discovery timer
//! (waiting for a `daemon` job to report its pid).

use crate::job::JobId;

crate::define_id! {
    /// Unique identifier for a scheduled timer instance.
    pub struct TimerId("tmr-");
}

/// Typed view of what a `TimerId` is for, keyed off the owning job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Escalates `SIGTERM` to `SIGKILL` once `kill_timeout` elapses.
    Kill(JobId),
    /// Fails a `daemon` job if it hasn't reported a pid within `pid_timeout`.
    PidDiscovery(JobId),
}

impl TimerKind {
    pub fn job_id(&self) -> JobId {
        match self {
            TimerKind::Kill(id) | TimerKind::PidDiscovery(id) => *id,
        }
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
