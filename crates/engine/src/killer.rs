// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Killer: `SIGTERM` → kill-timer → `SIGKILL` escalation for a job's
//! main process.

use crate::effect::Effect;
use oj_core::{Clock, Job, ProcessState, TimerKind};

/// Request a job's main process stop.
///
/// If nothing is actually running, advance the state machine as if the
/// child had already been reaped cleanly. Otherwise send `SIGTERM` and arm
/// the kill timer; `escalate` fires `SIGKILL` if it expires unanswered.
pub fn kill(job: &mut Job, clock: &impl Clock, _force: bool) -> Vec<Effect> {
    let Some(pid) = job.slot.main_pid else {
        return crate::state_machine::change_state(job, clock);
    };

    job.slot.process_state = ProcessState::Killed;
    job.kill_timer_armed = true;
    vec![
        Effect::SendTerm { job_id: job.id, pid },
        Effect::SetTimer { kind: TimerKind::Kill(job.id), duration: job.config.kill_timeout },
    ]
}

/// The kill timer for `job` expired without the child being reaped:
/// escalate to `SIGKILL`. Does not clear `main_pid` — only the Reaper does
/// that, once the signal is actually observed.
pub fn escalate(job: &mut Job) -> Vec<Effect> {
    job.kill_timer_armed = false;
    let Some(pid) = job.slot.main_pid else {
        return Vec::new();
    };
    vec![Effect::SendKill { job_id: job.id, pid }]
}

#[cfg(test)]
#[path = "killer_tests.rs"]
mod tests;
