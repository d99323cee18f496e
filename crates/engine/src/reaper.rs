// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Reaper: turns a `SIGCHLD` into state-machine transitions by
//! non-blockingly sweeping terminated children and mapping each pid back to
//! the job that owns it.

use crate::effect::Effect;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use oj_core::{Clock, JobGoal, JobState, JobTable, PidSlot, ProcessState, TimerKind};

/// Outcome of classifying a terminated child's exit status against its job's
/// `normalexit` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Normal,
    Failure(i32),
}

/// Drain every already-terminated child via non-blocking `waitpid(-1,
/// WNOHANG)`, reap each one found in `table`, and return the combined
/// `Effect`s of whatever state transitions they drove.
///
/// Children not found in the pid index (already reaped, or not ours) are
/// silently dropped, per §4.6 rule 1.
pub fn reap_all(table: &mut JobTable, clock: &impl Clock) -> Vec<Effect> {
    let mut effects = Vec::new();
    loop {
        let status = match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(status) => status,
        };
        let Some(pid) = status.pid() else { break };
        effects.extend(reap_one(table, clock, pid.as_raw(), &status));
    }
    effects
}

fn reap_one(
    table: &mut JobTable,
    clock: &impl Clock,
    pid: i32,
    status: &WaitStatus,
) -> Vec<Effect> {
    let Some((job, slot)) = table.find_by_pid_mut(pid) else {
        return Vec::new();
    };
    let name = job.name.clone();
    let job_id = job.id;

    let mut effects = Vec::new();
    if job.kill_timer_armed {
        job.kill_timer_armed = false;
        effects.push(Effect::CancelTimer { kind: TimerKind::Kill(job_id) });
    }

    let outcome = classify(status, &job.config);

    // A `post-start` death is advisory (§9): clear its pid and log, but
    // leave `process_state`/`failed`/`goal` and the state machine alone,
    // since the main process (tracked separately) is what the job's state
    // actually follows.
    if slot == PidSlot::Aux {
        job.slot.aux_pid = None;
        match outcome {
            Outcome::Normal => tracing::info!(job = %name, pid, "post-start exited with status 0"),
            Outcome::Failure(code) => {
                tracing::warn!(job = %name, pid, code, "post-start exited nonzero, ignoring")
            }
        }
        table.sync_pid_index(&name);
        return effects;
    }

    job.slot.main_pid = None;
    job.slot.process_state = ProcessState::None;

    let prior_state = job.state;
    // A stop already requested via a control action or a matching `stop on`
    // (goal flipped to Stop independently of this reap) must stick: only
    // treat the death as a respawn if nothing had asked the job to stop.
    let is_respawn_running =
        job.config.respawn && prior_state == JobState::Running && job.goal == JobGoal::Start;

    match outcome {
        Outcome::Normal => {
            tracing::info!(job = %name, pid, "process terminated with status 0");
        }
        Outcome::Failure(code) => {
            tracing::warn!(job = %name, pid, code, "process terminated with nonzero status");
            job.failed = true;
            job.failed_state = Some(prior_state);
            job.exit_status = code;
        }
    }

    let fails_job = matches!(outcome, Outcome::Failure(_))
        && (prior_state == JobState::Starting
            || prior_state == JobState::Stopping
            || (prior_state == JobState::Running && !job.config.respawn));

    if fails_job {
        job.goal = JobGoal::Stop;
    } else if is_respawn_running {
        job.goal = JobGoal::Start;
    }

    table.sync_pid_index(&name);
    let job = table.get_mut(&name).expect("job present during its own reap");
    effects.extend(crate::state_machine::change_state(job, clock));
    effects
}

fn classify(status: &WaitStatus, config: &oj_core::JobConfig) -> Outcome {
    match status {
        WaitStatus::Exited(_, code) if config.is_normal_exit(*code) => Outcome::Normal,
        WaitStatus::Exited(_, code) => Outcome::Failure(*code),
        WaitStatus::Signaled(_, sig, _) => Outcome::Failure(128 + *sig as i32),
        _ => Outcome::Normal,
    }
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
