// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job state machine: `next_state` is a pure function of `(goal,
//! state)`; `change_state` applies transitions and returns the `Effect`s
//! each state's entry demands, looping while the job falls through
//! script-less states without blocking on a spawned process.

use crate::effect::{Effect, ScriptKind};
use oj_core::{Clock, Event, Job, JobGoal, JobState, PidSlot, ProcessState};

/// Pure transition table from §4.3: the only state this job would move to
/// if nothing else happened, independent of any side effect.
pub fn next_state(goal: JobGoal, state: JobState) -> JobState {
    use JobGoal::{Start, Stop};
    use JobState::*;
    match (state, goal) {
        (Waiting, Stop) => Waiting,
        (Waiting, Start) => Starting,
        (Starting, Stop) => Stopping,
        (Starting, Start) => Running,
        (Running, Stop) => Stopping,
        (Running, Start) => Respawning,
        (Stopping, Stop) => Waiting,
        (Stopping, Start) => Starting,
        (Respawning, Stop) => Stopping,
        (Respawning, Start) => Running,
    }
}

/// Drive `job` through every state its goal lets it fall through without a
/// spawned process in the way, applying each entry's side effects.
pub fn change_state(job: &mut Job, clock: &impl Clock) -> Vec<Effect> {
    let mut effects = Vec::new();
    loop {
        let target = next_state(job.goal, job.state);
        if target == job.state {
            break;
        }
        job.state = target;
        effects.extend(enter_state(job, clock));
        if !job.slot.is_idle() {
            break;
        }
    }
    effects
}

/// `start(cause)`: set goal=START, store the cause, step once.
pub fn start(job: &mut Job, cause: Event, clock: &impl Clock) -> Vec<Effect> {
    job.goal = JobGoal::Start;
    job.cause = Some(cause);
    change_state(job, clock)
}

/// `stop(cause)`: set goal=STOP; if RUNNING, invoke the Killer; otherwise
/// let any in-flight script finish naturally.
pub fn stop(job: &mut Job, cause: Event, clock: &impl Clock) -> Vec<Effect> {
    job.goal = JobGoal::Stop;
    job.cause = Some(cause);
    if job.state == JobState::Running {
        crate::killer::kill(job, clock, false)
    } else {
        change_state(job, clock)
    }
}

fn enter_state(job: &mut Job, clock: &impl Clock) -> Vec<Effect> {
    match job.state {
        JobState::Starting => enter_starting(job),
        JobState::Running => enter_running(job, clock),
        JobState::Stopping => enter_stopping(job),
        JobState::Respawning => enter_respawning(job),
        JobState::Waiting => enter_waiting(job),
    }
}

fn enter_starting(job: &mut Job) -> Vec<Effect> {
    let mut effects = vec![Effect::EmitEdge(Event::edge_with(
        format!("{}/start", job.name),
        cause_args(job),
        cause_env(job),
    ))];
    if let Some(script) = job.config.pre_start.clone() {
        job.slot.process_state = ProcessState::Spawned;
        effects.push(Effect::Spawn {
            job_id: job.id,
            kind: ScriptKind::PreStart,
            slot: PidSlot::Main,
            process: script,
        });
    }
    effects
}

fn enter_running(job: &mut Job, clock: &impl Clock) -> Vec<Effect> {
    if !respawn_rate_ok(job, clock) {
        job.goal = JobGoal::Stop;
        return Vec::new();
    }

    let mut effects = vec![Effect::Spawn {
        job_id: job.id,
        kind: ScriptKind::Main,
        slot: PidSlot::Main,
        process: job.config.command.clone(),
    }];
    job.slot.process_state = ProcessState::Spawned;
    effects.push(Effect::EmitEdge(Event::edge_with(
        format!("{}/started", job.name),
        cause_args(job),
        cause_env(job),
    )));
    if job.config.respawn {
        effects.push(Effect::EmitEdge(Event::edge(job.name.clone())));
    }
    // post-start overlaps the main process in the aux slot; its outcome is
    // advisory and never feeds back into the goal (§9).
    if let Some(script) = job.config.post_start.clone() {
        effects.push(Effect::Spawn {
            job_id: job.id,
            kind: ScriptKind::PostStart,
            slot: PidSlot::Aux,
            process: script,
        });
    }
    effects
}

fn enter_stopping(job: &mut Job) -> Vec<Effect> {
    let mut effects = vec![Effect::EmitEdge(Event::edge_with(
        format!("{}/stop", job.name),
        cause_args(job),
        cause_env(job),
    ))];
    if job.config.respawn && job.failed {
        effects.push(Effect::EmitEdge(Event::edge(job.name.clone())));
    }
    if let Some(script) = job.config.stop.clone() {
        job.slot.process_state = ProcessState::Spawned;
        effects.push(Effect::Spawn {
            job_id: job.id,
            kind: ScriptKind::Stop,
            slot: PidSlot::Main,
            process: script,
        });
    }
    effects
}

fn enter_respawning(job: &mut Job) -> Vec<Effect> {
    let mut effects = vec![Effect::EmitEdge(Event::edge(format!("{}/respawn", job.name)))];
    if let Some(script) = job.config.respawn_script.clone() {
        job.slot.process_state = ProcessState::Spawned;
        effects.push(Effect::Spawn {
            job_id: job.id,
            kind: ScriptKind::Respawn,
            slot: PidSlot::Main,
            process: script,
        });
    }
    effects
}

fn enter_waiting(job: &mut Job) -> Vec<Effect> {
    let effects = vec![Effect::EmitEdge(Event::edge(format!("{}/stopped", job.name)))];
    job.cause = None;
    job.failed = false;
    job.failed_state = None;
    effects
}

/// Respawn-rate limiting from §4.3: a sliding window of `respawn_interval`
/// allowing up to `respawn_limit` entries into RUNNING before the job is
/// forced to STOP instead of respawning further.
fn respawn_rate_ok(job: &mut Job, clock: &impl Clock) -> bool {
    let now = clock.epoch_ms();
    let window_ms = job.config.respawn_interval.as_millis() as u64;
    if now.saturating_sub(job.respawn_window_start_ms) > window_ms {
        job.respawn_count = 0;
        job.respawn_window_start_ms = now;
    }
    job.respawn_count += 1;
    if job.respawn_count > job.config.respawn_limit {
        tracing::warn!(job = %job.name, "respawning too fast, stopped");
        false
    } else {
        true
    }
}

fn cause_args(job: &Job) -> Vec<String> {
    job.cause.as_ref().map(|e| e.args.clone()).unwrap_or_default()
}

fn cause_env(job: &Job) -> Vec<(String, String)> {
    job.cause.as_ref().map(|e| e.env.clone()).unwrap_or_default()
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
