// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Effect`: everything the state machine wants to happen in the world,
//! expressed as data so `state_machine::change_state` stays a pure
//! function of `(Job, Clock)`. The supervisor's executor performs each
//! effect in order and feeds any resulting events back to the dispatcher.

use oj_core::{Event, JobId, JobProcess, PidSlot, TimerKind};
use std::time::Duration;

/// Which of a job's scripts a `Spawn` effect is starting, for logging and
/// for the Reaper to know which transition a child's death should drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Main,
    PreStart,
    PostStart,
    PreStop,
    PostStop,
    Stop,
    Respawn,
}

oj_core::simple_display! {
    ScriptKind {
        Main => "main",
        PreStart => "pre-start",
        PostStart => "post-start",
        PreStop => "pre-stop",
        PostStop => "post-stop",
        Stop => "stop",
        Respawn => "respawn",
    }
}

/// A single side effect produced by a state-machine transition.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append an edge event to the dispatch queue.
    EmitEdge(Event),
    /// Record a level event's value, enqueuing only on change.
    EmitLevel { name: String, value: String },
    /// Fork/exec `process` for `job_id`, occupying `slot`.
    Spawn { job_id: JobId, kind: ScriptKind, slot: PidSlot, process: JobProcess },
    /// Send `SIGTERM` to `pid` and arm a kill timer.
    SendTerm { job_id: JobId, pid: i32 },
    /// Send `SIGKILL` to `pid` (kill-timer expiry escalation).
    SendKill { job_id: JobId, pid: i32 },
    /// Arm a timer keyed by its kind (at most one kill/pid-discovery timer
    /// per job); fires back into the loop on expiry.
    SetTimer { kind: TimerKind, duration: Duration },
    /// Cancel a previously armed timer; a no-op if it already fired or was
    /// never armed.
    CancelTimer { kind: TimerKind },
}

impl Effect {
    /// Short tag for logging, matching this lineage's `effect.name()` convention.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::EmitEdge(_) => "emit_edge",
            Effect::EmitLevel { .. } => "emit_level",
            Effect::Spawn { .. } => "spawn",
            Effect::SendTerm { .. } => "send_term",
            Effect::SendKill { .. } => "send_kill",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
        }
    }

    /// `key=value` fields for structured logging.
    pub fn fields(&self) -> Vec<(String, String)> {
        match self {
            Effect::EmitEdge(event) => vec![("event".into(), event.log_summary())],
            Effect::EmitLevel { name, value } => {
                vec![("name".into(), name.clone()), ("value".into(), value.clone())]
            }
            Effect::Spawn { job_id, kind, slot, .. } => vec![
                ("job_id".into(), job_id.to_string()),
                ("kind".into(), kind.to_string()),
                ("slot".into(), format!("{:?}", slot)),
            ],
            Effect::SendTerm { job_id, pid } => {
                vec![("job_id".into(), job_id.to_string()), ("pid".into(), pid.to_string())]
            }
            Effect::SendKill { job_id, pid } => {
                vec![("job_id".into(), job_id.to_string()), ("pid".into(), pid.to_string())]
            }
            Effect::SetTimer { kind, duration } => vec![
                ("job_id".into(), kind.job_id().to_string()),
                ("duration_ms".into(), duration.as_millis().to_string()),
            ],
            Effect::CancelTimer { kind } => vec![("job_id".into(), kind.job_id().to_string())],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
