// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Dispatcher: one pass over the drained event queue, matching every
//! job's `start on`/`stop on` patterns and stepping its state machine.

use crate::effect::Effect;
use oj_core::{Clock, Event, JobTable, STALLED_EVENT};

/// Drain `store`, match each event against every job, and return the
/// combined `Effect`s plus the events this pass itself emitted (so the
/// caller can notify control-socket subscribers or feed a subsequent pass).
///
/// A job whose own stop and start patterns both match the same event
/// observes stop semantics before start semantics, per this lineage's
/// documented dispatch order.
pub fn dispatch(
    table: &mut JobTable,
    store: &oj_core::EventStore,
    clock: &impl Clock,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    for event in store.drain() {
        effects.extend(dispatch_one(table, &event, clock));
    }
    effects
}

fn dispatch_one(table: &mut JobTable, event: &Event, clock: &impl Clock) -> Vec<Effect> {
    let mut effects = Vec::new();
    let names: Vec<String> = table.names().map(|s| s.to_string()).collect();
    for name in names {
        let job = table.get(&name).expect("name came from the table itself");
        let matches_stop = job.config.stop_events.iter().any(|p| event.matches(p));
        let matches_start = job.config.start_events.iter().any(|p| event.matches(p));
        if !matches_stop && !matches_start {
            continue;
        }
        let job = table.get_mut(&name).expect("name came from the table itself");
        if matches_stop {
            effects.extend(crate::state_machine::stop(job, event.clone(), clock));
        }
        if matches_start {
            let job = table.get_mut(&name).expect("name came from the table itself");
            effects.extend(crate::state_machine::start(job, event.clone(), clock));
        }
        table.sync_pid_index(&name);
    }
    effects
}

/// Stall tracker: emits `stalled` the first time every job reaches its rest
/// position, and suppresses re-emission until some job moves again.
#[derive(Default)]
pub struct StallDetector {
    was_stalled: bool,
}

impl StallDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `table` after a dispatch pass; returns the `stalled` edge event
    /// to emit, if this is a fresh stall.
    pub fn check(&mut self, table: &JobTable) -> Option<Event> {
        let at_rest = table.all_at_rest();
        if at_rest && !self.was_stalled {
            self.was_stalled = true;
            Some(Event::edge(STALLED_EVENT))
        } else {
            if !at_rest {
                self.was_stalled = false;
            }
            None
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
