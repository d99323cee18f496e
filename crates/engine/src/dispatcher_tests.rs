// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::{EventPattern, FakeClock, Job, JobConfig, JobGoal, JobProcess, JobState};

fn table_with(config: JobConfig) -> JobTable {
    let mut table = JobTable::new();
    table.insert(Job::new(config, 0));
    table
}

#[test]
fn start_on_startup_brings_job_to_running() {
    let config = JobConfig::builder("logd", JobProcess::exec("/bin/cat"))
        .start_on(EventPattern::named("startup"))
        .build();
    let mut table = table_with(config);
    let store = oj_core::EventStore::new();
    store.emit_edge(Event::edge("startup"));
    let clock = FakeClock::new();

    dispatch(&mut table, &store, &clock);

    let job = table.get("logd").unwrap();
    assert_eq!(job.goal, JobGoal::Start);
    assert_eq!(job.state, JobState::Running);
}

#[test]
fn level_event_matches_only_equal_value() {
    let config = JobConfig::builder("rl2", JobProcess::exec("/bin/true"))
        .start_on(EventPattern::with_value("runlevel", "2"))
        .build();
    let mut table = table_with(config);
    let store = oj_core::EventStore::new();
    store.emit_level("runlevel", "3");
    let clock = FakeClock::new();

    dispatch(&mut table, &store, &clock);
    assert_eq!(table.get("rl2").unwrap().goal, JobGoal::Stop);

    store.emit_level("runlevel", "2");
    dispatch(&mut table, &store, &clock);
    assert_eq!(table.get("rl2").unwrap().goal, JobGoal::Start);
}

#[test]
fn edge_pattern_without_value_matches_any_level() {
    let config = JobConfig::builder("any_rl", JobProcess::exec("/bin/true"))
        .start_on(EventPattern::named("runlevel"))
        .build();
    let mut table = table_with(config);
    let store = oj_core::EventStore::new();
    store.emit_level("runlevel", "5");
    let clock = FakeClock::new();

    dispatch(&mut table, &store, &clock);
    assert_eq!(table.get("any_rl").unwrap().goal, JobGoal::Start);
}

#[test]
fn job_matching_both_its_own_start_and_stop_on_one_event_sees_stop_then_start() {
    let config = JobConfig::builder("flip", JobProcess::exec("/bin/true"))
        .start_on(EventPattern::named("flip"))
        .stop_on(EventPattern::named("flip"))
        .build();
    let mut table = table_with(config);
    let job = table.get_mut("flip").unwrap();
    job.goal = JobGoal::Start;
    job.state = JobState::Running;
    job.slot.main_pid = None; // no real process, so stop() falls through immediately

    let store = oj_core::EventStore::new();
    store.emit_edge(Event::edge("flip"));
    let clock = FakeClock::new();
    dispatch(&mut table, &store, &clock);

    // stop() ran first (goal=STOP, fell through to WAITING since no pid),
    // then start() ran (goal=START again, advanced to RUNNING).
    let job = table.get("flip").unwrap();
    assert_eq!(job.goal, JobGoal::Start);
    assert_eq!(job.state, JobState::Running);
}

#[test]
fn stall_detector_fires_once_until_state_changes() {
    let mut table = JobTable::new();
    table.insert(Job::new(JobConfig::new("a", JobProcess::exec("/bin/true")), 0));
    table.insert(Job::new(JobConfig::new("b", JobProcess::exec("/bin/true")), 0));
    let mut detector = StallDetector::new();

    assert!(detector.check(&table).is_some());
    assert!(detector.check(&table).is_none());

    table.get_mut("a").unwrap().goal = JobGoal::Start;
    assert!(detector.check(&table).is_none());

    table.get_mut("a").unwrap().goal = JobGoal::Stop;
    assert!(detector.check(&table).is_some());
}
