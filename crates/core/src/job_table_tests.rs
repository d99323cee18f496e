// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::{Job, JobConfig, JobProcess};

fn job(name: &str) -> Job {
    Job::new(JobConfig::new(name, JobProcess::exec("/bin/true")), 0)
}

#[test]
fn insert_and_get_by_name() {
    let mut table = JobTable::new();
    table.insert(job("logd"));
    assert!(table.get("logd").is_some());
    assert!(table.get("missing").is_none());
}

#[test]
fn find_by_pid_resolves_main_and_aux_slots() {
    let mut table = JobTable::new();
    let mut j = job("logd");
    j.slot.main_pid = Some(100);
    j.slot.aux_pid = Some(101);
    table.insert(j);

    let (found, slot) = table.find_by_pid(100).expect("main pid");
    assert_eq!(found.name, "logd");
    assert_eq!(slot, PidSlot::Main);

    let (found, slot) = table.find_by_pid(101).expect("aux pid");
    assert_eq!(found.name, "logd");
    assert_eq!(slot, PidSlot::Aux);
}

#[test]
fn pid_miss_returns_none_without_touching_any_job() {
    let mut table = JobTable::new();
    table.insert(job("logd"));
    assert!(table.find_by_pid(999).is_none());
}

#[test]
fn remove_clears_the_pid_index() {
    let mut table = JobTable::new();
    let mut j = job("logd");
    j.slot.main_pid = Some(100);
    table.insert(j);
    table.remove("logd");
    assert!(table.find_by_pid(100).is_none());
}

#[test]
fn sync_pid_index_reflects_in_place_slot_mutation() {
    let mut table = JobTable::new();
    table.insert(job("logd"));
    table.get_mut("logd").unwrap().slot.main_pid = Some(200);
    table.sync_pid_index("logd");
    assert!(table.find_by_pid(200).is_some());
}

#[test]
fn all_at_rest_true_only_when_every_job_is_stop_waiting() {
    let mut table = JobTable::new();
    table.insert(job("a"));
    table.insert(job("b"));
    assert!(table.all_at_rest());

    table.get_mut("b").unwrap().goal = crate::job::JobGoal::Start;
    assert!(!table.all_at_rest());
}
