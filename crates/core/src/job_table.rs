// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `JobTable`: the set of jobs keyed by name, plus a pid index kept
//! transactionally consistent with each `Job`'s `ProcessSlot`.

use crate::job::Job;
use std::collections::HashMap;

/// Which pid slot of a job a `by_pid` lookup resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidSlot {
    Main,
    Aux,
}

/// Jobs keyed by name, with a secondary index from pid to `(name, slot)`.
#[derive(Default)]
pub struct JobTable {
    by_name: HashMap<String, Job>,
    by_pid: HashMap<i32, (String, PidSlot)>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, job: Job) {
        let name = job.name.clone();
        self.reindex_pids(&name, &job);
        self.by_name.insert(name, job);
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.by_name.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Job> {
        self.by_name.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Job> {
        if let Some(job) = self.by_name.get(name) {
            self.clear_pids_for(job);
        }
        self.by_name.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.by_name.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Every job has reached its rest position: goal=STOP, state=WAITING.
    pub fn all_at_rest(&self) -> bool {
        self.by_name.values().all(|j| j.is_at_rest())
    }

    pub fn find_by_pid(&self, pid: i32) -> Option<(&Job, PidSlot)> {
        let (name, slot) = self.by_pid.get(&pid)?;
        self.by_name.get(name).map(|job| (job, *slot))
    }

    pub fn find_by_pid_mut(&mut self, pid: i32) -> Option<(&mut Job, PidSlot)> {
        let (name, slot) = self.by_pid.get(&pid)?.clone();
        self.by_name.get_mut(&name).map(|job| (job, slot))
    }

    /// Re-derive the pid index entries for `name` from `job.slot`, after a
    /// caller has mutated a job's `ProcessSlot` in place. Keeps `by_pid`
    /// transactionally consistent with the authoritative `by_name` entry.
    pub fn sync_pid_index(&mut self, name: &str) {
        self.by_pid.retain(|_, (n, _)| n != name);
        if let Some(job) = self.by_name.get(name) {
            self.reindex_pids(name, job);
        }
    }

    fn reindex_pids(&mut self, name: &str, job: &Job) {
        self.by_pid.retain(|_, (n, _)| n != name);
        if let Some(pid) = job.slot.main_pid {
            self.by_pid.insert(pid, (name.to_string(), PidSlot::Main));
        }
        if let Some(pid) = job.slot.aux_pid {
            self.by_pid.insert(pid, (name.to_string(), PidSlot::Aux));
        }
    }

    fn clear_pids_for(&mut self, job: &Job) {
        if let Some(pid) = job.slot.main_pid {
            self.by_pid.remove(&pid);
        }
        if let Some(pid) = job.slot.aux_pid {
            self.by_pid.remove(&pid);
        }
    }
}

#[cfg(test)]
#[path = "job_table_tests.rs"]
mod tests;
