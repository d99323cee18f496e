// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diffing a freshly loaded set of job configs against the live `JobTable`
//! on `ReloadConfig` (§6a): new names are inserted fresh, removed names are
//! marked for deletion once they next reach WAITING, and configs that
//! didn't change leave the running `Job`'s `goal`/`state` untouched.

use crate::parser::JobName;
use oj_core::{Job, JobConfig, JobTable};
use std::collections::HashSet;

/// Apply a freshly parsed set of `(name, config)` pairs to `table`.
pub fn reconcile(table: &mut JobTable, loaded: Vec<(JobName, JobConfig)>, now_epoch_ms: u64) {
    let mut seen = HashSet::with_capacity(loaded.len());

    for (name, config) in loaded {
        seen.insert(name.clone());
        match table.get(&name) {
            Some(existing) if existing.config == config => {}
            Some(_) => {
                if let Some(job) = table.get_mut(&name) {
                    job.config = config;
                    job.delete = false;
                }
            }
            None => table.insert(Job::new(config, now_epoch_ms)),
        }
    }

    let removed: Vec<String> =
        table.names().filter(|name| !seen.contains(*name)).map(|s| s.to_string()).collect();
    for name in removed {
        if let Some(job) = table.get_mut(&name) {
            job.delete = true;
        }
    }
}

#[cfg(test)]
#[path = "reload_tests.rs"]
mod tests;
