// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pid discovery for `daemon` jobs (§4.4): the spawned process is expected
//! to fork into the background before `pid_timeout` and either deposit its
//! real pid in a pid file, or be identifiable by its binary path. Polled
//! once per main-loop iteration while a job's discovery timer is armed.

use oj_core::{JobId, JobTable};
use std::path::{Path, PathBuf};

/// Check every job still waiting on pid discovery; return the `(JobId,
/// pid)` pairs found this pass.
pub fn poll(table: &mut JobTable) -> Vec<(JobId, i32)> {
    let pending: Vec<(JobId, Option<PathBuf>, Option<PathBuf>)> = table
        .iter()
        .filter(|job| job.pid_discovery_timer_armed)
        .map(|job| (job.id, job.config.pid_file.clone(), job.config.pid_binary.clone()))
        .collect();

    let mut found = Vec::new();
    for (job_id, pid_file, pid_binary) in pending {
        let pid = pid_file
            .as_deref()
            .and_then(read_pid_file)
            .or_else(|| pid_binary.as_deref().and_then(find_by_binary));
        if let Some(pid) = pid {
            found.push((job_id, pid));
        }
    }
    found
}

fn read_pid_file(path: &Path) -> Option<i32> {
    let contents = std::fs::read_to_string(path).ok()?;
    let pid: i32 = contents.trim().parse().ok()?;
    is_alive(pid).then_some(pid)
}

/// Scan `/proc/<pid>/exe` for a process whose resolved executable matches
/// `binary`. Linux-specific, matching the rest of this engine's reliance
/// on `waitpid`/`nix::sys::signal`.
fn find_by_binary(binary: &Path) -> Option<i32> {
    let entries = std::fs::read_dir("/proc").ok()?;
    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<i32>() else { continue };
        if let Ok(resolved) = std::fs::read_link(entry.path().join("exe")) {
            if resolved == binary {
                return Some(pid);
            }
        }
    }
    None
}

fn is_alive(pid: i32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok()
}

#[cfg(test)]
#[path = "pid_discovery_tests.rs"]
mod tests;
