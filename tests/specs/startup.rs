// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 1: startup → single service (§8).

use crate::prelude::*;

const LOGD: &str = "start on startup\nexec /bin/cat\n";

#[test]
fn single_service_reaches_running_after_startup() {
    let daemon = Daemon::start(&[("logd", LOGD)]);

    let running = wait_for(WAIT_MAX_MS, || {
        let job = oj_json(&daemon, &["get", "logd"]);
        job["state"] == "running" && job["goal"] == "start"
    });
    assert!(running, "logd should reach (start, running) after startup");

    let job = oj_json(&daemon, &["get", "logd"]);
    assert!(job["pid"].as_i64().unwrap_or(0) != 0, "main_pid should be nonzero once running");
    assert_eq!(job["failed"], false);
}

#[test]
fn list_jobs_includes_the_loaded_job() {
    let daemon = Daemon::start(&[("logd", LOGD)]);
    wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "logd"])["state"] == "running");

    let jobs = oj_json(&daemon, &["list"]);
    let names: Vec<&str> = jobs.as_array().unwrap().iter().map(|j| j["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"logd"), "list should include logd, got {names:?}");
}

#[test]
fn a_job_with_no_start_on_pattern_stays_waiting() {
    let daemon = Daemon::start(&[("idle", "exec /bin/cat\n")]);

    // Give the dispatcher a few passes to prove it never starts on its own.
    std::thread::sleep(std::time::Duration::from_millis(300));
    let job = oj_json(&daemon, &["get", "idle"]);
    assert_eq!(job["state"], "waiting");
    assert_eq!(job["goal"], "stop");
}
