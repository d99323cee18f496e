// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 3: kill escalation (§8).

use crate::prelude::*;

const STICKY: &str = "start on startup\nkill timeout 1\nexec /bin/sh -c \"trap '' TERM; sleep 30\"\n";

#[test]
fn a_sigterm_ignoring_job_is_killed_after_its_timeout() {
    let daemon = Daemon::start(&[("sticky", STICKY)]);

    let running = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "sticky"])["state"] == "running");
    assert!(running, "sticky should reach running before we try to stop it");

    oj_ok(&daemon, &["stop", "sticky"]);

    // kill timeout is 1s; SIGKILL plus reap should land well within 5s.
    let waiting = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "sticky"])["state"] == "waiting");
    assert!(waiting, "sticky should be reaped and settle at waiting once SIGKILL lands");

    let job = oj_json(&daemon, &["get", "sticky"]);
    assert_eq!(job["goal"], "stop");
    assert_eq!(job["pid"], serde_json::Value::Null, "main_pid should be cleared once reaped");
}

const RESPAWNING_SERVICE: &str = "start on startup\nrespawn\nexec /bin/sh -c \"sleep 30\"\n";

#[test]
fn stopping_a_running_respawn_job_does_not_get_reversed_back_to_start() {
    let daemon = Daemon::start(&[("flapper", RESPAWNING_SERVICE)]);

    let running = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "flapper"])["state"] == "running");
    assert!(running, "flapper should reach running before we try to stop it");

    oj_ok(&daemon, &["stop", "flapper"]);

    // The running process dies cleanly from SIGTERM; respawn must not
    // resurrect it once a stop was independently requested.
    let waiting = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "flapper"])["state"] == "waiting");
    assert!(waiting, "flapper should settle at waiting once stopped, not respawn back to running");

    std::thread::sleep(std::time::Duration::from_millis(500));
    let job = oj_json(&daemon, &["get", "flapper"]);
    assert_eq!(job["goal"], "stop", "goal must stay stop, not be flipped back to start by the reap");
    assert_eq!(job["state"], "waiting", "a respawn-flagged job must actually be stoppable while running");
}
