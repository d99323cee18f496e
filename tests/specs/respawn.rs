// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 2: respawn rate limit (§8).

use crate::prelude::*;

const FLAP: &str = "start on startup\nrespawn\nexec /bin/false\n";

#[test]
fn exceeding_the_respawn_limit_stops_the_job() {
    let daemon = Daemon::start(&[("flap", FLAP)]);

    // Default respawn limit (10 respawns / 5s) must trip well within 10s.
    let stopped = wait_for(10_000, || oj_json(&daemon, &["get", "flap"])["goal"] == "stop");
    assert!(stopped, "flap should be forced to goal=stop after exceeding its respawn limit");
}

#[test]
fn a_respawn_limited_job_never_exceeds_the_state_machine_cells() {
    let daemon = Daemon::start(&[("flap", FLAP)]);
    wait_for(10_000, || oj_json(&daemon, &["get", "flap"])["goal"] == "stop");

    // Settling should leave it parked, not stuck mid-transition.
    std::thread::sleep(std::time::Duration::from_millis(300));
    let job = oj_json(&daemon, &["get", "flap"]);
    let state = job["state"].as_str().unwrap();
    assert!(
        matches!(state, "waiting" | "stopping"),
        "a stopped-too-fast job should settle at waiting or stopping, got {state}"
    );
}
