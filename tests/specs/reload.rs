// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config reload round-trip / idempotence (§8).

use crate::prelude::*;

const LOGD: &str = "start on startup\nexec /bin/cat\n";

#[test]
fn reload_with_an_unchanged_config_leaves_a_running_job_untouched() {
    let daemon = Daemon::start(&[("logd", LOGD)]);
    wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "logd"])["state"] == "running");
    let before = oj_json(&daemon, &["get", "logd"]);

    oj_ok(&daemon, &["reload"]);
    std::thread::sleep(std::time::Duration::from_millis(200));

    let after = oj_json(&daemon, &["get", "logd"]);
    assert_eq!(before["state"], after["state"]);
    assert_eq!(before["goal"], after["goal"]);
    assert_eq!(before["pid"], after["pid"], "an unchanged config must not respawn the running process");
}

const SIDECAR: &str = "start on ready\nexec /bin/cat\n";

#[test]
fn reload_picks_up_a_newly_added_job() {
    let daemon = Daemon::start(&[("logd", LOGD)]);
    wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "logd"])["state"] == "running");

    // `startup` already fired once before this job existed; it is inserted
    // fresh at (stop, waiting) and only starts once its own pattern matches.
    daemon.write_job("sidecar", SIDECAR);
    oj_ok(&daemon, &["reload"]);
    oj_ok(&daemon, &["emit", "ready"]);

    let picked_up = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "sidecar"])["state"] == "running");
    assert!(picked_up, "a job added to the jobs directory should start once its own start-on pattern matches");
}

#[test]
fn reload_marks_a_removed_job_for_deletion() {
    let daemon = Daemon::start(&[("logd", LOGD), ("sidecar", SIDECAR)]);
    oj_ok(&daemon, &["emit", "ready"]);
    wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "sidecar"])["state"] == "running");

    daemon.remove_job("sidecar");
    oj_ok(&daemon, &["stop", "sidecar"]);
    oj_ok(&daemon, &["reload"]);

    let pruned = wait_for(WAIT_MAX_MS, || {
        let output = daemon.oj().args(["get", "sidecar"]).output().expect("run oj");
        !output.status.success()
    });
    assert!(pruned, "sidecar should be pruned from the table once it reaches waiting after removal");
}

#[test]
fn sighup_reloads_configs_the_same_as_the_control_socket() {
    let daemon = Daemon::start(&[("logd", LOGD)]);
    wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "logd"])["state"] == "running");

    daemon.write_job("sidecar", SIDECAR);
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(daemon.pid()), nix::sys::signal::Signal::SIGHUP)
        .expect("send SIGHUP");
    oj_ok(&daemon, &["emit", "ready"]);

    let picked_up = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "sidecar"])["state"] == "running");
    assert!(picked_up, "SIGHUP should rerun the runbook load/reconcile just like the reload control request");
}
