// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `daemon` stanza pid discovery (§4.4).

use crate::prelude::*;

#[test]
fn a_daemon_job_that_deposits_its_pid_file_in_time_is_not_marked_failed() {
    let daemon = Daemon::start(&[]);
    let pid_file = daemon.state_dir.join("backgrounded.pid");
    let job = format!(
        "start on startup\ndaemon\npid file {}\npid timeout 2\nexec /bin/sh -c \"echo $$ > {} && sleep 30\"\n",
        pid_file.display(),
        pid_file.display()
    );
    daemon.write_job("backgrounded", &job);
    // `write_job` landed after startup; nudge it along directly.
    oj_ok(&daemon, &["reload"]);
    oj_ok(&daemon, &["emit", "startup"]);

    let running = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "backgrounded"])["state"] == "running");
    assert!(running, "backgrounded should reach running once spawned");

    // Give the pid-discovery timer (2s) time to expire and confirm the job
    // survives: the pid file was deposited, so discovery should cancel the
    // failure timer instead of letting it fire.
    std::thread::sleep(std::time::Duration::from_secs(3));

    let job = oj_json(&daemon, &["get", "backgrounded"]);
    assert_eq!(job["failed"], false, "a daemon job that deposits its pid file in time must not be marked failed");
    assert_eq!(job["state"], "running");
}

#[test]
fn a_daemon_job_that_never_deposits_a_pid_file_is_marked_failed_after_its_timeout() {
    let daemon = Daemon::start(&[]);
    let pid_file = daemon.state_dir.join("never.pid");
    let job = format!(
        "start on startup\ndaemon\npid file {}\npid timeout 1\nexec /bin/sh -c \"sleep 30\"\n",
        pid_file.display()
    );
    daemon.write_job("never", &job);
    oj_ok(&daemon, &["reload"]);
    oj_ok(&daemon, &["emit", "startup"]);

    let failed = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "never"])["failed"] == true);
    assert!(failed, "a daemon job that never deposits a pid file should be marked failed once pid timeout expires");
}
