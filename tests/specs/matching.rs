// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 4: event matching rules (§8).

use crate::prelude::*;

#[test]
fn a_leveled_pattern_matches_only_its_value() {
    let daemon = Daemon::start(&[
        ("on_two", "start on runlevel 2\nexec /bin/cat\n"),
        ("on_any", "start on runlevel\nexec /bin/cat\n"),
    ]);

    oj_ok(&daemon, &["emit", "runlevel", "--value", "2"]);

    let two_running = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "on_two"])["state"] == "running");
    assert!(two_running, "on_two should match runlevel=2");

    let any_running = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "on_any"])["state"] == "running");
    assert!(any_running, "a valueless pattern should match any leveled value");
}

#[test]
fn a_leveled_pattern_does_not_match_a_different_value() {
    let daemon = Daemon::start(&[("on_two", "start on runlevel 2\nexec /bin/cat\n")]);

    oj_ok(&daemon, &["emit", "runlevel", "--value", "3"]);

    std::thread::sleep(std::time::Duration::from_millis(300));
    let job = oj_json(&daemon, &["get", "on_two"]);
    assert_eq!(job["state"], "waiting", "on_two should not match runlevel=3");
}

#[test]
fn an_edge_event_does_not_match_a_leveled_pattern() {
    let daemon = Daemon::start(&[("on_two", "start on runlevel 2\nexec /bin/cat\n")]);

    // ctrlaltdel is a bare edge event, never leveled; it must not satisfy
    // a pattern that names a specific value.
    oj_ok(&daemon, &["emit", "ctrlaltdel"]);

    std::thread::sleep(std::time::Duration::from_millis(300));
    let job = oj_json(&daemon, &["get", "on_two"]);
    assert_eq!(job["state"], "waiting");
}
