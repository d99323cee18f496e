// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario 5: stall detection (§8).

use crate::prelude::*;

/// Two jobs with no `start on` pattern of their own settle at `(stop,
/// waiting)` immediately and never move again, which is what lets the
/// dispatcher's rest-position check fire `stalled` exactly once.
const IDLE: &str = "exec /bin/cat\n";

#[test]
fn a_rest_position_fires_the_job_listening_for_stalled_exactly_once() {
    let daemon = Daemon::start(&[
        ("idle_one", IDLE),
        ("idle_two", IDLE),
        ("on_stall", "start on stalled\nexec /bin/true\n"),
    ]);

    let fired = wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "on_stall"])["state"] != "waiting");
    assert!(fired, "on_stall should leave waiting once the idle jobs stall");

    // `/bin/true` exits immediately and `on_stall` has no `respawn`
    // stanza, so it settles back to (stop, waiting) on its own.
    let settled = wait_for(WAIT_MAX_MS, || {
        let job = oj_json(&daemon, &["get", "on_stall"]);
        job["state"] == "waiting" && job["goal"] == "stop"
    });
    assert!(settled, "on_stall should settle back to (stop, waiting) after its one-shot run");
}

#[test]
fn stalled_does_not_refire_once_the_table_is_already_at_rest() {
    let daemon = Daemon::start(&[("idle_one", IDLE), ("idle_two", IDLE), ("on_stall", "start on stalled\nexec /bin/true\n")]);

    wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "on_stall"])["state"] != "waiting");
    wait_for(WAIT_MAX_MS, || oj_json(&daemon, &["get", "on_stall"])["goal"] == "stop");

    // With the whole table already at rest, a second idle period must not
    // start `on_stall` again — there is no fresh `stalled` event to match.
    std::thread::sleep(std::time::Duration::from_millis(500));
    let job = oj_json(&daemon, &["get", "on_stall"]);
    assert_eq!(job["state"], "waiting");
    assert_eq!(job["goal"], "stop");
}
