// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn job_id_round_trips_through_each_timer_kind() {
    let job = JobId::new();
    assert_eq!(TimerKind::Kill(job).job_id(), job);
    assert_eq!(TimerKind::PidDiscovery(job).job_id(), job);
}

#[test]
fn timer_ids_are_unique() {
    assert_ne!(TimerId::new(), TimerId::new());
}
