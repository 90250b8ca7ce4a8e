// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use super::*;

#[yare::parameterized(
    stopped_to_starting = { ChildStatus::Stopped, ChildStatus::Starting, true },
    starting_to_running = { ChildStatus::Starting, ChildStatus::Running, true },
    starting_to_crashed = { ChildStatus::Starting, ChildStatus::Crashed, true },
    running_to_pausing = { ChildStatus::Running, ChildStatus::Pausing, true },
    running_to_crashed = { ChildStatus::Running, ChildStatus::Crashed, true },
    running_to_stopping = { ChildStatus::Running, ChildStatus::Stopping, true },
    pausing_to_paused = { ChildStatus::Pausing, ChildStatus::Paused, true },
    paused_to_running = { ChildStatus::Paused, ChildStatus::Running, true },
    stopping_to_stopped = { ChildStatus::Stopping, ChildStatus::Stopped, true },
    error_to_stopped = { ChildStatus::Error, ChildStatus::Stopped, true },
    crashed_to_starting = { ChildStatus::Crashed, ChildStatus::Starting, true },
    crashed_to_stopped = { ChildStatus::Crashed, ChildStatus::Stopped, true },
    stopped_to_running_invalid = { ChildStatus::Stopped, ChildStatus::Running, false },
    paused_to_stopping_invalid = { ChildStatus::Paused, ChildStatus::Stopping, false },
    stopped_to_paused_invalid = { ChildStatus::Stopped, ChildStatus::Paused, false },
    pausing_to_running_invalid = { ChildStatus::Pausing, ChildStatus::Running, false },
)]
fn transition_matches_state_machine(from: ChildStatus, to: ChildStatus, expected: bool) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[test]
fn any_state_can_transition_to_error() {
    for status in [
        ChildStatus::Stopped,
        ChildStatus::Starting,
        ChildStatus::Running,
        ChildStatus::Pausing,
        ChildStatus::Paused,
        ChildStatus::Stopping,
        ChildStatus::Error,
        ChildStatus::Crashed,
    ] {
        assert!(status.can_transition_to(ChildStatus::Error));
    }
}

#[test]
fn new_handle_starts_stopped_with_zero_counters() {
    let handle = ChildHandle::new("demo", PathBuf::from("/projects/demo"));
    assert_eq!(handle.status, ChildStatus::Stopped);
    assert_eq!(handle.pid, None);
    assert_eq!(handle.restart_count, 0);
    assert!(handle.can_restart());
}

#[test]
fn can_restart_false_once_cap_reached() {
    let mut handle = ChildHandle::new("demo", PathBuf::from("/projects/demo"));
    handle.restart_count = MAX_RESTARTS - 1;
    assert!(handle.can_restart());
    handle.restart_count = MAX_RESTARTS;
    assert!(!handle.can_restart());
}
