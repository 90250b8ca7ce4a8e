// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use chrono::{TimeZone, Utc};

use super::*;
use crate::quota::ResourceQuota;

#[test]
fn priority_ordering_runs_critical_to_background() {
    let mut priorities = vec![
        TaskPriority::Background,
        TaskPriority::Low,
        TaskPriority::Critical,
        TaskPriority::Normal,
        TaskPriority::High,
    ];
    priorities.sort();
    assert_eq!(
        priorities,
        vec![
            TaskPriority::Critical,
            TaskPriority::High,
            TaskPriority::Normal,
            TaskPriority::Low,
            TaskPriority::Background,
        ]
    );
}

#[test]
fn priority_value_matches_ordinal() {
    assert_eq!(TaskPriority::Critical.value(), 1);
    assert_eq!(TaskPriority::Background.value(), 5);
}

fn quota() -> ResourceQuota {
    ResourceQuota::new(1.0, 512, 1, 512, 1.0).unwrap()
}

#[test]
fn is_ready_with_no_dependencies() {
    let task = ScheduledTask::new(
        "demo",
        TaskPriority::Normal,
        Duration::from_secs(60),
        quota(),
        Utc::now(),
    );
    assert!(task.is_ready(&HashSet::new()));
}

#[test]
fn is_ready_respects_unsatisfied_dependencies() {
    let mut task = ScheduledTask::new(
        "demo",
        TaskPriority::Normal,
        Duration::from_secs(60),
        quota(),
        Utc::now(),
    );
    task.dependencies.push(TaskId::new());
    assert!(!task.is_ready(&HashSet::new()));

    let mut completed = HashSet::new();
    completed.insert(task.dependencies[0]);
    assert!(task.is_ready(&completed));
}

#[test]
fn is_overdue_before_and_after_deadline() {
    let mut task = ScheduledTask::new(
        "demo",
        TaskPriority::Normal,
        Duration::from_secs(60),
        quota(),
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    );
    task.deadline = Some(Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap());

    assert!(!task.is_overdue(Utc.with_ymd_and_hms(2026, 1, 1, 0, 30, 0).unwrap()));
    assert!(task.is_overdue(Utc.with_ymd_and_hms(2026, 1, 1, 1, 30, 0).unwrap()));
}

#[test]
fn duration_secs_round_trips_through_json() {
    let task = ScheduledTask::new(
        "demo",
        TaskPriority::High,
        Duration::from_secs(90),
        quota(),
        Utc::now(),
    );
    let json = serde_json::to_string(&task).unwrap();
    let back: ScheduledTask = serde_json::from_str(&json).unwrap();
    assert_eq!(back.estimated_duration, Duration::from_secs(90));
}
