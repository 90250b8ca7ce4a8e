// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled tasks: the unit the Resource Scheduler admits onto a project.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id;
use crate::quota::ResourceQuota;

define_id! {
    /// Identifier for a scheduled task.
    pub struct TaskId("tsk-");
}

/// Task priority. Lower numeric value sorts first in the scheduling heap —
/// `Critical` (1) is scheduled ahead of `Background` (5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TaskPriority {
    Critical = 1,
    High = 2,
    Normal = 3,
    Low = 4,
    Background = 5,
}

impl TaskPriority {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// A task submitted for admission onto a project's quota.
///
/// The global queue orders tasks by `(priority.value(), created_at)`: lower
/// priority value first, ties broken by earliest submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub task_id: TaskId,
    pub project_name: String,
    pub priority: TaskPriority,
    #[serde(with = "duration_secs")]
    pub estimated_duration: Duration,
    pub requirements: ResourceQuota,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScheduledTask {
    pub fn new(
        project_name: impl Into<String>,
        priority: TaskPriority,
        estimated_duration: Duration,
        requirements: ResourceQuota,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id: TaskId::new(),
            project_name: project_name.into(),
            priority,
            estimated_duration,
            requirements,
            dependencies: Vec::new(),
            deadline: None,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    /// A task is ready iff every dependency id is present in `completed`.
    pub fn is_ready(&self, completed: &HashSet<TaskId>) -> bool {
        self.dependencies.iter().all(|d| completed.contains(d))
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|d| now > d)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
