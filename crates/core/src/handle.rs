// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The child-process handle and its lifecycle state machine (§4.3).
//!
//! ```text
//! STOPPED -> STARTING -> RUNNING <-> PAUSING <-> PAUSED
//!                            |
//!                            v
//!                        STOPPING -> STOPPED
//!
//! STARTING | RUNNING -> CRASHED   (poll() observed exit while not STOPPING)
//! any      -> ERROR               (operation failure)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildStatus {
    Stopped,
    Starting,
    Running,
    Pausing,
    Paused,
    Stopping,
    Error,
    Crashed,
}

crate::simple_display! {
    ChildStatus {
        Stopped => "stopped",
        Starting => "starting",
        Running => "running",
        Pausing => "pausing",
        Paused => "paused",
        Stopping => "stopping",
        Error => "error",
        Crashed => "crashed",
    }
}

impl ChildStatus {
    /// True iff transitioning from `self` to `next` is a valid edge in the
    /// §4.3 state machine. `Error` is reachable from any state (operation
    /// failure); `Crashed` is reachable only from `Starting`/`Running`.
    pub fn can_transition_to(self, next: ChildStatus) -> bool {
        use ChildStatus::*;
        if next == Error {
            return true;
        }
        matches!(
            (self, next),
            (Stopped, Starting)
                | (Starting, Running)
                | (Starting, Crashed)
                | (Running, Pausing)
                | (Running, Crashed)
                | (Running, Stopping)
                | (Pausing, Paused)
                | (Paused, Running)
                | (Stopping, Stopped)
                | (Error, Stopped)
                | (Crashed, Starting)
                | (Crashed, Stopped)
        )
    }
}

/// The supervisor's in-memory record of one running (or recently-running)
/// child process. Created by `start_project`, destroyed by `stop_project`
/// (transitions to `Stopped`), or retained with status `Crashed` pending
/// restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildHandle {
    pub project_name: String,
    pub project_path: std::path::PathBuf,
    pub pid: Option<u32>,
    pub status: ChildStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub cpu_usage: f64,
    pub memory_mb: u64,
    pub active_agents: u32,
    pub error_count: u32,
    pub restart_count: u32,
}

/// Upper bound on automatic restarts per handle lifetime (§4.3, §7). Never
/// reset within a handle's lifetime — only recreating the handle (a manual
/// stop then start) clears it, since that produces a fresh `ChildHandle`.
pub const MAX_RESTARTS: u32 = 3;

impl ChildHandle {
    pub fn new(project_name: impl Into<String>, project_path: std::path::PathBuf) -> Self {
        Self {
            project_name: project_name.into(),
            project_path,
            pid: None,
            status: ChildStatus::Stopped,
            start_time: None,
            last_heartbeat: None,
            cpu_usage: 0.0,
            memory_mb: 0,
            active_agents: 0,
            error_count: 0,
            restart_count: 0,
        }
    }

    pub fn can_restart(&self) -> bool {
        self.restart_count < MAX_RESTARTS
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
