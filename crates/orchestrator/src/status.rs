// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Return shapes for the Global Orchestrator's read-only status operation.

use std::collections::HashMap;

use orch_core::ChildHandle;
use serde::{Deserialize, Serialize};

/// Lifecycle state of the supervisor itself, distinct from any one handle's
/// [`orch_core::ChildStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisorState {
    Stopped,
    Starting,
    Running,
    Error,
}

orch_core::simple_display! {
    SupervisorState {
        Stopped => "stopped",
        Starting => "starting",
        Running => "running",
        Error => "error",
    }
}

/// Snapshot returned by `get_global_status`. `projects` is keyed by project
/// name; each value is the handle as it stood at the moment the snapshot
/// was taken (§8 invariant 5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStatus {
    pub supervisor_state: SupervisorState,
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_agents: u32,
    pub total_memory_mb: u64,
    pub total_cpu_percent: f64,
    pub projects: HashMap<String, ChildHandle>,
}
