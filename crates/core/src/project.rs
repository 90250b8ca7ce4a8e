// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project records: identity, classification, resource caps, and dependencies.
//!
//! Owned exclusively by the Configuration Manager. Immutable fields (name,
//! path, created_at) are set once at registration; mutable fields (status,
//! last_activity) are updated only through `orch_config::ConfigManager`
//! operations, never in place by callers.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relative resource priority for a project's scheduler allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectPriority {
    Critical,
    High,
    Normal,
    Low,
}

impl ProjectPriority {
    /// Priority weight used by the priority-weighted allocation strategy (§4.2.1).
    pub fn weight(self) -> f64 {
        match self {
            ProjectPriority::Critical => 2.0,
            ProjectPriority::High => 1.5,
            ProjectPriority::Normal => 1.0,
            ProjectPriority::Low => 0.5,
        }
    }
}

crate::simple_display! {
    ProjectPriority {
        Critical => "critical",
        High => "high",
        Normal => "normal",
        Low => "low",
    }
}

impl Default for ProjectPriority {
    fn default() -> Self {
        ProjectPriority::Normal
    }
}

/// Lifecycle status of a registered project.
///
/// Only `Active` projects are started by the Global Orchestrator and counted
/// toward scheduler active-project totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Paused,
    Maintenance,
    Archived,
    Initializing,
}

crate::simple_display! {
    ProjectStatus {
        Active => "active",
        Paused => "paused",
        Maintenance => "maintenance",
        Archived => "archived",
        Initializing => "initializing",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Initializing
    }
}

/// Kind of relationship a dependency edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Blocks,
    Enhances,
    IntegratesWith,
}

crate::simple_display! {
    DependencyKind {
        Blocks => "blocks",
        Enhances => "enhances",
        IntegratesWith => "integrates_with",
    }
}

/// How badly a missing/stalled dependency target affects the dependent project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Criticality {
    fn default() -> Self {
        Criticality::Medium
    }
}

crate::simple_display! {
    Criticality {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

/// One edge of the inter-project dependency graph, owned by the source project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDependency {
    pub target_project: String,
    pub dependency_type: DependencyKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub criticality: Criticality,
}

/// Hard upper bounds the scheduler must never exceed for a project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub max_parallel_agents: u32,
    pub max_memory_mb: u64,
    pub max_disk_mb: u64,
    /// Relative CPU priority multiplier, clamped to [0.1, 2.0] at construction.
    pub cpu_priority: f64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self { max_parallel_agents: 3, max_memory_mb: 1024, max_disk_mb: 2048, cpu_priority: 1.0 }
    }
}

impl ResourceLimits {
    /// Clamp `cpu_priority` into the valid [0.1, 2.0] range and floor the
    /// integer caps to their documented minimums (§3).
    pub fn normalized(mut self) -> Self {
        self.max_parallel_agents = self.max_parallel_agents.max(1);
        self.max_memory_mb = self.max_memory_mb.max(1);
        self.max_disk_mb = self.max_disk_mb.max(1);
        self.cpu_priority = self.cpu_priority.clamp(0.1, 2.0);
        self
    }
}

/// A registered project: identity, classification, resource envelope, and
/// dependency edges. Immutable fields are set at `register_project`; the rest
/// is only ever mutated through Configuration Manager operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub priority: ProjectPriority,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub resource_limits: ResourceLimits,
    #[serde(default)]
    pub dependencies: Vec<ProjectDependency>,
    #[serde(default)]
    pub discord_channel: Option<String>,
    /// Origin remote URL, if discovered from a `.git/config`. Informational
    /// only — never validated or dereferenced by the core.
    #[serde(default)]
    pub git_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct ProjectRecordBuilder => ProjectRecord {
        into { name: String = "demo" }
        set { path: PathBuf = PathBuf::from("/tmp/demo") }
        set { priority: ProjectPriority = ProjectPriority::Normal }
        set { status: ProjectStatus = ProjectStatus::Active }
        set { resource_limits: ResourceLimits = ResourceLimits::default() }
        set { dependencies: Vec<ProjectDependency> = Vec::new() }
        option { discord_channel: String = None }
        option { git_url: String = None }
        computed { created_at: DateTime<Utc> = Utc::now() }
        computed { last_activity: Option<DateTime<Utc>> = None }
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
