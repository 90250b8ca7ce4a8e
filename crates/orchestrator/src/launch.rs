// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the child-process launch contract (§6) from a project record and
//! the quota the scheduler (or GO's local fallback) computed for it.

use orch_core::{ProjectRecord, ResourceQuota};

use crate::runtime::LaunchSpec;

/// Program and leading args for the per-project child orchestrator. An
/// implementation may substitute an equivalent executable; the core treats
/// this as an opaque token list parameterised by the quota.
pub const CHILD_PROGRAM: &str = "python3";

fn child_args(quota: &ResourceQuota, project_name: &str) -> Vec<String> {
    vec![
        "scripts/orchestrator.py".to_string(),
        "--project-mode".to_string(),
        "--max-agents".to_string(),
        quota.max_agents.to_string(),
        "--memory-limit".to_string(),
        quota.memory_mb.to_string(),
        "--project-name".to_string(),
        project_name.to_string(),
    ]
}

/// Build the full launch spec: command, args, working directory, and the
/// environment variables added on top of the inherited parent environment.
pub fn build_launch_spec(project: &ProjectRecord, quota: &ResourceQuota) -> LaunchSpec {
    let mut envs = vec![
        ("ORCH_PROJECT_NAME".to_string(), project.name.clone()),
        ("ORCH_PROJECT_PATH".to_string(), project.path.display().to_string()),
        ("ORCH_MAX_AGENTS".to_string(), quota.max_agents.to_string()),
        ("ORCH_MEMORY_LIMIT".to_string(), quota.memory_mb.to_string()),
        ("ORCH_CPU_LIMIT".to_string(), format!("{:.2}", quota.cpu_cores)),
        ("ORCH_GLOBAL_MODE".to_string(), "true".to_string()),
    ];
    if let Some(channel) = &project.discord_channel {
        envs.push(("DISCORD_CHANNEL".to_string(), channel.clone()));
    }

    LaunchSpec {
        program: CHILD_PROGRAM.to_string(),
        args: child_args(quota, &project.name),
        envs,
        working_dir: project.path.clone(),
    }
}

/// Extract the `--project-name` value out of a launch spec's args, if
/// present. Used by test fakes that key per-project behaviour off the
/// spawned command line rather than the (not yet known) pid.
pub fn project_name_from_args(args: &[String]) -> Option<String> {
    args.iter().position(|a| a == "--project-name").and_then(|i| args.get(i + 1)).cloned()
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
