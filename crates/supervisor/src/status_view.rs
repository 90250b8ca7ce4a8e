// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON/text rendering of `GlobalOrchestrator::get_global_status` for
//! `--status` and the interactive shell's `status` command (§6).

use orch_orchestrator::GlobalStatus;
use serde_json::{json, Value};

pub fn to_json(status: &GlobalStatus) -> Value {
    let projects: Value = status
        .projects
        .iter()
        .map(|(name, handle)| {
            (
                name.clone(),
                json!({
                    "status": handle.status.to_string(),
                    "pid": handle.pid,
                    "cpu_usage": handle.cpu_usage,
                    "memory_mb": handle.memory_mb,
                    "active_agents": handle.active_agents,
                    "error_count": handle.error_count,
                    "restart_count": handle.restart_count,
                }),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into();

    json!({
        "supervisor_state": status.supervisor_state.to_string(),
        "total_projects": status.total_projects,
        "active_projects": status.active_projects,
        "total_agents": status.total_agents,
        "total_memory_mb": status.total_memory_mb,
        "total_cpu_percent": status.total_cpu_percent,
        "projects": projects,
    })
}

pub fn print_text(status: &GlobalStatus) {
    println!(
        "supervisor: {} | projects {}/{} active | agents {} | memory {} MB | cpu {:.1}%",
        status.supervisor_state,
        status.active_projects,
        status.total_projects,
        status.total_agents,
        status.total_memory_mb,
        status.total_cpu_percent,
    );
    let mut names: Vec<_> = status.projects.keys().collect();
    names.sort();
    for name in names {
        let handle = &status.projects[name];
        println!(
            "  {name:<24} {:<10} pid={:<8} agents={:<4} mem={:<6} errors={}",
            handle.status,
            handle.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            handle.active_agents,
            handle.memory_mb,
            handle.error_count,
        );
    }
}
