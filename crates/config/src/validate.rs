// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry-wide validation and cycle detection (§4.1).

use std::collections::{HashMap, HashSet};

use orch_core::{GlobalTuning, ProjectRecord};
use serde::{Deserialize, Serialize};

/// One violation found by `validate_configuration`. Never thrown — collected
/// and returned as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationIssue {
    MaxConcurrentExceedsTotal { max_concurrent: u32, max_total: u32 },
    DuplicatePath { path: String },
    MissingProjectPath { project: String, path: String },
    UnknownDependencyTarget { project: String, target: String },
    DependencyCycle { participants: Vec<String> },
}

/// Run every check in §4.1's documented order, collecting all violations.
pub fn validate_configuration(
    global: &GlobalTuning,
    projects: &HashMap<String, ProjectRecord>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if global.max_concurrent_projects > global.max_total_agents {
        issues.push(ValidationIssue::MaxConcurrentExceedsTotal {
            max_concurrent: global.max_concurrent_projects,
            max_total: global.max_total_agents,
        });
    }

    let mut seen_paths: HashMap<&std::path::Path, &str> = HashMap::new();
    for record in projects.values() {
        if let Some(other) = seen_paths.insert(&record.path, &record.name) {
            if other != record.name {
                issues.push(ValidationIssue::DuplicatePath {
                    path: record.path.display().to_string(),
                });
            }
        }
        if !record.path.exists() {
            issues.push(ValidationIssue::MissingProjectPath {
                project: record.name.clone(),
                path: record.path.display().to_string(),
            });
        }
    }

    for record in projects.values() {
        for dep in &record.dependencies {
            if !projects.contains_key(&dep.target_project) {
                issues.push(ValidationIssue::UnknownDependencyTarget {
                    project: record.name.clone(),
                    target: dep.target_project.clone(),
                });
            }
        }
    }

    if let Some(cycle) = find_any_cycle(projects) {
        issues.push(ValidationIssue::DependencyCycle { participants: cycle });
    }

    issues
}

/// DFS with a "visiting" set; a back-edge to a node still on the current
/// path is a cycle. Returns the first cycle found, or `None`.
fn find_any_cycle(projects: &HashMap<String, ProjectRecord>) -> Option<Vec<String>> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut visiting: Vec<&str> = Vec::new();

    for name in projects.keys() {
        if !visited.contains(name.as_str()) {
            if let Some(cycle) = dfs(name, projects, &mut visited, &mut visiting) {
                return Some(cycle);
            }
        }
    }
    None
}

fn dfs<'a>(
    node: &'a str,
    projects: &'a HashMap<String, ProjectRecord>,
    visited: &mut HashSet<&'a str>,
    visiting: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if let Some(pos) = visiting.iter().position(|n| *n == node) {
        return Some(visiting[pos..].iter().map(|s| s.to_string()).collect());
    }
    if visited.contains(node) {
        return None;
    }

    visiting.push(node);
    if let Some(record) = projects.get(node) {
        for dep in &record.dependencies {
            if let Some(cycle) = dfs(&dep.target_project, projects, visited, visiting) {
                return Some(cycle);
            }
        }
    }
    visiting.pop();
    visited.insert(node);
    None
}

/// Would adding `src -> dst` create a cycle in the prospective graph? Checked
/// before `add_project_dependency` commits the edge.
pub fn would_create_cycle(
    projects: &HashMap<String, ProjectRecord>,
    src: &str,
    dst: &str,
) -> bool {
    if src == dst {
        return true;
    }
    // dst can already (transitively) reach src: adding src->dst would close
    // the loop.
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack = vec![dst];
    while let Some(node) = stack.pop() {
        if node == src {
            return true;
        }
        if !visited.insert(node) {
            continue;
        }
        if let Some(record) = projects.get(node) {
            for dep in &record.dependencies {
                stack.push(&dep.target_project);
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
