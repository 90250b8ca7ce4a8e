// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::PathBuf;

use orch_core::{DependencyKind, ProjectDependency, ProjectRecord};

use super::*;

fn project(name: &str, deps: &[&str]) -> ProjectRecord {
    let mut record = ProjectRecord::builder().name(name).path(PathBuf::from(format!("/tmp/{name}"))).build();
    record.dependencies = deps
        .iter()
        .map(|d| ProjectDependency {
            target_project: d.to_string(),
            dependency_type: DependencyKind::Blocks,
            description: String::new(),
            criticality: Default::default(),
        })
        .collect();
    record
}

#[test]
fn no_cycle_in_acyclic_chain() {
    let mut projects = HashMap::new();
    projects.insert("a".to_string(), project("a", &["b"]));
    projects.insert("b".to_string(), project("b", &["c"]));
    projects.insert("c".to_string(), project("c", &[]));
    assert!(find_any_cycle(&projects).is_none());
}

#[test]
fn detects_a_three_cycle() {
    let mut projects = HashMap::new();
    projects.insert("a".to_string(), project("a", &["b"]));
    projects.insert("b".to_string(), project("b", &["c"]));
    projects.insert("c".to_string(), project("c", &["a"]));
    assert!(find_any_cycle(&projects).is_some());
}

#[test]
fn would_create_cycle_detects_prospective_closing_edge() {
    let mut projects = HashMap::new();
    projects.insert("a".to_string(), project("a", &["b"]));
    projects.insert("b".to_string(), project("b", &["c"]));
    projects.insert("c".to_string(), project("c", &[]));

    assert!(would_create_cycle(&projects, "c", "a"));
    assert!(!would_create_cycle(&projects, "c", "b"));
}

#[test]
fn would_create_cycle_rejects_self_edge() {
    let mut projects = HashMap::new();
    projects.insert("a".to_string(), project("a", &[]));
    assert!(would_create_cycle(&projects, "a", "a"));
}

#[test]
fn validate_configuration_reports_missing_dependency_target() {
    let mut projects = HashMap::new();
    projects.insert("a".to_string(), project("a", &["ghost"]));
    let issues = validate_configuration(&GlobalTuning::default(), &projects);
    assert!(issues
        .iter()
        .any(|i| matches!(i, ValidationIssue::UnknownDependencyTarget { target, .. } if target == "ghost")));
}

#[test]
fn validate_configuration_reports_max_concurrent_exceeding_total() {
    let global = GlobalTuning { max_total_agents: 4, max_concurrent_projects: 10, ..GlobalTuning::default() };
    let issues = validate_configuration(&global, &HashMap::new());
    assert!(issues.iter().any(|i| matches!(i, ValidationIssue::MaxConcurrentExceedsTotal { .. })));
}
