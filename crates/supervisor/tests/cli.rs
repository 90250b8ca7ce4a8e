// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI-level smoke tests for `multi-project-orchestrator` (§6).

use std::fs;

use assert_cmd::Command;
use orch_config::ConfigManager;
use tempfile::tempdir;

#[test]
fn register_then_status_reports_the_project() {
    let root = tempdir().unwrap();
    let config_path = root.path().join("orch-config.yaml");
    let project = root.path().join("demo");
    fs::create_dir_all(&project).unwrap();

    Command::cargo_bin("multi-project-orchestrator")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("--register")
        .arg("demo")
        .arg(&project)
        .assert()
        .success();

    let output = Command::cargo_bin("multi-project-orchestrator")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("--status")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let status: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(status["total_projects"], 1);
}

#[test]
fn discover_auto_registers_with_expected_priorities() {
    let root = tempdir().unwrap();
    let config_path = root.path().join("orch-config.yaml");

    let existing_project = root.path().join("already-orch");
    fs::create_dir_all(existing_project.join(".orch-state")).unwrap();
    let unknown_project = root.path().join("plain-dir");
    fs::create_dir_all(&unknown_project).unwrap();

    Command::cargo_bin("multi-project-orchestrator")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("--discover")
        .arg(root.path())
        .assert()
        .success();

    let cm = ConfigManager::new(config_path);
    cm.load_configuration();
    let projects = cm.list_projects();
    assert_eq!(projects.len(), 2);

    let existing = projects.iter().find(|p| p.name == "already-orch").unwrap();
    assert_eq!(existing.priority, orch_core::ProjectPriority::High);

    let unknown = projects.iter().find(|p| p.name == "plain-dir").unwrap();
    assert_eq!(unknown.priority, orch_core::ProjectPriority::Normal);
}

#[test]
fn register_rejects_a_duplicate_name() {
    let root = tempdir().unwrap();
    let config_path = root.path().join("orch-config.yaml");
    let project = root.path().join("demo");
    fs::create_dir_all(&project).unwrap();

    Command::cargo_bin("multi-project-orchestrator")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("--register")
        .arg("demo")
        .arg(&project)
        .assert()
        .success();

    Command::cargo_bin("multi-project-orchestrator")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("--register")
        .arg("demo")
        .arg(&project)
        .assert()
        .failure();
}
