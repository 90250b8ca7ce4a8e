// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-mutating project discovery (§4.1, §6): one level under each search
//! path, classified by the presence of `.orch-state/`, `.git/`, and a
//! language marker file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Classification bucket for a candidate directory, in the order they are
/// checked: `.orch-state/` wins over `.git/`, which wins over `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectClassification {
    OrchExisting,
    Git,
    Unknown,
}

impl std::fmt::Display for ProjectClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ProjectClassification::OrchExisting => "orch_existing",
            ProjectClassification::Git => "git",
            ProjectClassification::Unknown => "unknown",
        })
    }
}

/// A directory found by `discover_projects`, not yet registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredProject {
    pub name: String,
    pub path: PathBuf,
    pub classification: ProjectClassification,
    pub language: Option<String>,
    pub git_url: Option<String>,
}

const LANGUAGE_MARKERS: &[(&str, &str)] = &[
    ("package.json", "nodejs"),
    ("requirements.txt", "python"),
    ("Cargo.toml", "rust"),
    ("pom.xml", "java"),
    ("go.mod", "go"),
];

/// Scan one level under `search_path` and classify every child directory.
/// Never touches the registry.
pub fn discover_in(search_path: &Path) -> Vec<DiscoveredProject> {
    let Ok(entries) = fs::read_dir(search_path) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        found.push(classify(&path));
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

fn classify(path: &Path) -> DiscoveredProject {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let classification = if path.join(".orch-state").is_dir() {
        ProjectClassification::OrchExisting
    } else if path.join(".git").exists() {
        ProjectClassification::Git
    } else {
        ProjectClassification::Unknown
    };

    let language = LANGUAGE_MARKERS
        .iter()
        .find(|(marker, _)| path.join(marker).exists())
        .map(|(_, lang)| (*lang).to_string());

    let git_url = if classification == ProjectClassification::Git {
        read_origin_url(&path.join(".git").join("config"))
    } else {
        None
    };

    DiscoveredProject { name, path: path.to_path_buf(), classification, language, git_url }
}

/// Parse `[remote "origin"] url = ...` out of a `.git/config` file.
/// Returns `None` on any I/O or parse failure — this is informational only.
fn read_origin_url(git_config_path: &Path) -> Option<String> {
    let contents = fs::read_to_string(git_config_path).ok()?;
    let mut in_origin = false;
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_origin = trimmed.eq_ignore_ascii_case(r#"[remote "origin"]"#);
            continue;
        }
        if in_origin {
            if let Some(rest) = trimmed.strip_prefix("url") {
                if let Some(url) = rest.trim_start().strip_prefix('=') {
                    return Some(url.trim().to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
