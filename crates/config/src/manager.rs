// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Configuration Manager: the authoritative, persisted project registry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use orch_core::{
    Criticality, DependencyKind, GlobalTuning, ProjectDependency, ProjectPriority, ProjectRecord,
    ProjectStatus, ResourceLimits,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::discover::{self, DiscoveredProject};
use crate::error::ConfigError;
use crate::raw::OnDiskConfig;
use crate::validate::{self, ValidationIssue};

/// Options accepted by `register_project`. Everything has a sane default so
/// callers only set what they care about.
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    pub priority: ProjectPriority,
    pub resource_limits: ResourceLimits,
    pub discord_channel: Option<String>,
    pub git_url: Option<String>,
}

struct Registry {
    global: GlobalTuning,
    projects: HashMap<String, ProjectRecord>,
}

/// Owns the persistent project registry. Safe to share across GO and RS via
/// `Arc<ConfigManager>`; all mutations go through `&self` and are serialised
/// internally.
pub struct ConfigManager {
    config_path: PathBuf,
    state: Mutex<Registry>,
}

impl ConfigManager {
    /// Construct an empty, unpersisted manager rooted at `config_path`. Call
    /// `load_configuration` to populate it from disk.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            state: Mutex::new(Registry { global: GlobalTuning::default(), projects: HashMap::new() }),
        }
    }

    /// Load the registry from `config_path`. A missing file is not an error
    /// (first run); a file that fails to parse logs one error and leaves the
    /// manager at its defaulted, empty state — load never propagates a
    /// failure to the caller (§7).
    pub fn load_configuration(&self) {
        let contents = match fs::read_to_string(&self.config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.config_path.display(), "no existing config file, starting empty");
                return;
            }
            Err(e) => {
                error!(path = %self.config_path.display(), error = %e, "failed to read config file");
                return;
            }
        };

        match serde_yaml::from_str::<OnDiskConfig>(&contents) {
            Ok(on_disk) => {
                let mut state = self.state.lock();
                state.global = on_disk.global;
                state.projects = on_disk.projects;
                info!(projects = state.projects.len(), "loaded configuration");
            }
            Err(e) => {
                error!(path = %self.config_path.display(), error = %e, "failed to parse config file, starting empty");
            }
        }
    }

    /// Atomic write: serialise to `<path>.tmp`, rename the existing file to
    /// `<path>.backup`, then rename the temp file into place.
    pub fn save_configuration(&self) -> Result<(), ConfigError> {
        let state = self.state.lock();
        let on_disk = OnDiskConfig { global: state.global.clone(), projects: state.projects.clone() };
        let yaml = serde_yaml::to_string(&on_disk)?;
        drop(state);

        let tmp_path = self.config_path.with_extension("yaml.tmp");
        fs::write(&tmp_path, yaml)?;

        if self.config_path.exists() {
            let backup_path = self.config_path.with_extension("yaml.backup");
            fs::rename(&self.config_path, &backup_path)?;
        }
        fs::rename(&tmp_path, &self.config_path)?;
        debug!(path = %self.config_path.display(), "saved configuration");
        Ok(())
    }

    pub fn global_tuning(&self) -> GlobalTuning {
        self.state.lock().global.clone()
    }

    pub fn set_global_tuning(&self, global: GlobalTuning) {
        self.state.lock().global = global;
    }

    /// Register a new project. Canonicalises `path`, creates
    /// `<path>/.orch-state/` and writes `project-config.json`, then persists
    /// the registry.
    pub fn register_project(
        &self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        options: RegisterOptions,
    ) -> Result<ProjectRecord, ConfigError> {
        let name = name.into();
        let path = path.into();

        if !path.exists() {
            return Err(ConfigError::PathMissing(path));
        }
        let canonical = path.canonicalize().map_err(ConfigError::PersistenceFailure)?;

        {
            let state = self.state.lock();
            if state.projects.contains_key(&name) {
                return Err(ConfigError::AlreadyExists(name));
            }
            if state.projects.values().any(|p| p.path == canonical) {
                return Err(ConfigError::PathDuplicate(canonical));
            }
        }

        let record = ProjectRecord {
            name: name.clone(),
            path: canonical.clone(),
            priority: options.priority,
            status: ProjectStatus::Initializing,
            resource_limits: options.resource_limits.normalized(),
            dependencies: Vec::new(),
            discord_channel: options.discord_channel,
            git_url: options.git_url,
            created_at: Utc::now(),
            last_activity: None,
        };

        write_project_marker(&canonical, &record)?;

        self.state.lock().projects.insert(name.clone(), record.clone());
        self.save_configuration()?;
        info!(project = %name, path = %canonical.display(), "registered project");
        Ok(record)
    }

    /// Idempotent: returns `true` iff a project named `name` was present.
    pub fn remove_project(&self, name: &str) -> bool {
        let removed = self.state.lock().projects.remove(name).is_some();
        if removed {
            if let Err(e) = self.save_configuration() {
                error!(project = %name, error = %e, "failed to persist after remove_project");
            }
            info!(project = %name, "removed project");
        }
        removed
    }

    pub fn update_project_status(&self, name: &str, status: ProjectStatus) -> bool {
        let updated = {
            let mut state = self.state.lock();
            match state.projects.get_mut(name) {
                Some(record) => {
                    record.status = status;
                    record.last_activity = Some(Utc::now());
                    true
                }
                None => false,
            }
        };
        if updated {
            if let Err(e) = self.save_configuration() {
                error!(project = %name, error = %e, "failed to persist after update_project_status");
            }
        }
        updated
    }

    /// Add a dependency edge, rejecting it if it would close a cycle in the
    /// prospective graph (checked before the edge is committed).
    pub fn add_project_dependency(
        &self,
        src: &str,
        dst: &str,
        kind: DependencyKind,
        criticality: Criticality,
    ) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        if !state.projects.contains_key(src) {
            return Err(ConfigError::UnknownProject(src.to_string()));
        }
        if !state.projects.contains_key(dst) {
            return Err(ConfigError::UnknownProject(dst.to_string()));
        }
        if validate::would_create_cycle(&state.projects, src, dst) {
            warn!(src, dst, "rejected dependency: would create a cycle");
            return Err(ConfigError::WouldCycle { src: src.to_string(), dst: dst.to_string() });
        }

        let Some(record) = state.projects.get_mut(src) else {
            return Err(ConfigError::UnknownProject(src.to_string()));
        };
        record.dependencies.push(ProjectDependency {
            target_project: dst.to_string(),
            dependency_type: kind,
            description: String::new(),
            criticality,
        });
        drop(state);
        self.save_configuration()?;
        Ok(())
    }

    pub fn list_projects(&self) -> Vec<ProjectRecord> {
        self.state.lock().projects.values().cloned().collect()
    }

    pub fn get_project(&self, name: &str) -> Option<ProjectRecord> {
        self.state.lock().projects.get(name).cloned()
    }

    pub fn get_active_projects(&self) -> Vec<ProjectRecord> {
        self.state
            .lock()
            .projects
            .values()
            .filter(|p| p.status == ProjectStatus::Active)
            .cloned()
            .collect()
    }

    pub fn get_project_dependencies(&self, name: &str) -> Vec<ProjectDependency> {
        self.state.lock().projects.get(name).map(|p| p.dependencies.clone()).unwrap_or_default()
    }

    pub fn get_dependent_projects(&self, name: &str) -> Vec<String> {
        self.state
            .lock()
            .projects
            .values()
            .filter(|p| p.dependencies.iter().any(|d| d.target_project == name))
            .map(|p| p.name.clone())
            .collect()
    }

    /// Scan `search_paths` one level deep; never mutates the registry.
    pub fn discover_projects(&self, search_paths: &[PathBuf]) -> Vec<DiscoveredProject> {
        search_paths.iter().flat_map(|p| discover::discover_in(p)).collect()
    }

    pub fn validate_configuration(&self) -> Vec<ValidationIssue> {
        let state = self.state.lock();
        validate::validate_configuration(&state.global, &state.projects)
    }
}

/// Write `<path>/.orch-state/project-config.json`, a snapshot of `record` at
/// registration time, creating the directory if needed.
fn write_project_marker(path: &Path, record: &ProjectRecord) -> Result<(), ConfigError> {
    let state_dir = path.join(".orch-state");
    fs::create_dir_all(&state_dir)?;
    let marker_path = state_dir.join("project-config.json");
    let json = serde_json::to_string_pretty(record).map_err(|e| {
        ConfigError::PersistenceFailure(std::io::Error::new(std::io::ErrorKind::Other, e))
    })?;
    fs::write(marker_path, json)?;
    Ok(())
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
