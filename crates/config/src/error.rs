// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by Configuration Manager mutations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("project {0:?} already exists")]
    AlreadyExists(String),
    #[error("project path does not exist: {0}")]
    PathMissing(PathBuf),
    #[error("project path already registered to another project: {0}")]
    PathDuplicate(PathBuf),
    #[error("unknown project: {0:?}")]
    UnknownProject(String),
    #[error("dependency {src:?} -> {dst:?} would create a cycle")]
    WouldCycle { src: String, dst: String },
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
    #[error("failed to persist configuration: {0}")]
    PersistenceFailure(#[from] std::io::Error),
}
