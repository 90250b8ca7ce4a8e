// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed errors for the Global Orchestrator (§7).
//!
//! Lifecycle operations (start/stop/pause/resume_project) surface failure as
//! `bool` + a logged line, per the propagation policy — `GoError` exists for
//! the few paths that must surface a typed cause: supervisor-level `start()`
//! and the platform check ahead of every signal send.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoError {
    #[error("failed to create global state directory {0}: {1}")]
    StateDirFailure(PathBuf, std::io::Error),

    #[error("failed to spawn child process for project '{0}': {1}")]
    SpawnFailure(String, std::io::Error),

    #[error("failed to send {signal} to pid {pid}: {source}")]
    SignalFailure { pid: u32, signal: &'static str, source: String },

    #[error("project '{0}' did not exit within the graceful-stop timeout")]
    StopTimeout(String),

    #[error("project '{0}' is not known to the configuration manager")]
    UnknownProject(String),

    #[error("job-control signals are not supported on this platform")]
    UnsupportedPlatform,
}
