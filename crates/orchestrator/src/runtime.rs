// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborator interfaces the Global Orchestrator consumes (§6): the child
//! process runtime and the optional resource probe, plus the production
//! `tokio::process`-backed implementation of the former.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::GoError;

/// Everything needed to launch one child process (§6 launch contract).
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Environment variables added on top of the inherited parent environment.
    pub envs: Vec<(String, String)>,
    pub working_dir: PathBuf,
}

/// A sampled resource reading for one running child.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSample {
    pub cpu_percent: f64,
    pub rss_mb: u64,
}

/// Spawn, signal, wait, and poll a child process. Implementations own
/// whatever process handle their runtime needs to keep alive between calls.
#[async_trait]
pub trait ChildProcessRuntime: Send + Sync {
    async fn spawn(&self, spec: LaunchSpec) -> Result<u32, GoError>;

    /// Non-blocking: `None` while still running, `Some(code)` once exited.
    fn poll_exit(&self, pid: u32) -> Option<i32>;

    fn terminate(&self, pid: u32) -> Result<(), GoError>;
    fn kill(&self, pid: u32) -> Result<(), GoError>;

    /// OS job-control "stop" (SIGSTOP equivalent). Platforms without
    /// job-control semantics must return `GoError::UnsupportedPlatform`.
    fn stop(&self, pid: u32) -> Result<(), GoError>;

    /// OS job-control "continue" (SIGCONT equivalent). See `stop`.
    fn resume(&self, pid: u32) -> Result<(), GoError>;
}

/// Optional per-pid resource sampler. Absence is not an error — the
/// monitoring loop simply skips the sample (§4.3, §6).
#[async_trait]
pub trait ResourceProbe: Send + Sync {
    async fn probe(&self, pid: u32) -> Option<ProbeSample>;
}

/// `tokio::process`-backed runtime. Owns every spawned `Child` so later
/// calls can poll/signal it by pid.
pub struct TokioProcessRuntime {
    children: Mutex<HashMap<u32, tokio::process::Child>>,
}

impl Default for TokioProcessRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioProcessRuntime {
    pub fn new() -> Self {
        Self { children: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl ChildProcessRuntime for TokioProcessRuntime {
    async fn spawn(&self, spec: LaunchSpec) -> Result<u32, GoError> {
        let mut command = tokio::process::Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());

        let child = command.spawn().map_err(|e| GoError::SpawnFailure(spec.program.clone(), e))?;
        let pid = child.id().ok_or_else(|| {
            GoError::SpawnFailure(spec.program.clone(), std::io::Error::other("child exited before a pid was observed"))
        })?;
        self.children.lock().insert(pid, child);
        Ok(pid)
    }

    fn poll_exit(&self, pid: u32) -> Option<i32> {
        let mut children = self.children.lock();
        let Some(child) = children.get_mut(&pid) else { return Some(-1) };
        match child.try_wait() {
            Ok(Some(status)) => {
                children.remove(&pid);
                Some(status.code().unwrap_or(-1))
            }
            Ok(None) => None,
            Err(e) => {
                warn!(pid, error = %e, "failed to poll child exit status");
                None
            }
        }
    }

    fn terminate(&self, pid: u32) -> Result<(), GoError> {
        send_signal(pid, "terminate", unix_signal::sigterm)
    }

    fn kill(&self, pid: u32) -> Result<(), GoError> {
        send_signal(pid, "kill", unix_signal::sigkill)
    }

    fn stop(&self, pid: u32) -> Result<(), GoError> {
        send_signal(pid, "stop", unix_signal::sigstop)
    }

    fn resume(&self, pid: u32) -> Result<(), GoError> {
        send_signal(pid, "continue", unix_signal::sigcont)
    }
}

fn send_signal(pid: u32, name: &'static str, f: fn(u32) -> Result<(), String>) -> Result<(), GoError> {
    debug!(pid, signal = name, "sending signal");
    f(pid).map_err(|source| GoError::SignalFailure { pid, signal: name, source })
}

#[cfg(unix)]
mod unix_signal {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    fn kill(pid: u32, signal: Signal) -> Result<(), String> {
        signal::kill(Pid::from_raw(pid as i32), signal).map_err(|e| e.to_string())
    }

    pub fn sigterm(pid: u32) -> Result<(), String> {
        kill(pid, Signal::SIGTERM)
    }

    pub fn sigkill(pid: u32) -> Result<(), String> {
        kill(pid, Signal::SIGKILL)
    }

    pub fn sigstop(pid: u32) -> Result<(), String> {
        kill(pid, Signal::SIGSTOP)
    }

    pub fn sigcont(pid: u32) -> Result<(), String> {
        kill(pid, Signal::SIGCONT)
    }
}

#[cfg(not(unix))]
mod unix_signal {
    pub fn sigterm(_pid: u32) -> Result<(), String> {
        Err("job-control signals are not supported on this platform".to_string())
    }

    pub fn sigkill(pid: u32) -> Result<(), String> {
        sigterm(pid)
    }

    pub fn sigstop(pid: u32) -> Result<(), String> {
        sigterm(pid)
    }

    pub fn sigcont(pid: u32) -> Result<(), String> {
        sigterm(pid)
    }
}
