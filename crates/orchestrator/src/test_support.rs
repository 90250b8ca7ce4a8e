// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes of the collaborator interfaces (§6), for exercising GO's
//! lifecycle and restart logic without a real child process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::GoError;
use crate::launch::project_name_from_args;
use crate::runtime::{ChildProcessRuntime, LaunchSpec, ProbeSample, ResourceProbe};

/// Per-project behaviour a [`FakeRuntime`] should exhibit, keyed by the
/// `--project-name` argument of the spawned command line (the pid doesn't
/// exist yet at the point a test wants to configure it).
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeBehavior {
    /// Exit immediately after spawn, as if the child crashed on startup.
    pub crash_immediately: bool,
    /// Don't actually die on `terminate()`; only `kill()` works.
    pub ignore_terminate: bool,
}

struct FakeProcess {
    alive: bool,
    ignore_terminate: bool,
    terminate_calls: u32,
    kill_calls: u32,
}

/// A [`ChildProcessRuntime`] that never touches the OS. Spawning allocates a
/// fake pid; liveness and signal delivery are driven entirely by the
/// configured [`FakeBehavior`] and subsequent `kill`/`terminate` calls.
#[derive(Default)]
pub struct FakeRuntime {
    next_pid: AtomicU32,
    processes: Mutex<HashMap<u32, FakeProcess>>,
    behaviors: Mutex<HashMap<String, FakeBehavior>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self { next_pid: AtomicU32::new(1), processes: Mutex::new(HashMap::new()), behaviors: Mutex::new(HashMap::new()) }
    }

    pub fn set_behavior(&self, project_name: impl Into<String>, behavior: FakeBehavior) {
        self.behaviors.lock().insert(project_name.into(), behavior);
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.processes.lock().get(&pid).map(|p| p.alive).unwrap_or(false)
    }

    pub fn terminate_calls(&self, pid: u32) -> u32 {
        self.processes.lock().get(&pid).map(|p| p.terminate_calls).unwrap_or(0)
    }

    pub fn kill_calls(&self, pid: u32) -> u32 {
        self.processes.lock().get(&pid).map(|p| p.kill_calls).unwrap_or(0)
    }

    /// Force an already-spawned, still-alive process to exit out from under
    /// the handle, simulating an unexpected crash.
    pub fn crash(&self, pid: u32) {
        if let Some(p) = self.processes.lock().get_mut(&pid) {
            p.alive = false;
        }
    }
}

#[async_trait]
impl ChildProcessRuntime for FakeRuntime {
    async fn spawn(&self, spec: LaunchSpec) -> Result<u32, GoError> {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let name = project_name_from_args(&spec.args).unwrap_or_default();
        let behavior = self.behaviors.lock().get(&name).copied().unwrap_or_default();
        self.processes.lock().insert(
            pid,
            FakeProcess {
                alive: !behavior.crash_immediately,
                ignore_terminate: behavior.ignore_terminate,
                terminate_calls: 0,
                kill_calls: 0,
            },
        );
        Ok(pid)
    }

    fn poll_exit(&self, pid: u32) -> Option<i32> {
        match self.processes.lock().get(&pid) {
            Some(p) if p.alive => None,
            Some(_) => Some(1),
            None => Some(-1),
        }
    }

    fn terminate(&self, pid: u32) -> Result<(), GoError> {
        let mut processes = self.processes.lock();
        if let Some(p) = processes.get_mut(&pid) {
            p.terminate_calls += 1;
            if !p.ignore_terminate {
                p.alive = false;
            }
        }
        Ok(())
    }

    fn kill(&self, pid: u32) -> Result<(), GoError> {
        let mut processes = self.processes.lock();
        if let Some(p) = processes.get_mut(&pid) {
            p.kill_calls += 1;
            p.alive = false;
        }
        Ok(())
    }

    fn stop(&self, _pid: u32) -> Result<(), GoError> {
        Ok(())
    }

    fn resume(&self, _pid: u32) -> Result<(), GoError> {
        Ok(())
    }
}

/// A [`ResourceProbe`] returning a fixed sample for every pid, or `None` if
/// configured absent.
pub struct FakeProbe {
    pub sample: Option<ProbeSample>,
}

#[async_trait]
impl ResourceProbe for FakeProbe {
    async fn probe(&self, _pid: u32) -> Option<ProbeSample> {
        self.sample
    }
}
