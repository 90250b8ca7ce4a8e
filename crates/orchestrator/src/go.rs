// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Global Orchestrator: maps every ACTIVE project to a running child
//! process and drives it through the §4.3 lifecycle state machine.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use orch_config::ConfigManager;
use orch_core::{ChildHandle, ChildStatus, ProjectRecord, ProjectStatus, ResourceQuota};
use orch_scheduler::ResourceScheduler;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::GoError;
use crate::launch::build_launch_spec;
use crate::loops;
use crate::runtime::{ChildProcessRuntime, ResourceProbe};
use crate::status::{GlobalStatus, SupervisorState};

/// Graceful-stop timeout before escalating to a forced kill (§4.3, §5).
pub const GRACEFUL_STOP_TIMEOUT: Duration = Duration::from_secs(30);
/// Delay after spawn before the first liveness probe (§4.3 `start_project` step 7).
pub const STARTUP_PROBE_DELAY: Duration = Duration::from_secs(2);
/// Heartbeat staleness threshold before the health loop warns (§4.3, §5).
pub const HEARTBEAT_STALE_THRESHOLD: Duration = Duration::from_secs(5 * 60);
/// Pause between a restart's stop and its subsequent start (§4.3 item 4).
pub const RESTART_BACKOFF: Duration = Duration::from_secs(5);
/// Poll cadence while waiting for a child to exit during graceful stop.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Owns the handle map and drives every per-project lifecycle operation and
/// background loop. Constructed once per process and shared as `Arc<Self>`
/// so the background loops (which must be `'static`) can hold a clone.
pub struct GlobalOrchestrator {
    config: Arc<ConfigManager>,
    scheduler: Option<Arc<ResourceScheduler>>,
    runtime: Arc<dyn ChildProcessRuntime>,
    probe: Option<Arc<dyn ResourceProbe>>,
    global_state_path: PathBuf,
    handles: Mutex<HashMap<String, ChildHandle>>,
    state: Mutex<SupervisorState>,
    cancel: Mutex<CancellationToken>,
    loop_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl GlobalOrchestrator {
    pub fn new(
        config: Arc<ConfigManager>,
        scheduler: Option<Arc<ResourceScheduler>>,
        runtime: Arc<dyn ChildProcessRuntime>,
        probe: Option<Arc<dyn ResourceProbe>>,
        global_state_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            scheduler,
            runtime,
            probe,
            global_state_path: global_state_path.into(),
            handles: Mutex::new(HashMap::new()),
            state: Mutex::new(SupervisorState::Stopped),
            cancel: Mutex::new(CancellationToken::new()),
            loop_handles: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.lock()
    }

    /// Guards against double-start; creates the global state directory;
    /// spawns the four background loops; starts every ACTIVE project from
    /// the config manager.
    pub async fn start(self: &Arc<Self>) -> Result<(), GoError> {
        {
            let mut state = self.state.lock();
            if matches!(*state, SupervisorState::Starting | SupervisorState::Running) {
                return Ok(());
            }
            *state = SupervisorState::Starting;
        }

        if let Err(e) = std::fs::create_dir_all(&self.global_state_path) {
            *self.state.lock() = SupervisorState::Error;
            return Err(GoError::StateDirFailure(self.global_state_path.clone(), e));
        }

        let tuning = self.config.global_tuning();
        let scheduling_interval = Duration::from_secs(tuning.scheduling_interval_seconds.max(1));
        let rebalance_interval = Duration::from_secs(tuning.resource_rebalance_interval_seconds.max(1));
        let health_interval = Duration::from_secs(tuning.health_check_interval_seconds.max(1));

        let cancel = CancellationToken::new();
        *self.cancel.lock() = cancel.clone();

        let spawned = vec![
            tokio::spawn(loops::monitoring_loop(Arc::clone(self), scheduling_interval, cancel.clone())),
            tokio::spawn(loops::scheduling_loop(Arc::clone(self), scheduling_interval, cancel.clone())),
            tokio::spawn(loops::resource_balancing_loop(Arc::clone(self), rebalance_interval, cancel.clone())),
            tokio::spawn(loops::health_check_loop(Arc::clone(self), health_interval, cancel)),
        ];
        *self.loop_handles.lock() = spawned;

        let active_projects = self.config.get_active_projects();
        let starts = active_projects.iter().map(|p| self.start_project(&p.name));
        futures_util::future::join_all(starts).await;

        *self.state.lock() = SupervisorState::Running;
        info!(projects = active_projects.len(), "global orchestrator started");
        Ok(())
    }

    /// Graceful teardown: stops every handle concurrently, cancels the
    /// background loops, and waits for them to exit.
    pub async fn stop(self: &Arc<Self>) {
        self.stop_all_projects().await;
        self.cancel.lock().cancel();

        let handles: Vec<_> = self.loop_handles.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        *self.state.lock() = SupervisorState::Stopped;
        info!("global orchestrator stopped");
    }

    /// §4.3 `start_project`. Idempotent while the handle is already
    /// `Starting`/`Running`. Never throws out of; every failure is reported
    /// as `false` plus a logged cause.
    pub async fn start_project(&self, name: &str) -> bool {
        let Some(project) = self.config.get_project(name) else {
            warn!(project = name, "start_project: unknown project");
            return false;
        };

        if let Some(handle) = self.handles.lock().get(name) {
            if matches!(handle.status, ChildStatus::Running | ChildStatus::Starting) {
                return true;
            }
        }

        let quota = self.resolve_quota(&project);
        let spec = build_launch_spec(&project, &quota);

        let pid = match self.runtime.spawn(spec).await {
            Ok(pid) => pid,
            Err(e) => {
                warn!(project = name, error = %e, "failed to spawn child process");
                self.set_handle_status(name, &project, ChildStatus::Error);
                return false;
            }
        };

        {
            let mut handles = self.handles.lock();
            let handle =
                handles.entry(name.to_string()).or_insert_with(|| ChildHandle::new(name, project.path.clone()));
            handle.status = ChildStatus::Starting;
            handle.pid = Some(pid);
            handle.start_time = Some(Utc::now());
            handle.last_heartbeat = Some(Utc::now());
        }

        tokio::time::sleep(STARTUP_PROBE_DELAY).await;

        if self.runtime.poll_exit(pid).is_some() {
            self.set_handle_status(name, &project, ChildStatus::Crashed);
            warn!(project = name, "child exited before completing startup");
            return false;
        }

        self.set_handle_status(name, &project, ChildStatus::Running);
        self.config.update_project_status(name, ProjectStatus::Active);
        info!(project = name, pid, "project started");
        true
    }

    /// §4.3 `stop_project`. Sends terminate, waits up to 30 s, escalates to
    /// kill on timeout. Drops the scheduler allocation unconditionally.
    pub async fn stop_project(&self, name: &str) -> bool {
        let pid = match self.handles.lock().get(name) {
            Some(handle) => handle.pid,
            None => return false,
        };

        let Some(pid) = pid else {
            self.finish_stop(name);
            return true;
        };

        self.transition(name, ChildStatus::Stopping);

        if let Err(e) = self.runtime.terminate(pid) {
            warn!(project = name, error = %e, "failed to send terminate signal");
            self.revert_status(name, ChildStatus::Error);
            return false;
        }

        if !self.wait_for_exit(pid, GRACEFUL_STOP_TIMEOUT).await {
            warn!(project = name, "graceful terminate timed out, escalating to kill");
            if let Err(e) = self.runtime.kill(pid) {
                warn!(project = name, error = %e, "failed to send kill signal");
                self.revert_status(name, ChildStatus::Error);
                return false;
            }
            self.wait_for_exit(pid, GRACEFUL_STOP_TIMEOUT).await;
        }

        self.finish_stop(name);
        true
    }

    fn finish_stop(&self, name: &str) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.unregister_project(name);
        }
        let mut handles = self.handles.lock();
        if let Some(handle) = handles.get_mut(name) {
            handle.status = ChildStatus::Stopped;
            handle.pid = None;
        }
        info!(project = name, "project stopped");
    }

    /// Fan out `stop_project` to every known handle concurrently.
    pub async fn stop_all_projects(&self) {
        let names: Vec<String> = self.handles.lock().keys().cloned().collect();
        let stops = names.iter().map(|name| self.stop_project(name));
        futures_util::future::join_all(stops).await;
    }

    /// §4.3 `pause_project`. Only valid from `Running`; signal failures
    /// revert the attempted `Pausing` transition and leave the handle in
    /// its prior state.
    pub async fn pause_project(&self, name: &str) -> bool {
        let pid = match self.handles.lock().get(name) {
            Some(handle) if handle.status == ChildStatus::Running => handle.pid,
            _ => return false,
        };
        let Some(pid) = pid else { return false };

        self.transition(name, ChildStatus::Pausing);
        match self.runtime.stop(pid) {
            Ok(()) => {
                self.transition(name, ChildStatus::Paused);
                true
            }
            Err(e) => {
                warn!(project = name, error = %e, "pause signal failed");
                self.revert_status(name, ChildStatus::Running);
                false
            }
        }
    }

    /// §4.3 `resume_project`. Only valid from `Paused`; signal failures
    /// leave the handle untouched (still `Paused`).
    pub async fn resume_project(&self, name: &str) -> bool {
        let pid = match self.handles.lock().get(name) {
            Some(handle) if handle.status == ChildStatus::Paused => handle.pid,
            _ => return false,
        };
        let Some(pid) = pid else { return false };

        match self.runtime.resume(pid) {
            Ok(()) => {
                self.transition(name, ChildStatus::Running);
                true
            }
            Err(e) => {
                warn!(project = name, error = %e, "resume signal failed");
                false
            }
        }
    }

    /// Consistent, per-handle snapshot (§8 invariant 5): taken under a
    /// single lock acquisition so no lifecycle transition can interleave.
    pub fn get_global_status(&self) -> GlobalStatus {
        let handles = self.handles.lock();
        let active_projects = handles.values().filter(|h| h.status == ChildStatus::Running).count();
        let total_agents = handles.values().map(|h| h.active_agents).sum();
        let total_memory_mb = handles.values().map(|h| h.memory_mb).sum();
        let total_cpu_percent = handles.values().map(|h| h.cpu_usage).sum();

        GlobalStatus {
            supervisor_state: self.state(),
            total_projects: handles.len(),
            active_projects,
            total_agents,
            total_memory_mb,
            total_cpu_percent,
            projects: handles.clone(),
        }
    }

    pub fn handle(&self, name: &str) -> Option<ChildHandle> {
        self.handles.lock().get(name).cloned()
    }

    /// §4.3 monitoring loop body: poll every handle's exit status, sample
    /// resource usage where a probe is available, and log the recomputed
    /// aggregate metrics.
    pub(crate) async fn monitoring_tick(&self) {
        let entries: Vec<(String, Option<u32>, ChildStatus)> =
            self.handles.lock().iter().map(|(n, h)| (n.clone(), h.pid, h.status)).collect();

        for (name, pid, status) in entries {
            let Some(pid) = pid else { continue };

            if matches!(status, ChildStatus::Running | ChildStatus::Starting) && status != ChildStatus::Stopping {
                if self.runtime.poll_exit(pid).is_some() {
                    let mut handles = self.handles.lock();
                    if let Some(handle) = handles.get_mut(&name) {
                        handle.status = ChildStatus::Crashed;
                        handle.error_count += 1;
                    }
                    warn!(project = %name, "child process exited unexpectedly");
                    continue;
                }
            }

            if status == ChildStatus::Running {
                if let Some(probe) = &self.probe {
                    if let Some(sample) = probe.probe(pid).await {
                        let mut handles = self.handles.lock();
                        if let Some(handle) = handles.get_mut(&name) {
                            handle.cpu_usage = sample.cpu_percent;
                            handle.memory_mb = sample.rss_mb;
                            handle.last_heartbeat = Some(Utc::now());
                        }
                    }
                }
            }
        }

        let status = self.get_global_status();
        debug!(
            total_projects = status.total_projects,
            active_projects = status.active_projects,
            total_agents = status.total_agents,
            total_memory_mb = status.total_memory_mb,
            "monitoring tick complete"
        );
    }

    /// §4.3 item 2: the cross-project coordination hook. No-op in the core
    /// — the seam exists so a future strategy can plug in without changing
    /// the loop plumbing.
    pub(crate) async fn scheduling_tick(&self) {
        trace!("scheduling loop tick (no cross-project coordination hooks registered)");
    }

    /// §4.3 item 3: delegate to the scheduler's rebalancing pass.
    pub(crate) async fn resource_balancing_tick(&self) {
        let Some(scheduler) = &self.scheduler else { return };
        let result = scheduler.optimise_allocation();
        debug!(
            strategy = %result.strategy_used,
            changes = result.changes.len(),
            "resource balancing tick complete"
        );
    }

    /// §4.3 item 4: heartbeat staleness warnings, plus bounded automatic
    /// restart of crashed handles. The wait between stop and start is
    /// cancellable so `stop()` doesn't block on it.
    pub(crate) async fn health_check_tick(&self, cancel: &CancellationToken) {
        let now = Utc::now();
        let stale_threshold = chrono::Duration::from_std(HEARTBEAT_STALE_THRESHOLD).unwrap_or(chrono::Duration::zero());

        let stale: Vec<String> = {
            let handles = self.handles.lock();
            handles
                .iter()
                .filter(|(_, h)| h.status == ChildStatus::Running)
                .filter(|(_, h)| h.last_heartbeat.is_some_and(|t| now - t > stale_threshold))
                .map(|(name, _)| name.clone())
                .collect()
        };
        for name in &stale {
            warn!(project = %name, "no heartbeat in over 5 minutes");
        }

        let restartable: Vec<String> = {
            let handles = self.handles.lock();
            handles
                .iter()
                .filter(|(_, h)| h.status == ChildStatus::Crashed && h.can_restart())
                .map(|(name, _)| name.clone())
                .collect()
        };

        for name in restartable {
            {
                let mut handles = self.handles.lock();
                if let Some(handle) = handles.get_mut(&name) {
                    handle.restart_count += 1;
                }
            }
            info!(project = %name, "attempting automatic restart");
            self.stop_project(&name).await;

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(RESTART_BACKOFF) => {}
            }

            self.start_project(&name).await;
        }
    }

    fn resolve_quota(&self, project: &ProjectRecord) -> ResourceQuota {
        if let Some(scheduler) = &self.scheduler {
            if let Some(quota) = scheduler.get_project_allocation(&project.name) {
                return quota;
            }
            if scheduler.register_project(project) {
                if let Some(quota) = scheduler.get_project_allocation(&project.name) {
                    return quota;
                }
            }
            warn!(project = %project.name, "scheduler present but could not allocate, using local fallback");
        }
        self.local_fallback_allocation(project)
    }

    /// §4.3 step 3 fallback: the same §4.2.1 formula the scheduler uses,
    /// computed locally against the currently-running handle set when RS is
    /// absent or declines to allocate.
    fn local_fallback_allocation(&self, project: &ProjectRecord) -> ResourceQuota {
        let tuning = self.config.global_tuning();

        let mut active_count: u32 = 1;
        let mut sum_weights = project.priority.weight();
        {
            let handles = self.handles.lock();
            for (other_name, handle) in handles.iter() {
                if other_name == &project.name {
                    continue;
                }
                if matches!(handle.status, ChildStatus::Running | ChildStatus::Starting) {
                    active_count += 1;
                    if let Some(other) = self.config.get_project(other_name) {
                        sum_weights += other.priority.weight();
                    }
                }
            }
        }

        let pool = orch_scheduler::allocation::PoolTotals {
            agents: tuning.max_total_agents,
            memory_mb: tuning.global_memory_limit_gb * 1024,
            disk_mb: tuning.global_disk_limit_gb * 1024,
        };

        orch_scheduler::allocation::initial_allocation(
            tuning.resource_allocation_strategy,
            project.priority,
            &project.resource_limits,
            active_count,
            sum_weights,
            &pool,
        )
    }

    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.runtime.poll_exit(pid).is_some() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    fn set_handle_status(&self, name: &str, project: &ProjectRecord, status: ChildStatus) {
        let mut handles = self.handles.lock();
        let handle = handles.entry(name.to_string()).or_insert_with(|| ChildHandle::new(name, project.path.clone()));
        handle.status = status;
    }

    /// Move `name`'s handle to `to`, asserting the edge is valid per the
    /// §4.3 state machine in debug builds.
    fn transition(&self, name: &str, to: ChildStatus) {
        let mut handles = self.handles.lock();
        if let Some(handle) = handles.get_mut(name) {
            debug_assert!(
                handle.status.can_transition_to(to),
                "invalid handle transition {:?} -> {:?}",
                handle.status,
                to
            );
            handle.status = to;
        }
    }

    /// Force `name`'s handle back to `to` without an edge-validity check —
    /// used to undo an attempted transition after the operation behind it
    /// failed (§7: pause/resume/stop failures surface as `false`, not a
    /// stuck intermediate status).
    fn revert_status(&self, name: &str, to: ChildStatus) {
        if let Some(handle) = self.handles.lock().get_mut(name) {
            handle.status = to;
        }
    }
}

#[cfg(test)]
#[path = "go_tests.rs"]
mod tests;
