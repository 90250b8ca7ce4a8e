// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires CM → RS → GO (§2 data flow) and spawns the two Resource Scheduler
//! background loops that have no other driver in the Global Orchestrator's
//! four loops: task admission (§4.2.3, every 10 s) and system-wide
//! monitoring (§4.2.4, every 60 s).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use orch_config::ConfigManager;
use orch_orchestrator::{GlobalOrchestrator, TokioProcessRuntime};
use orch_scheduler::ResourceScheduler;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Task-admission cadence (§4.2.3).
const TASK_ADMISSION_INTERVAL: Duration = Duration::from_secs(10);
/// RS-wide system monitoring cadence (§4.2.4).
const SYSTEM_MONITORING_INTERVAL: Duration = Duration::from_secs(60);

pub struct Supervisor {
    pub config: Arc<ConfigManager>,
    pub scheduler: Arc<ResourceScheduler>,
    pub go: Arc<GlobalOrchestrator>,
    rs_loop_cancel: CancellationToken,
    rs_loop_handles: Vec<tokio::task::JoinHandle<()>>,
}

pub fn load_config_manager(path: &PathBuf) -> ConfigManager {
    let cm = ConfigManager::new(path.clone());
    cm.load_configuration();
    cm
}

/// Build RS and GO from an already-loaded config manager, register every
/// known project's initial quota with RS, and spawn RS's own background
/// loops. Does not start GO — the caller decides when to.
pub fn build(config: ConfigManager) -> Supervisor {
    let config = Arc::new(config);
    let tuning = config.global_tuning();
    let scheduler = Arc::new(ResourceScheduler::new(&tuning));

    for project in config.list_projects() {
        if !scheduler.register_project(&project) {
            tracing::warn!(project = %project.name, "resource scheduler declined initial registration");
        }
    }

    let global_state_path = PathBuf::from(&tuning.global_state_path);
    let go = Arc::new(GlobalOrchestrator::new(
        Arc::clone(&config),
        Some(Arc::clone(&scheduler)),
        Arc::new(TokioProcessRuntime::new()),
        None,
        global_state_path,
    ));

    let rs_loop_cancel = CancellationToken::new();
    let rs_loop_handles = vec![
        tokio::spawn(task_admission_loop(Arc::clone(&scheduler), rs_loop_cancel.clone())),
        tokio::spawn(system_monitoring_loop(Arc::clone(&scheduler), rs_loop_cancel.clone())),
    ];

    Supervisor { config, scheduler, go, rs_loop_cancel, rs_loop_handles }
}

impl Supervisor {
    pub async fn shutdown(mut self) {
        self.go.stop().await;
        self.rs_loop_cancel.cancel();
        for handle in self.rs_loop_handles.drain(..) {
            let _ = handle.await;
        }
    }
}

async fn task_admission_loop(scheduler: Arc<ResourceScheduler>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(TASK_ADMISSION_INTERVAL) => {}
        }
        let admitted = scheduler.process_ready_tasks();
        if !admitted.is_empty() {
            info!(count = admitted.len(), "admitted ready tasks onto their project quotas");
        }
    }
}

async fn system_monitoring_loop(scheduler: Arc<ResourceScheduler>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(SYSTEM_MONITORING_INTERVAL) => {}
        }
        let status = scheduler.get_scheduling_status();
        debug!(
            total_projects = status.total_projects,
            pending_tasks = status.pending_tasks,
            active_tasks = status.active_tasks,
            mean_efficiency = status.mean_efficiency,
            fragmentation = status.fragmentation,
            "system-wide scheduling status"
        );
    }
}
