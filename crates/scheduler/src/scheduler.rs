// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Resource Scheduler: quota allocation, task admission, and
//! continuous re-optimisation (§4.2).

use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use orch_core::{
    AllocationStrategy, GlobalTuning, ProjectPriority, ProjectRecord, ResourceLimits, ResourceQuota,
    ResourceUsage, ScheduledTask, TaskId, UtilizationRatios,
};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::allocation::{self, PoolTotals};
use crate::efficiency;
use crate::heap::HeapEntry;
use crate::status::{ImprovementMetrics, OptimisationResult, SchedulingStatus};

/// Everything the scheduler tracks for one registered project.
#[derive(Debug, Clone)]
pub struct ProjectAllocation {
    pub quota: ResourceQuota,
    pub priority: ProjectPriority,
    pub limits: ResourceLimits,
    pub usage: ResourceUsage,
    pub average_utilization: Option<UtilizationRatios>,
    pub efficiency_score: f64,
    pub running_tasks: Vec<TaskId>,
}

struct SchedulerState {
    allocations: HashMap<String, ProjectAllocation>,
    /// Remaining pool, componentwise. Not itself a valid project quota (may
    /// be zero in any dimension), so it is `new_unvalidated`.
    available: ResourceQuota,
}

/// Owns the pool of host resources and divides it among registered
/// projects according to the configured [`AllocationStrategy`].
pub struct ResourceScheduler {
    strategy: AllocationStrategy,
    total: ResourceQuota,
    state: RwLock<SchedulerState>,
    task_heap: Mutex<BinaryHeap<HeapEntry>>,
    completed_tasks: Mutex<HashSet<TaskId>>,
}

impl ResourceScheduler {
    /// Build a scheduler whose pool is sized from `tuning`. CPU and network
    /// are tracked as fixed-size pools (see `allocation` module docs);
    /// memory and disk come from `tuning`'s gigabyte knobs.
    pub fn new(tuning: &GlobalTuning) -> Self {
        let total = ResourceQuota::new(
            allocation::CPU_POOL_POINTS,
            tuning.global_memory_limit_gb * 1024,
            tuning.max_total_agents,
            tuning.global_disk_limit_gb * 1024,
            allocation::NETWORK_POOL_MBPS,
        )
        .unwrap_or_else(|_| ResourceQuota::floored(1.0, 1, 1, 1, 1.0));

        Self {
            strategy: tuning.resource_allocation_strategy,
            total,
            state: RwLock::new(SchedulerState { allocations: HashMap::new(), available: total }),
            task_heap: Mutex::new(BinaryHeap::new()),
            completed_tasks: Mutex::new(HashSet::new()),
        }
    }

    fn pool_totals(&self) -> PoolTotals {
        PoolTotals { agents: self.total.max_agents, memory_mb: self.total.memory_mb, disk_mb: self.total.disk_mb }
    }

    /// Register `project` with the pool. Returns `false` without side
    /// effects if the project is already registered.
    ///
    /// The CPU and network dimensions have no project-level cap, so a raw
    /// `100.0/active_count` (§4.2.1) computed against only the
    /// *already-registered* count would let the first registrant claim the
    /// whole pool before later projects exist to share it with. Instead,
    /// every registration recomputes *every* registered project's quota
    /// together under the configured strategy — the same formula
    /// `optimise_allocation` uses for rebalancing — so shares are always
    /// divided among the actual current population and `available` is
    /// rederived from the fresh total rather than tracked incrementally.
    pub fn register_project(&self, project: &ProjectRecord) -> bool {
        let mut state = self.state.write();
        if state.allocations.contains_key(&project.name) {
            warn!(project = %project.name, "already registered with the scheduler");
            return false;
        }

        state.allocations.insert(
            project.name.clone(),
            ProjectAllocation {
                quota: ResourceQuota::floored(0.1, 1, 1, 1, 0.1),
                priority: project.priority,
                limits: project.resource_limits,
                usage: ResourceUsage::zero(Utc::now()),
                average_utilization: None,
                efficiency_score: 0.0,
                running_tasks: Vec::new(),
            },
        );
        self.recompute_shares(&mut state);

        let quota = state.allocations.get(&project.name).map(|a| a.quota);
        info!(project = %project.name, ?quota, "registered with scheduler");
        true
    }

    /// Recompute every registered project's quota from scratch under the
    /// configured strategy (§4.2.1) and rederive `available` as the total
    /// pool minus the fresh sum — see `register_project` for why this
    /// can't be done incrementally per-project.
    fn recompute_shares(&self, state: &mut SchedulerState) {
        let pool = self.pool_totals();
        let active_count = state.allocations.len() as u32;
        let sum_weights: f64 = state.allocations.values().map(|a| a.priority.weight()).sum();

        let mut consumed = ResourceQuota::new_unvalidated(0.0, 0, 0, 0, 0.0);
        for alloc in state.allocations.values_mut() {
            alloc.quota = allocation::initial_allocation(
                self.strategy,
                alloc.priority,
                &alloc.limits,
                active_count,
                sum_weights,
                &pool,
            );
            consumed = consumed.add(&alloc.quota);
        }
        state.available = self.total.saturating_sub(&consumed);
    }

    /// Purge `name`'s allocation and every pending task of theirs from the
    /// global heap, restoring their quota to the pool.
    pub fn unregister_project(&self, name: &str) -> bool {
        let removed = {
            let mut state = self.state.write();
            match state.allocations.remove(name) {
                Some(alloc) => {
                    state.available = state.available.add(&alloc.quota);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return false;
        }

        let mut heap = self.task_heap.lock();
        let retained: Vec<HeapEntry> = heap.drain().filter(|e| e.0.project_name != name).collect();
        *heap = retained.into_iter().collect();

        info!(project = name, "unregistered from scheduler");
        true
    }

    /// Admit `task` into the global queue. Rejects if its project is not
    /// registered.
    pub fn submit_task(&self, task: ScheduledTask) -> bool {
        if !self.state.read().allocations.contains_key(&task.project_name) {
            warn!(project = %task.project_name, task = %task.task_id, "rejected task for unregistered project");
            return false;
        }
        debug!(task = %task.task_id, project = %task.project_name, "submitted task");
        self.task_heap.lock().push(HeapEntry(task));
        true
    }

    /// Record a usage sample, updating the project's smoothed utilisation
    /// and derived efficiency score (§4.2.2).
    pub fn update_resource_usage(&self, name: &str, usage: ResourceUsage) {
        let mut state = self.state.write();
        let Some(alloc) = state.allocations.get_mut(name) else { return };

        let ratios = usage.utilization(&alloc.quota);
        let smoothed = match alloc.average_utilization {
            None => ratios,
            Some(prev) => UtilizationRatios {
                cpu: efficiency::smooth(prev.cpu, ratios.cpu),
                memory: efficiency::smooth(prev.memory, ratios.memory),
                agents: efficiency::smooth(prev.agents, ratios.agents),
                disk: efficiency::smooth(prev.disk, ratios.disk),
                network: efficiency::smooth(prev.network, ratios.network),
            },
        };
        alloc.efficiency_score = efficiency::efficiency_score(smoothed.mean());
        alloc.average_utilization = Some(smoothed);
        alloc.usage = usage;
    }

    pub fn get_project_allocation(&self, name: &str) -> Option<ResourceQuota> {
        self.state.read().allocations.get(name).map(|a| a.quota)
    }

    /// System-wide utilisation: aggregate usage across all projects divided
    /// by the total pool, per dimension.
    pub fn get_system_utilization(&self) -> UtilizationRatios {
        let state = self.state.read();
        let mut total_usage = ResourceUsage::zero(Utc::now());
        for alloc in state.allocations.values() {
            total_usage.add(&alloc.usage);
        }
        total_usage.utilization(&self.total)
    }

    pub fn get_scheduling_status(&self) -> SchedulingStatus {
        let state = self.state.read();
        let mean_efficiency = if state.allocations.is_empty() {
            0.0
        } else {
            state.allocations.values().map(|a| a.efficiency_score).sum::<f64>() / state.allocations.len() as f64
        };
        SchedulingStatus {
            total_projects: state.allocations.len(),
            pending_tasks: self.task_heap.lock().len(),
            active_tasks: state.allocations.values().map(|a| a.running_tasks.len()).sum(),
            system_utilization: self.get_system_utilization(),
            mean_efficiency,
            fragmentation: efficiency::fragmentation(&state.available, &self.total),
        }
    }

    /// Admit every ready, resource-fitting task from the global heap onto
    /// its project's running list (§4.2.3). Returns the admitted task ids.
    /// Driven by the scheduling loop every 10 s.
    pub fn process_ready_tasks(&self) -> Vec<TaskId> {
        let completed = self.completed_tasks.lock().clone();
        let mut heap = self.task_heap.lock();
        let mut state = self.state.write();

        let pending: Vec<HeapEntry> = heap.drain().collect();
        let mut remaining = Vec::with_capacity(pending.len());
        let mut admitted = Vec::new();

        for entry in pending {
            let task = &entry.0;
            let admissible = task.is_ready(&completed)
                && state
                    .allocations
                    .get(&task.project_name)
                    .is_some_and(|alloc| fits_current_usage(alloc, task));

            if admissible {
                if let Some(alloc) = state.allocations.get_mut(&task.project_name) {
                    alloc.usage.cpu_usage += task.requirements.cpu_cores;
                    alloc.usage.memory_mb += task.requirements.memory_mb;
                    alloc.usage.active_agents += task.requirements.max_agents;
                    alloc.running_tasks.push(task.task_id);
                }
                info!(task = %task.task_id, project = %task.project_name, "admitted task");
                admitted.push(task.task_id);
            } else {
                remaining.push(entry);
            }
        }
        *heap = remaining.into_iter().collect();
        admitted
    }

    /// Apply the configured strategy (§4.2.2) and report what changed.
    pub fn optimise_allocation(&self) -> OptimisationResult {
        let start = Instant::now();
        let mut state = self.state.write();

        let old_efficiency = mean_raw_efficiency(&state.allocations);
        let old_total_footprint = total_footprint(state.allocations.values().map(|a| &a.quota));

        let changes = match self.strategy {
            AllocationStrategy::FairShare => optimise_fair_share(&mut state, &self.pool_totals()),
            AllocationStrategy::PriorityBased => optimise_priority_based(&mut state, &self.pool_totals()),
            AllocationStrategy::Dynamic => optimise_dynamic(&mut state),
            AllocationStrategy::EfficiencyOptimised | AllocationStrategy::DeadlineAware => Vec::new(),
        };

        let new_efficiency = if state.allocations.is_empty() {
            0.0
        } else {
            state.allocations.values().map(|a| a.efficiency_score).sum::<f64>() / state.allocations.len() as f64
        };
        let new_total_footprint = total_footprint(state.allocations.values().map(|a| &a.quota));
        let resource_savings_percent = if old_total_footprint > 0.0 {
            (old_total_footprint - new_total_footprint) / old_total_footprint * 100.0
        } else {
            0.0
        };

        info!(changes = changes.len(), strategy = %self.strategy, "optimisation pass complete");
        OptimisationResult {
            optimisation_time: start.elapsed(),
            changes,
            improvement_metrics: ImprovementMetrics {
                efficiency_improvement: new_efficiency - old_efficiency,
                resource_savings_percent,
                fragmentation_improvement: 0.0,
            },
            strategy_used: self.strategy,
        }
    }
}

fn fits_current_usage(alloc: &ProjectAllocation, task: &ScheduledTask) -> bool {
    let current = &alloc.usage;
    let required = &task.requirements;
    let quota = &alloc.quota;
    current.cpu_usage + required.cpu_cores <= quota.cpu_cores
        && current.memory_mb + required.memory_mb <= quota.memory_mb
        && current.active_agents + required.max_agents <= quota.max_agents
}

fn mean_raw_efficiency(allocations: &HashMap<String, ProjectAllocation>) -> f64 {
    if allocations.is_empty() {
        return 0.0;
    }
    allocations
        .values()
        .map(|a| efficiency::efficiency_score(a.usage.utilization(&a.quota).mean()))
        .sum::<f64>()
        / allocations.len() as f64
}

fn total_footprint<'a>(quotas: impl Iterator<Item = &'a ResourceQuota>) -> f64 {
    quotas.map(|q| q.cpu_cores + q.memory_mb as f64 / 1024.0 + q.max_agents as f64).sum()
}

fn optimise_fair_share(state: &mut SchedulerState, pool: &PoolTotals) -> Vec<String> {
    let mut changes = Vec::new();
    let n = state.allocations.len() as u32;
    if n == 0 {
        return changes;
    }

    let mut new_available = state.available;
    for (name, alloc) in state.allocations.iter_mut() {
        let new_quota = allocation::initial_allocation(AllocationStrategy::FairShare, alloc.priority, &alloc.limits, n, 0.0, pool);
        if new_quota != alloc.quota {
            new_available = new_available.add(&alloc.quota).saturating_sub(&new_quota);
            changes.push(format!("{name}: rebalanced to fair share"));
            alloc.quota = new_quota;
        }
    }
    state.available = new_available;
    changes
}

fn optimise_priority_based(state: &mut SchedulerState, pool: &PoolTotals) -> Vec<String> {
    let mut changes = Vec::new();
    let n = state.allocations.len() as u32;
    if n == 0 {
        return changes;
    }
    let sum_weights: f64 = state.allocations.values().map(|a| a.priority.weight()).sum();

    let mut new_available = state.available;
    for (name, alloc) in state.allocations.iter_mut() {
        let new_quota =
            allocation::initial_allocation(AllocationStrategy::PriorityBased, alloc.priority, &alloc.limits, n, sum_weights, pool);
        if new_quota != alloc.quota {
            new_available = new_available.add(&alloc.quota).saturating_sub(&new_quota);
            changes.push(format!("{name}: rebalanced by priority weight"));
            alloc.quota = new_quota;
        }
    }
    state.available = new_available;
    changes
}

/// Shrink under-used projects (ubar < 0.3) by 20%; grow over-used ones
/// (ubar > 0.9) by 20% if the increase fits the remaining pool.
fn optimise_dynamic(state: &mut SchedulerState) -> Vec<String> {
    let mut changes = Vec::new();
    for (name, alloc) in state.allocations.iter_mut() {
        let ubar = alloc.average_utilization.map(|u| u.mean()).unwrap_or(0.0);
        if ubar < 0.3 {
            let new_quota = alloc.quota.scaled(0.8);
            state.available = state.available.add(&alloc.quota).saturating_sub(&new_quota);
            alloc.quota = new_quota;
            changes.push(format!("{name}: shrunk (underutilised, ubar={ubar:.2})"));
        } else if ubar > 0.9 {
            let candidate = alloc.quota.scaled(1.2);
            let increase = candidate.saturating_sub(&alloc.quota);
            if increase.fits_within(&state.available) {
                state.available = state.available.saturating_sub(&increase);
                alloc.quota = candidate;
                changes.push(format!("{name}: grew (overutilised, ubar={ubar:.2})"));
            }
        }
    }
    changes
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
