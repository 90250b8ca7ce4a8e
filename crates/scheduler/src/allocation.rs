// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Initial-allocation formula (§4.2.1): the share of the pool a project gets
//! the moment it registers, before any rebalancing pass has run.
//!
//! The CPU dimension of the pool is tracked as a fixed 100.0-point budget
//! (percent-of-capacity), not the host's physical core count — that is a
//! deliberate decoupling from `GlobalTuning::global_cpu_cores`, which instead
//! feeds the Global Orchestrator's own local fallback formula. The network
//! dimension has no equivalent tuning knob at all, so the pool exposes a
//! fixed budget for it too. Both constants are workspace-internal; nothing
//! outside this crate depends on their exact value.

use orch_core::{AllocationStrategy, ProjectPriority, ResourceLimits, ResourceQuota};

/// Fixed size of the CPU pool, in percent-of-capacity points.
pub const CPU_POOL_POINTS: f64 = 100.0;
/// Fixed size of the network pool, in Mbps, shared fairly like any other dimension.
pub const NETWORK_POOL_MBPS: f64 = 1000.0;

/// The total resource budget the scheduler divides among projects.
#[derive(Debug, Clone, Copy)]
pub struct PoolTotals {
    pub agents: u32,
    pub memory_mb: u64,
    pub disk_mb: u64,
}

/// Fraction of the pool one project is entitled to under `strategy`, given
/// its priority weight `w`, the sum of weights `sum_weights` over all active
/// projects, and the number of active projects `active_count`.
fn share_fraction(strategy: AllocationStrategy, w: f64, sum_weights: f64, active_count: u32) -> f64 {
    match strategy {
        AllocationStrategy::PriorityBased => {
            if sum_weights <= 0.0 {
                0.0
            } else {
                w / sum_weights
            }
        }
        // fair_share, and the fallback used by dynamic/efficiency_optimised/
        // deadline_aware, none of which define their own initial-allocation
        // formula (§4.2.1 only specifies fair_share and priority_based).
        _ => 1.0 / (active_count.max(1) as f64),
    }
}

/// Compute the initial quota for a project under registration (§4.2.1).
///
/// `share_fraction` of each pool dimension is taken, clamped to the
/// project's own caps, the CPU component scaled by `cpu_priority`, and the
/// whole thing floored to the documented minimums so the result is always a
/// constructible (validated) quota. Callers must still check the result
/// fits within the remaining pool before committing it.
pub fn initial_allocation(
    strategy: AllocationStrategy,
    priority: ProjectPriority,
    limits: &ResourceLimits,
    active_count: u32,
    sum_weights: f64,
    pool: &PoolTotals,
) -> ResourceQuota {
    let share = share_fraction(strategy, priority.weight(), sum_weights, active_count);

    let raw_agents = pool.agents as f64 * share;
    let raw_memory_mb = pool.memory_mb as f64 * share;
    let raw_cpu = CPU_POOL_POINTS * share;
    let raw_disk_mb = pool.disk_mb as f64 * share;
    let raw_network = NETWORK_POOL_MBPS * share;

    let clamped_agents = raw_agents.min(limits.max_parallel_agents as f64);
    let clamped_memory_mb = raw_memory_mb.min(limits.max_memory_mb as f64);
    let clamped_disk_mb = raw_disk_mb.min(limits.max_disk_mb as f64);
    let clamped_cpu = raw_cpu * limits.cpu_priority;

    ResourceQuota::floored(
        clamped_cpu,
        clamped_memory_mb as u64,
        clamped_agents as u32,
        clamped_disk_mb as u64,
        raw_network,
    )
}

#[cfg(test)]
#[path = "allocation_tests.rs"]
mod tests;
