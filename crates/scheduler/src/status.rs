// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Return shapes for the Resource Scheduler's read-only status operations.

use orch_core::{AllocationStrategy, UtilizationRatios};

/// Snapshot returned by `get_scheduling_status`.
#[derive(Debug, Clone)]
pub struct SchedulingStatus {
    pub total_projects: usize,
    pub pending_tasks: usize,
    pub active_tasks: usize,
    pub system_utilization: UtilizationRatios,
    pub mean_efficiency: f64,
    pub fragmentation: f64,
}

/// `{efficiency_improvement, resource_savings, fragmentation_improvement}` in
/// `optimise_allocation`'s return value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImprovementMetrics {
    pub efficiency_improvement: f64,
    pub resource_savings_percent: f64,
    /// Always zero: fragmentation is not recomputed as part of optimisation
    /// (the pre-change and post-change figures would need a second full
    /// pass over the pool; left as a seam for a future strategy to fill).
    pub fragmentation_improvement: f64,
}

/// `{optimisation_time, changes, improvement_metrics, strategy_used}`.
#[derive(Debug, Clone)]
pub struct OptimisationResult {
    pub optimisation_time: std::time::Duration,
    pub changes: Vec<String>,
    pub improvement_metrics: ImprovementMetrics,
    pub strategy_used: AllocationStrategy,
}
