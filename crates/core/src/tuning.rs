// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global tuning record: the one-per-process knobs shared by RS and GO,
//! owned and persisted by the Configuration Manager.

use serde::{Deserialize, Serialize};

use crate::strategy::AllocationStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalTuning {
    pub max_total_agents: u32,
    pub max_concurrent_projects: u32,
    pub resource_allocation_strategy: AllocationStrategy,
    pub global_memory_limit_gb: u64,
    pub global_cpu_cores: u32,
    pub global_disk_limit_gb: u64,
    pub scheduling_interval_seconds: u64,
    pub health_check_interval_seconds: u64,
    pub resource_rebalance_interval_seconds: u64,
    pub global_state_path: String,
}

impl Default for GlobalTuning {
    fn default() -> Self {
        Self {
            max_total_agents: 20,
            max_concurrent_projects: 10,
            resource_allocation_strategy: AllocationStrategy::FairShare,
            global_memory_limit_gb: 8,
            global_cpu_cores: 4,
            global_disk_limit_gb: 50,
            scheduling_interval_seconds: 30,
            health_check_interval_seconds: 60,
            resource_rebalance_interval_seconds: 300,
            global_state_path: ".orch-global".to_string(),
        }
    }
}
