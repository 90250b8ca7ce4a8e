// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resource allocation strategy tag.
//!
//! This is the one representation of "which strategy" shared by the
//! Configuration Manager (which persists it as part of the global tuning
//! record) and the Resource Scheduler (which dispatches on it in
//! `optimise_allocation`). A single enum, matched exhaustively at the one
//! dispatch site, so config and scheduler can never disagree on spelling.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    FairShare,
    PriorityBased,
    Dynamic,
    EfficiencyOptimised,
    DeadlineAware,
}

impl Default for AllocationStrategy {
    fn default() -> Self {
        AllocationStrategy::FairShare
    }
}

crate::simple_display! {
    AllocationStrategy {
        FairShare => "fair_share",
        PriorityBased => "priority_based",
        Dynamic => "dynamic",
        EfficiencyOptimised => "efficiency_optimised",
        DeadlineAware => "deadline_aware",
    }
}
