// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource quotas and usage samples.
//!
//! A [`ResourceQuota`] handed to a project must have every dimension strictly
//! positive — that invariant is what makes it safe to divide usage by quota
//! elsewhere. But the scheduler's "how much is left in the pool" arithmetic
//! legitimately produces zero (a fully allocated pool has zero available CPU).
//! Rather than smuggle a validation bypass into the same type, those two
//! notions get separate constructors: [`ResourceQuota::new`] rejects
//! non-positive input, [`ResourceQuota::new_unvalidated`] does not. Both
//! produce the same type, so downstream arithmetic doesn't need to branch on
//! which constructor built a given value — callers choose which invariant
//! they need at the call site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuotaError {
    #[error("cpu_cores must be positive")]
    NonPositiveCpu,
    #[error("memory_mb must be positive")]
    NonPositiveMemory,
    #[error("max_agents must be positive")]
    NonPositiveAgents,
    #[error("disk_mb must be positive")]
    NonPositiveDisk,
    #[error("network_mbps must be positive")]
    NonPositiveNetwork,
}

/// A quota of positive resource limits assigned to a project, or an
/// intermediate "available" value that may legitimately be zero in any
/// dimension. See module docs for why both share this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceQuota {
    pub cpu_cores: f64,
    pub memory_mb: u64,
    pub max_agents: u32,
    pub disk_mb: u64,
    pub network_mbps: f64,
}

impl ResourceQuota {
    /// Construct a quota for an actual allocation handed to a project.
    /// Rejects any non-positive dimension.
    pub fn new(
        cpu_cores: f64,
        memory_mb: u64,
        max_agents: u32,
        disk_mb: u64,
        network_mbps: f64,
    ) -> Result<Self, QuotaError> {
        if cpu_cores <= 0.0 {
            return Err(QuotaError::NonPositiveCpu);
        }
        if memory_mb == 0 {
            return Err(QuotaError::NonPositiveMemory);
        }
        if max_agents == 0 {
            return Err(QuotaError::NonPositiveAgents);
        }
        if disk_mb == 0 {
            return Err(QuotaError::NonPositiveDisk);
        }
        if network_mbps <= 0.0 {
            return Err(QuotaError::NonPositiveNetwork);
        }
        Ok(Self { cpu_cores, memory_mb, max_agents, disk_mb, network_mbps })
    }

    /// Construct an intermediate quota-shaped value (e.g. "pool remaining")
    /// without validation. Any dimension may be zero.
    pub fn new_unvalidated(
        cpu_cores: f64,
        memory_mb: u64,
        max_agents: u32,
        disk_mb: u64,
        network_mbps: f64,
    ) -> Self {
        Self { cpu_cores, memory_mb, max_agents, disk_mb, network_mbps }
    }

    /// Floor every dimension to the documented minimum (§4.2.1) and validate.
    /// Used to guarantee the result of an allocation formula is constructible.
    pub fn floored(
        cpu_cores: f64,
        memory_mb: u64,
        max_agents: u32,
        disk_mb: u64,
        network_mbps: f64,
    ) -> Self {
        Self {
            cpu_cores: cpu_cores.max(0.1),
            memory_mb: memory_mb.max(1),
            max_agents: max_agents.max(1),
            disk_mb: disk_mb.max(1),
            network_mbps: network_mbps.max(0.1),
        }
    }

    /// Componentwise `self - other`, clamped at zero, returned unvalidated
    /// (the result is an "available" value, not an allocation).
    pub fn saturating_sub(&self, other: &ResourceQuota) -> ResourceQuota {
        ResourceQuota::new_unvalidated(
            (self.cpu_cores - other.cpu_cores).max(0.0),
            self.memory_mb.saturating_sub(other.memory_mb),
            self.max_agents.saturating_sub(other.max_agents),
            self.disk_mb.saturating_sub(other.disk_mb),
            (self.network_mbps - other.network_mbps).max(0.0),
        )
    }

    /// Componentwise `self + other`.
    pub fn add(&self, other: &ResourceQuota) -> ResourceQuota {
        ResourceQuota::new_unvalidated(
            self.cpu_cores + other.cpu_cores,
            self.memory_mb + other.memory_mb,
            self.max_agents + other.max_agents,
            self.disk_mb + other.disk_mb,
            self.network_mbps + other.network_mbps,
        )
    }

    /// True iff every dimension of `self` fits within `pool` (used to check
    /// whether an increase can be granted from the remaining pool).
    pub fn fits_within(&self, pool: &ResourceQuota) -> bool {
        self.cpu_cores <= pool.cpu_cores
            && self.memory_mb <= pool.memory_mb
            && self.max_agents <= pool.max_agents
            && self.disk_mb <= pool.disk_mb
            && self.network_mbps <= pool.network_mbps
    }

    /// Scale every dimension by `factor`, re-flooring so the result stays a
    /// constructible quota.
    pub fn scaled(&self, factor: f64) -> ResourceQuota {
        ResourceQuota::floored(
            self.cpu_cores * factor,
            (self.memory_mb as f64 * factor) as u64,
            ((self.max_agents as f64 * factor) as u32).max(1),
            (self.disk_mb as f64 * factor) as u64,
            self.network_mbps * factor,
        )
    }
}

/// A point-in-time sample of a project's resource consumption.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_usage: f64,
    pub memory_mb: u64,
    pub active_agents: u32,
    pub disk_mb: u64,
    pub network_mbps: f64,
    pub timestamp: DateTime<Utc>,
}

impl ResourceUsage {
    pub fn zero(timestamp: DateTime<Utc>) -> Self {
        Self {
            cpu_usage: 0.0,
            memory_mb: 0,
            active_agents: 0,
            disk_mb: 0,
            network_mbps: 0.0,
            timestamp,
        }
    }

    /// Utilisation ratio per dimension against `quota`. Division by a zero
    /// quota dimension (only possible for an unvalidated quota) yields 0.0
    /// rather than NaN or panicking.
    pub fn utilization(&self, quota: &ResourceQuota) -> UtilizationRatios {
        let ratio = |usage: f64, cap: f64| if cap > 0.0 { usage / cap } else { 0.0 };
        UtilizationRatios {
            cpu: ratio(self.cpu_usage, quota.cpu_cores),
            memory: ratio(self.memory_mb as f64, quota.memory_mb as f64),
            agents: ratio(self.active_agents as f64, quota.max_agents as f64),
            disk: ratio(self.disk_mb as f64, quota.disk_mb as f64),
            network: ratio(self.network_mbps, quota.network_mbps),
        }
    }

    /// Componentwise sum, used to accumulate system-wide utilisation.
    pub fn add(&mut self, other: &ResourceUsage) {
        self.cpu_usage += other.cpu_usage;
        self.memory_mb += other.memory_mb;
        self.active_agents += other.active_agents;
        self.disk_mb += other.disk_mb;
        self.network_mbps += other.network_mbps;
    }
}

/// Per-dimension utilisation ratios (usage / quota), one entry per resource
/// kind tracked by the scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtilizationRatios {
    pub cpu: f64,
    pub memory: f64,
    pub agents: f64,
    pub disk: f64,
    pub network: f64,
}

impl UtilizationRatios {
    pub fn mean(&self) -> f64 {
        (self.cpu + self.memory + self.agents + self.disk + self.network) / 5.0
    }
}

#[cfg(test)]
#[path = "quota_tests.rs"]
mod tests;
