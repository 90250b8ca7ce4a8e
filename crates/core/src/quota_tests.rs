// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_rejects_non_positive_dimensions() {
    assert_eq!(ResourceQuota::new(0.0, 1024, 3, 1024, 10.0), Err(QuotaError::NonPositiveCpu));
    assert_eq!(ResourceQuota::new(1.0, 0, 3, 1024, 10.0), Err(QuotaError::NonPositiveMemory));
    assert_eq!(ResourceQuota::new(1.0, 1024, 0, 1024, 10.0), Err(QuotaError::NonPositiveAgents));
    assert_eq!(ResourceQuota::new(1.0, 1024, 3, 0, 10.0), Err(QuotaError::NonPositiveDisk));
    assert_eq!(ResourceQuota::new(1.0, 1024, 3, 1024, 0.0), Err(QuotaError::NonPositiveNetwork));
}

#[test]
fn new_unvalidated_accepts_all_zero() {
    let q = ResourceQuota::new_unvalidated(0.0, 0, 0, 0, 0.0);
    assert_eq!(q.cpu_cores, 0.0);
    assert_eq!(q.memory_mb, 0);
}

#[test]
fn floored_never_produces_a_zero_dimension() {
    let q = ResourceQuota::floored(0.0, 0, 0, 0, 0.0);
    assert!(ResourceQuota::new(q.cpu_cores, q.memory_mb, q.max_agents, q.disk_mb, q.network_mbps)
        .is_ok());
}

#[test]
fn saturating_sub_clamps_at_zero() {
    let total = ResourceQuota::new(1.0, 100, 1, 100, 1.0).unwrap();
    let allocated = ResourceQuota::new(2.0, 200, 2, 200, 2.0).unwrap();
    let available = total.saturating_sub(&allocated);
    assert_eq!(available.cpu_cores, 0.0);
    assert_eq!(available.memory_mb, 0);
    assert_eq!(available.max_agents, 0);
}

#[test]
fn fits_within_checks_every_dimension() {
    let pool = ResourceQuota::new(2.0, 2048, 4, 2048, 20.0).unwrap();
    let small = ResourceQuota::new(1.0, 1024, 2, 1024, 10.0).unwrap();
    let big = ResourceQuota::new(3.0, 1024, 2, 1024, 10.0).unwrap();
    assert!(small.fits_within(&pool));
    assert!(!big.fits_within(&pool));
}

#[test]
fn utilization_ratio_handles_zero_quota_dimension() {
    let quota = ResourceQuota::new_unvalidated(0.0, 1024, 3, 1024, 10.0);
    let usage = ResourceUsage {
        cpu_usage: 5.0,
        memory_mb: 512,
        active_agents: 1,
        disk_mb: 0,
        network_mbps: 0.0,
        timestamp: chrono::Utc::now(),
    };
    let ratios = usage.utilization(&quota);
    assert_eq!(ratios.cpu, 0.0);
    assert_eq!(ratios.memory, 0.5);
}

#[test]
fn utilization_mean_averages_five_dimensions() {
    let ratios = UtilizationRatios { cpu: 1.0, memory: 1.0, agents: 1.0, disk: 1.0, network: 0.0 };
    assert!((ratios.mean() - 0.8).abs() < 1e-9);
}
