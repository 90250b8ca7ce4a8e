// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use chrono::Utc;
use orch_core::{AllocationStrategy, GlobalTuning, ProjectPriority, ProjectRecord, ResourceQuota, ResourceUsage, TaskPriority};

use super::*;

fn tuning(strategy: AllocationStrategy) -> GlobalTuning {
    GlobalTuning {
        max_total_agents: 10,
        max_concurrent_projects: 10,
        resource_allocation_strategy: strategy,
        global_memory_limit_gb: 4,
        global_cpu_cores: 4,
        global_disk_limit_gb: 20,
        ..GlobalTuning::default()
    }
}

fn project(name: &str, priority: ProjectPriority) -> ProjectRecord {
    ProjectRecord::builder().name(name).priority(priority).build()
}

#[test]
fn register_project_reduces_available_pool() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::FairShare));
    assert!(rs.register_project(&project("a", ProjectPriority::Normal)));
    let quota = rs.get_project_allocation("a").unwrap();
    assert!(quota.cpu_cores > 0.0);
    assert_eq!(rs.get_scheduling_status().total_projects, 1);
}

#[test]
fn register_project_twice_rejects_the_second_call() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::FairShare));
    assert!(rs.register_project(&project("a", ProjectPriority::Normal)));
    assert!(!rs.register_project(&project("a", ProjectPriority::Normal)));
}

#[test]
fn priority_based_gives_critical_more_than_low() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::PriorityBased));
    rs.register_project(&project("critical", ProjectPriority::Critical));
    rs.register_project(&project("low", ProjectPriority::Low));

    let critical_quota = rs.get_project_allocation("critical").unwrap();
    let low_quota = rs.get_project_allocation("low").unwrap();
    assert!(critical_quota.cpu_cores > low_quota.cpu_cores);
}

#[test]
fn unregister_restores_pool_and_purges_pending_tasks() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::FairShare));
    rs.register_project(&project("a", ProjectPriority::Normal));
    let before = rs.get_scheduling_status();

    let task = make_task("a", TaskPriority::Normal, 0);
    assert!(rs.submit_task(task));
    assert_eq!(rs.get_scheduling_status().pending_tasks, 1);

    assert!(rs.unregister_project("a"));
    assert!(!rs.unregister_project("a"));

    let after = rs.get_scheduling_status();
    assert_eq!(after.pending_tasks, 0);
    assert_eq!(after.total_projects, before.total_projects - 1);
}

#[test]
fn submit_task_rejects_unregistered_project() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::FairShare));
    assert!(!rs.submit_task(make_task("ghost", TaskPriority::Normal, 0)));
}

fn make_task(project_name: &str, priority: TaskPriority, offset_secs: i64) -> orch_core::ScheduledTask {
    let created_at = Utc::now() + chrono::Duration::seconds(offset_secs);
    let requirements = ResourceQuota::new(0.1, 1, 1, 1, 0.1).unwrap();
    orch_core::ScheduledTask::new(project_name, priority, Duration::from_secs(30), requirements, created_at)
}

#[test]
fn process_ready_tasks_admits_tasks_that_fit_the_quota() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::FairShare));
    rs.register_project(&project("a", ProjectPriority::Normal));
    let task = make_task("a", TaskPriority::Critical, 0);
    let task_id = task.task_id;
    rs.submit_task(task);

    let admitted = rs.process_ready_tasks();
    assert_eq!(admitted, vec![task_id]);
    assert_eq!(rs.get_scheduling_status().pending_tasks, 0);
    assert_eq!(rs.get_scheduling_status().active_tasks, 1);
}

#[test]
fn process_ready_tasks_leaves_tasks_with_unmet_dependencies_pending() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::FairShare));
    rs.register_project(&project("a", ProjectPriority::Normal));

    let mut task = make_task("a", TaskPriority::Critical, 0);
    task.dependencies.push(orch_core::TaskId::new());
    rs.submit_task(task);

    let admitted = rs.process_ready_tasks();
    assert!(admitted.is_empty());
    assert_eq!(rs.get_scheduling_status().pending_tasks, 1);
}

#[test]
fn update_resource_usage_smooths_toward_new_samples() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::FairShare));
    rs.register_project(&project("a", ProjectPriority::Normal));
    let quota = rs.get_project_allocation("a").unwrap();

    let heavy = ResourceUsage {
        cpu_usage: quota.cpu_cores * 0.75,
        memory_mb: (quota.memory_mb as f64 * 0.75) as u64,
        active_agents: quota.max_agents,
        disk_mb: 0,
        network_mbps: 0.0,
        timestamp: Utc::now(),
    };
    rs.update_resource_usage("a", heavy);

    let status = rs.get_scheduling_status();
    assert!(status.mean_efficiency > 0.0);
}

#[test]
fn optimise_allocation_fair_share_reports_strategy_used() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::FairShare));
    rs.register_project(&project("a", ProjectPriority::Normal));
    rs.register_project(&project("b", ProjectPriority::Critical));

    let result = rs.optimise_allocation();
    assert_eq!(result.strategy_used, AllocationStrategy::FairShare);
    let a = rs.get_project_allocation("a").unwrap();
    let b = rs.get_project_allocation("b").unwrap();
    // fair share ignores priority entirely.
    assert_eq!(a.cpu_cores, b.cpu_cores);
}

#[test]
fn optimise_allocation_dynamic_shrinks_underutilised_projects() {
    let rs = ResourceScheduler::new(&tuning(AllocationStrategy::Dynamic));
    rs.register_project(&project("a", ProjectPriority::Normal));
    let before = rs.get_project_allocation("a").unwrap();

    rs.update_resource_usage("a", ResourceUsage::zero(Utc::now()));
    let result = rs.optimise_allocation();

    let after = rs.get_project_allocation("a").unwrap();
    assert!(after.cpu_cores < before.cpu_cores);
    assert_eq!(result.changes.len(), 1);
}

#[test]
fn optimise_allocation_efficiency_and_deadline_strategies_are_stubs() {
    for strategy in [AllocationStrategy::EfficiencyOptimised, AllocationStrategy::DeadlineAware] {
        let rs = ResourceScheduler::new(&tuning(strategy));
        rs.register_project(&project("a", ProjectPriority::Normal));
        let result = rs.optimise_allocation();
        assert!(result.changes.is_empty());
    }
}
