// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use orch_config::{ConfigManager, RegisterOptions};
use orch_core::ChildStatus;
use tempfile::tempdir;

use super::*;
use crate::runtime::ProbeSample;
use crate::test_support::{FakeBehavior, FakeProbe, FakeRuntime};

fn manager_with_project(name: &str) -> (Arc<ConfigManager>, tempfile::TempDir) {
    let root = tempdir().unwrap();
    let cm = ConfigManager::new(root.path().join("orch-config.yaml"));
    let project_dir = root.path().join(name);
    std::fs::create_dir_all(&project_dir).unwrap();
    cm.register_project(name, &project_dir, RegisterOptions::default()).unwrap();
    (Arc::new(cm), root)
}

fn orchestrator(config: Arc<ConfigManager>, runtime: Arc<FakeRuntime>) -> Arc<GlobalOrchestrator> {
    let state_dir = tempdir().unwrap();
    Arc::new(GlobalOrchestrator::new(
        config,
        None,
        runtime,
        Some(Arc::new(FakeProbe { sample: Some(ProbeSample { cpu_percent: 12.5, rss_mb: 256 }) })),
        state_dir.into_path(),
    ))
}

#[tokio::test(start_paused = true)]
async fn start_project_reaches_running_after_the_startup_probe_delay() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, runtime);

    let handle = tokio::spawn({
        let go = Arc::clone(&go);
        async move { go.start_project("demo").await }
    });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(handle.await.unwrap());

    let recorded = go.handle("demo").unwrap();
    assert_eq!(recorded.status, ChildStatus::Running);
    assert!(recorded.pid.is_some());
}

#[tokio::test(start_paused = true)]
async fn start_project_unknown_name_fails_without_spawning() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, Arc::clone(&runtime));

    assert!(!go.start_project("ghost").await);
    assert!(go.handle("ghost").is_none());
}

#[tokio::test(start_paused = true)]
async fn start_project_marks_crashed_when_child_exits_during_the_probe_delay() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    runtime.set_behavior("demo", FakeBehavior { crash_immediately: true, ..Default::default() });
    let go = orchestrator(config, runtime);

    let handle = tokio::spawn({
        let go = Arc::clone(&go);
        async move { go.start_project("demo").await }
    });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(!handle.await.unwrap());

    assert_eq!(go.handle("demo").unwrap().status, ChildStatus::Crashed);
}

#[tokio::test(start_paused = true)]
async fn stop_project_sends_terminate_and_reaches_stopped() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, Arc::clone(&runtime));

    let starter = tokio::spawn({
        let go = Arc::clone(&go);
        async move { go.start_project("demo").await }
    });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(starter.await.unwrap());
    let pid = go.handle("demo").unwrap().pid.unwrap();

    assert!(go.stop_project("demo").await);
    assert_eq!(go.handle("demo").unwrap().status, ChildStatus::Stopped);
    assert_eq!(runtime.terminate_calls(pid), 1);
    assert_eq!(runtime.kill_calls(pid), 0);
}

/// S4: a child that ignores the graceful terminate signal escalates to a
/// forced kill once the 30 s graceful-stop timeout elapses.
#[tokio::test(start_paused = true)]
async fn stop_project_escalates_to_kill_after_graceful_timeout() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    runtime.set_behavior("demo", FakeBehavior { ignore_terminate: true, ..Default::default() });
    let go = orchestrator(config, Arc::clone(&runtime));

    let starter = tokio::spawn({
        let go = Arc::clone(&go);
        async move { go.start_project("demo").await }
    });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(starter.await.unwrap());
    let pid = go.handle("demo").unwrap().pid.unwrap();

    let stopper = tokio::spawn({
        let go = Arc::clone(&go);
        async move { go.stop_project("demo").await }
    });
    tokio::time::advance(GRACEFUL_STOP_TIMEOUT + Duration::from_secs(1)).await;
    assert!(stopper.await.unwrap());

    assert_eq!(runtime.terminate_calls(pid), 1);
    assert_eq!(runtime.kill_calls(pid), 1);
    assert_eq!(go.handle("demo").unwrap().status, ChildStatus::Stopped);
}

#[tokio::test(start_paused = true)]
async fn stop_project_on_unknown_handle_is_false() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, runtime);
    assert!(!go.stop_project("ghost").await);
}

#[tokio::test(start_paused = true)]
async fn pause_then_resume_round_trips_through_running() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, Arc::clone(&runtime));

    let starter = tokio::spawn({
        let go = Arc::clone(&go);
        async move { go.start_project("demo").await }
    });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(starter.await.unwrap());

    assert!(go.pause_project("demo").await);
    assert_eq!(go.handle("demo").unwrap().status, ChildStatus::Paused);

    assert!(go.resume_project("demo").await);
    assert_eq!(go.handle("demo").unwrap().status, ChildStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn pause_project_refuses_a_handle_that_is_not_running() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, runtime);
    assert!(!go.pause_project("demo").await);
}

/// S3: a crashed handle under the restart cap is restarted automatically by
/// the health-check tick; the counter is bumped exactly once per attempt.
#[tokio::test(start_paused = true)]
async fn health_check_tick_restarts_a_crashed_handle_within_the_cap() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, Arc::clone(&runtime));

    let starter = tokio::spawn({
        let go = Arc::clone(&go);
        async move { go.start_project("demo").await }
    });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(starter.await.unwrap());
    let pid = go.handle("demo").unwrap().pid.unwrap();
    runtime.crash(pid);

    let cancel = tokio_util::sync::CancellationToken::new();
    let ticker = tokio::spawn({
        let go = Arc::clone(&go);
        let cancel = cancel.clone();
        async move { go.health_check_tick(&cancel).await }
    });
    tokio::time::advance(RESTART_BACKOFF + STARTUP_PROBE_DELAY + Duration::from_millis(2)).await;
    ticker.await.unwrap();

    let handle = go.handle("demo").unwrap();
    assert_eq!(handle.restart_count, 1);
    assert_eq!(handle.status, ChildStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn health_check_tick_leaves_a_handle_past_the_restart_cap_crashed() {
    let (config, _root) = manager_with_project("demo");
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, Arc::clone(&runtime));

    let starter = tokio::spawn({
        let go = Arc::clone(&go);
        async move { go.start_project("demo").await }
    });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(starter.await.unwrap());
    let pid = go.handle("demo").unwrap().pid.unwrap();
    runtime.crash(pid);

    // exhaust the restart budget directly on the (module-private) handle map
    go.handles.lock().get_mut("demo").unwrap().restart_count = orch_core::handle::MAX_RESTARTS;

    let cancel = tokio_util::sync::CancellationToken::new();
    go.health_check_tick(&cancel).await;

    let handle = go.handle("demo").unwrap();
    assert_eq!(handle.restart_count, orch_core::handle::MAX_RESTARTS);
    assert_eq!(handle.status, ChildStatus::Crashed);
}

#[tokio::test(start_paused = true)]
async fn stop_all_projects_fans_out_concurrently() {
    let root = tempdir().unwrap();
    let cm = ConfigManager::new(root.path().join("orch-config.yaml"));
    for name in ["a", "b", "c"] {
        let dir = root.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        cm.register_project(name, &dir, RegisterOptions::default()).unwrap();
    }
    let config = Arc::new(cm);
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, Arc::clone(&runtime));

    let go2 = Arc::clone(&go);
    let starter = tokio::spawn(async move {
        futures_util::future::join_all(["a", "b", "c"].iter().map(|n| go2.start_project(n))).await
    });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(starter.await.unwrap().into_iter().all(|ok| ok));

    let go3 = Arc::clone(&go);
    let stopper = tokio::spawn(async move { go3.stop_all_projects().await });
    tokio::time::advance(Duration::from_millis(1)).await;
    stopper.await.unwrap();

    for name in ["a", "b", "c"] {
        assert_eq!(go.handle(name).unwrap().status, ChildStatus::Stopped);
    }
}

#[tokio::test(start_paused = true)]
async fn get_global_status_aggregates_running_handles() {
    let root = tempdir().unwrap();
    let cm = ConfigManager::new(root.path().join("orch-config.yaml"));
    for name in ["a", "b"] {
        let dir = root.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        cm.register_project(name, &dir, RegisterOptions::default()).unwrap();
    }
    let config = Arc::new(cm);
    let runtime = Arc::new(FakeRuntime::new());
    let go = orchestrator(config, Arc::clone(&runtime));

    let go2 = Arc::clone(&go);
    let starter =
        tokio::spawn(async move { futures_util::future::join_all(["a", "b"].iter().map(|n| go2.start_project(n))).await });
    tokio::time::advance(STARTUP_PROBE_DELAY + Duration::from_millis(1)).await;
    assert!(starter.await.unwrap().into_iter().all(|ok| ok));

    go.monitoring_tick().await;

    let status = go.get_global_status();
    assert_eq!(status.total_projects, 2);
    assert_eq!(status.active_projects, 2);
    assert_eq!(status.total_memory_mb, 512);
    assert!((status.total_cpu_percent - 25.0).abs() < f64::EPSILON);
}
