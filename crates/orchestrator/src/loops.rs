// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four cooperative background loops the Global Orchestrator spawns on
//! `start()` (§4.3 item 2-4, §5). Each loop sleeps for its configured
//! interval, runs one tick, and repeats until `cancel` fires; every tick's
//! own errors are caught and logged inside the `GlobalOrchestrator` methods
//! they call, so a loop never exits early on a single bad tick.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::go::GlobalOrchestrator;

pub(crate) async fn monitoring_loop(go: Arc<GlobalOrchestrator>, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        go.monitoring_tick().await;
    }
}

pub(crate) async fn scheduling_loop(go: Arc<GlobalOrchestrator>, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        go.scheduling_tick().await;
    }
}

pub(crate) async fn resource_balancing_loop(go: Arc<GlobalOrchestrator>, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        go.resource_balancing_tick().await;
    }
}

pub(crate) async fn health_check_loop(go: Arc<GlobalOrchestrator>, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        go.health_check_tick(&cancel).await;
    }
}

#[cfg(test)]
#[path = "loops_tests.rs"]
mod tests;
