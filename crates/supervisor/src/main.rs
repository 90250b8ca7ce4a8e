// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for `multi-project-orchestrator` (§6).

mod cli;
mod logging;
mod shell;
mod status_view;
mod wiring;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use orch_config::RegisterOptions;
use orch_core::ProjectPriority;
use tracing::{error, info};

use cli::{Cli, FeatureToggles};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let toggles = FeatureToggles::from(&cli);

    if cli.status {
        return run_status_snapshot(&cli);
    }

    let config = wiring::load_config_manager(&cli.config);

    if let Some(pair) = &cli.register {
        let [name, path] = [pair[0].clone(), pair[1].clone()];
        return run_one_shot_register(&config, &name, &path);
    }
    if !cli.discover.is_empty() {
        return run_one_shot_discover(&config, &cli.discover);
    }

    let tuning = config.global_tuning();
    let global_state_path = PathBuf::from(&tuning.global_state_path);
    let _log_guard = logging::init(&global_state_path, cli.debug)?;

    info!(
        security = toggles.security,
        monitoring = toggles.monitoring,
        intelligence = toggles.intelligence,
        discord = toggles.discord,
        "starting supervisor"
    );

    let supervisor = wiring::build(config);
    supervisor.go.start().await?;
    info!("READY");

    if cli.interactive {
        shell::run(Arc::clone(&supervisor.go), Arc::clone(&supervisor.config), Arc::clone(&supervisor.scheduler)).await;
    } else {
        wait_for_shutdown_signal().await;
    }

    info!("shutting down");
    supervisor.shutdown().await;
    Ok(())
}

fn run_status_snapshot(cli: &Cli) -> anyhow::Result<()> {
    let config = wiring::load_config_manager(&cli.config);
    let supervisor = wiring::build(config);
    let status = supervisor.go.get_global_status();
    println!("{}", serde_json::to_string_pretty(&status_view::to_json(&status))?);
    Ok(())
}

fn run_one_shot_register(config: &orch_config::ConfigManager, name: &str, path: &str) -> anyhow::Result<()> {
    match config.register_project(name, PathBuf::from(path), RegisterOptions::default()) {
        Ok(record) => {
            println!("registered {} at {}", record.name, record.path.display());
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "registration failed");
            Err(e.into())
        }
    }
}

fn run_one_shot_discover(config: &orch_config::ConfigManager, paths: &[PathBuf]) -> anyhow::Result<()> {
    let candidates = config.discover_projects(paths);
    for candidate in candidates {
        let priority = if candidate.classification == orch_config::ProjectClassification::OrchExisting {
            ProjectPriority::High
        } else {
            ProjectPriority::Normal
        };
        let options = RegisterOptions { priority, git_url: candidate.git_url.clone(), ..Default::default() };
        match config.register_project(candidate.name.clone(), candidate.path.clone(), options) {
            Ok(record) => println!(
                "registered {} ({}, {}) at {}",
                record.name,
                candidate.classification,
                candidate.language.as_deref().unwrap_or("unknown-language"),
                record.path.display()
            ),
            Err(e) => error!(project = %candidate.name, error = %e, "auto-register during discovery failed"),
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
