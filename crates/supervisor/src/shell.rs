// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive shell (§6): `help`, `status [component]`, `projects`,
//! `register <name> <path>`, `discover <paths>`, `start <project>`,
//! `stop <project>`, `optimize`, `insights`, `exit`.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use orch_config::{ConfigManager, RegisterOptions};
use orch_orchestrator::GlobalOrchestrator;
use orch_scheduler::ResourceScheduler;

use crate::status_view;

const HELP: &str = "\
commands:
  help                          show this text
  status [component]            global status, or one of: cm, rs, go
  projects                      list registered projects
  register <name> <path>        register a project
  discover <path>...            scan and auto-register projects
  start <project>                start a project's child process
  stop <project>                 stop a project's child process
  optimize                       run one resource-allocation pass
  insights                       print the scheduling status snapshot
  exit                           leave the shell";

pub async fn run(go: Arc<GlobalOrchestrator>, config: Arc<ConfigManager>, scheduler: Arc<ResourceScheduler>) {
    println!("{HELP}\n");
    let stdin = std::io::stdin();
    loop {
        print!("orch> ");
        if std::io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();

        match command {
            "help" => println!("{HELP}"),
            "exit" | "quit" => break,
            "status" => dispatch_status(&go, &scheduler, rest.first().copied()),
            "projects" => dispatch_projects(&config),
            "register" => dispatch_register(&config, &rest),
            "discover" => dispatch_discover(&config, &rest),
            "start" => dispatch_start(&go, &rest).await,
            "stop" => dispatch_stop(&go, &rest).await,
            "optimize" => dispatch_optimize(&scheduler),
            "insights" => dispatch_insights(&scheduler),
            other => println!("unknown command: {other} (try `help`)"),
        }
    }
}

fn dispatch_status(go: &GlobalOrchestrator, scheduler: &ResourceScheduler, component: Option<&str>) {
    match component {
        None | Some("go") => status_view::print_text(&go.get_global_status()),
        Some("rs") => {
            let status = scheduler.get_scheduling_status();
            println!(
                "rs: {} projects, {} pending tasks, {} active tasks, mean efficiency {:.2}, fragmentation {:.2}",
                status.total_projects, status.pending_tasks, status.active_tasks, status.mean_efficiency, status.fragmentation
            );
        }
        Some("cm") => println!("cm: use `projects` to list the registry"),
        Some(other) => println!("unknown status component: {other}"),
    }
}

fn dispatch_projects(config: &ConfigManager) {
    let mut projects = config.list_projects();
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    for project in projects {
        println!(
            "{:<24} {:<10} {:<8} {}",
            project.name,
            project.priority,
            project.status,
            project.path.display()
        );
    }
}

fn dispatch_register(config: &ConfigManager, args: &[&str]) {
    let [name, path] = args else {
        println!("usage: register <name> <path>");
        return;
    };
    match config.register_project(*name, PathBuf::from(path), RegisterOptions::default()) {
        Ok(record) => println!("registered {}", record.name),
        Err(e) => println!("register failed: {e}"),
    }
}

fn dispatch_discover(config: &ConfigManager, args: &[&str]) {
    if args.is_empty() {
        println!("usage: discover <path>...");
        return;
    }
    let paths: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
    for candidate in config.discover_projects(&paths) {
        println!(
            "{:<24} {:<12} {}",
            candidate.name,
            candidate.classification,
            candidate.language.as_deref().unwrap_or("-")
        );
    }
}

async fn dispatch_start(go: &GlobalOrchestrator, args: &[&str]) {
    let Some(name) = args.first() else {
        println!("usage: start <project>");
        return;
    };
    println!("start {name}: {}", go.start_project(name).await);
}

async fn dispatch_stop(go: &GlobalOrchestrator, args: &[&str]) {
    let Some(name) = args.first() else {
        println!("usage: stop <project>");
        return;
    };
    println!("stop {name}: {}", go.stop_project(name).await);
}

fn dispatch_optimize(scheduler: &ResourceScheduler) {
    let result = scheduler.optimise_allocation();
    println!(
        "optimised with {}: {} change(s), efficiency +{:.2}, resource savings {:.1}%",
        result.strategy_used,
        result.changes.len(),
        result.improvement_metrics.efficiency_improvement,
        result.improvement_metrics.resource_savings_percent
    );
    for change in result.changes {
        println!("  - {change}");
    }
}

fn dispatch_insights(scheduler: &ResourceScheduler) {
    let status = scheduler.get_scheduling_status();
    let util = status.system_utilization;
    println!(
        "utilisation: agents {:.0}%, memory {:.0}%, disk {:.0}%",
        util.agents * 100.0,
        util.memory * 100.0,
        util.disk * 100.0
    );
}
