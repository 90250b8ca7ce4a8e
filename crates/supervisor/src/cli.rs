// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface (§6): `multi-project-orchestrator`.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "multi-project-orchestrator", about = "Multi-project orchestration supervisor", version)]
pub struct Cli {
    /// Registry file.
    #[arg(long, default_value = "orch-config.yaml")]
    pub config: PathBuf,

    /// Disable the security collaborator (interface-only; core does not inspect semantics).
    #[arg(long)]
    pub no_security: bool,
    /// Disable the observability/metrics collaborator.
    #[arg(long)]
    pub no_monitoring: bool,
    /// Disable the cross-project "intelligence" pattern miner.
    #[arg(long)]
    pub no_intelligence: bool,
    /// Activate the chat-bot collaborator, if configured.
    #[arg(long)]
    pub enable_discord: bool,

    /// Run the interactive shell instead of headless.
    #[arg(long, conflicts_with = "daemon")]
    pub interactive: bool,
    /// Run headless (default when neither flag is given).
    #[arg(long, conflicts_with = "interactive")]
    pub daemon: bool,

    /// Discover projects under one or more paths and auto-register them.
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub discover: Vec<PathBuf>,

    /// One-shot registration: `--register <name> <path>`.
    #[arg(long, num_args = 2, value_names = ["NAME", "PATH"])]
    pub register: Option<Vec<String>>,

    /// Print a JSON status snapshot and exit.
    #[arg(long)]
    pub status: bool,

    /// Verbose logging.
    #[arg(long)]
    pub debug: bool,
}

/// Toggles passed through to external collaborators (§6); the core never
/// inspects their semantics beyond logging them at startup.
#[derive(Debug, Clone, Copy)]
pub struct FeatureToggles {
    pub security: bool,
    pub monitoring: bool,
    pub intelligence: bool,
    pub discord: bool,
}

impl From<&Cli> for FeatureToggles {
    fn from(cli: &Cli) -> Self {
        Self {
            security: !cli.no_security,
            monitoring: !cli.no_monitoring,
            intelligence: !cli.no_intelligence,
            discord: cli.enable_discord,
        }
    }
}
