// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup (§2.1 ambient stack): an `EnvFilter`-gated `fmt` layer plus
//! a non-blocking rolling file writer under the global state directory, so
//! logs survive a detached `--daemon` run.

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber and returns the file appender's guard.
/// The caller must keep the guard alive for the life of the process — once
/// dropped, the non-blocking writer stops flushing.
pub fn init(global_state_path: &Path, debug: bool) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(global_state_path)?;

    let file_appender = tracing_appender::rolling::daily(global_state_path, "supervisor.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(guard)
}
