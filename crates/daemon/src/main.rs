// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! taskwatch daemon (twd)
//!
//! Wakes on a cron schedule, walks the scheduled-job registry, and alerts
//! when a ready job's next run time has slipped into the past.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use tracing::{error, info};
use tw_core::{Config, LogConfig};

use crate::lifecycle::{Daemon, LifecycleError};

/// Number of wake times printed by `--check`
const CHECK_WAKES: usize = 5;

#[derive(Parser)]
#[command(
    name = "twd",
    version,
    about = "Watches scheduled jobs and alerts when one stops running"
)]
struct Args {
    /// Configuration file
    #[arg(long, short, default_value = "taskwatch.toml")]
    config: PathBuf,

    /// Run one scan now and exit
    #[arg(long, conflicts_with = "check")]
    once: bool,

    /// Validate the configuration, print upcoming wake times, and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = Config::load(&args.config).map_err(LifecycleError::from)?;
    let _log_guard = setup_logging(&config.log)?;

    banner(&config, &args.config);

    let daemon = match Daemon::startup(&config) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };
    info!(machine = %daemon.machine, "host");

    if args.check {
        for wake in daemon.schedule.upcoming(Utc::now(), CHECK_WAKES) {
            println!("{}", wake.to_rfc3339());
        }
        return Ok(());
    }

    if args.once {
        let result = daemon.scan_once().await.inspect_err(|e| error!("{}", e))?;
        info!(
            examined = result.examined,
            overdue = result.overdue.len(),
            "single scan finished"
        );
        return Ok(());
    }

    info!(schedule = %daemon.schedule.expression(), "daemon ready");
    daemon.run(shutdown_signal()).await;
    info!("Daemon stopped");
    Ok(())
}

fn banner(config: &Config, path: &Path) {
    let title = format!("{} v{}", config.name, env!("CARGO_PKG_VERSION"));
    info!("{}", title);
    info!("{}", "=".repeat(title.len()));
    info!(config = %path.display(), "configuration loaded");
}

/// Resolves on the first SIGINT or SIGTERM
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to install signal handlers: {}", e);
            return;
        }
    };
    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }
}

/// Resolves on the first Ctrl-C
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down..."),
        Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
    }
}

fn setup_logging(
    log: &LogConfig,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // RUST_LOG wins over the configured filter
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&log.filter)
            .map_err(|e| LifecycleError::LogFilter(log.filter.clone(), e.to_string()))?,
    };

    let (writer, guard, ansi) = match &log.path {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| LifecycleError::LogPath(path.clone()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            (writer, guard, false)
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, std::io::stderr().is_terminal())
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(ansi))
        .init();

    Ok(guard)
}
