// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled enrollment daemon (eschedd)
//!
//! Background process that owns the schedule store and activates due
//! schedules against the host LMS.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use esched_daemon::Config;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::lifecycle::LifecycleError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = parse_args(std::env::args().skip(1))?;
    let config = Config::load(config_path.as_deref())?;

    // Write startup marker to log (before tracing setup, so the CLI can find it)
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!("Starting eschedd, state in {}", config.state_dir.display());

    let daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    let mut ticker = tokio::time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for parent process (e.g., systemd, CLI waiting for startup)
    println!("READY");

    loop {
        tokio::select! {
            result = daemon.listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let service = Arc::clone(&daemon.service);
                        let shutdown = shutdown_tx.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server::handle_connection(&service, stream, shutdown).await {
                                error!("Error handling connection: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }

            _ = ticker.tick() => {
                let service = Arc::clone(&daemon.service);
                tokio::spawn(async move {
                    if let Err(e) = service.trigger().tick().await {
                        error!("Scheduled activation failed: {}", e);
                    }
                });
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }

            Some(()) = shutdown_rx.recv() => {
                info!("Shutdown requested via IPC, shutting down...");
                break;
            }
        }
    }

    daemon.shutdown();
    info!("Daemon stopped");
    Ok(())
}

/// `eschedd [--config <path>]`
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>, String> {
    let mut config_path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().ok_or("--config requires a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--version" | "-V" => {
                println!("eschedd {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other => return Err(format!("unexpected argument: {other}")),
        }
    }
    Ok(config_path)
}

/// Startup marker prefix written to log before anything else.
/// CLI uses this to find where the current startup attempt begins.
/// Full format: "--- eschedd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- eschedd: starting (pid: ";

fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (Some(dir), Some(file_name)) = (config.log_path.parent(), config.log_path.file_name())
    else {
        return Err(LifecycleError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid log path: {}", config.log_path.display()),
        )));
    };
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
