// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! esched - scheduled enrollment admin CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{bulk, daemon, schedule};
use esched_core::{CourseId, UserId};
use esched_daemon::Config;

use crate::client::DaemonClient;
use crate::error::CliError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "esched", version, about = "Scheduled course enrollment")]
struct Cli {
    /// Daemon config file (default: <state dir>/esched.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Daemon socket path
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule management
    Schedule(schedule::ScheduleArgs),
    /// Activate or delete many schedules at once
    Bulk(bulk::BulkArgs),
    /// Ask whether a user may view a course right now
    Access { user: u64, course: u64 },
    /// Activate every due schedule now
    Tick,
    /// Daemon uptime and schedule counters
    Status,
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", CliError::from_anyhow(e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(socket) = cli.socket {
        config.socket_path = socket;
    }
    let format = cli.format;

    // Handle daemon command separately (doesn't need a client connection)
    let command = match cli.command {
        Commands::Daemon(args) => return daemon::handle(args, &config).await,
        command => command,
    };

    let client = DaemonClient::connect_or_start(&config)?;

    match command {
        Commands::Schedule(args) => schedule::handle(args.command, &client, format).await?,

        Commands::Bulk(args) => bulk::handle(args, &client, format).await?,

        Commands::Access { user, course } => {
            let decision = client.decide(UserId(user), CourseId(course)).await?;
            output::print(&decision, || output::decision_text(&decision), format);
        }

        Commands::Tick => {
            let activated = client.tick().await?;
            output::print(
                &serde_json::json!({ "activated": activated }),
                || format!("Activated {} schedule(s)\n", activated),
                format,
            );
        }

        Commands::Status => {
            let (uptime_secs, stats) = client.status().await?;
            output::print(
                &serde_json::json!({ "uptime_secs": uptime_secs, "stats": stats }),
                || output::status_text(uptime_secs, &stats),
                format,
            );
        }

        Commands::Daemon(_) => {}
    }

    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
