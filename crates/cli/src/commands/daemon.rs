// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon start/stop

use anyhow::Result;
use clap::{Args, Subcommand};
use esched_daemon::Config;

use crate::client::{daemon_stop, DaemonClient};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start eschedd in the background if it is not running
    Start,
    /// Stop eschedd
    Stop,
}

pub async fn handle(args: DaemonArgs, config: &Config) -> Result<()> {
    match args.command {
        DaemonCommand::Start => {
            let client = DaemonClient::connect_or_start(config)?;
            let version = client.hello().await?;
            println!(
                "eschedd {} running, socket {}",
                version,
                config.socket_path.display()
            );
        }
        DaemonCommand::Stop => {
            if daemon_stop(config).await? {
                println!("Daemon stopped");
            } else {
                println!("Daemon not running");
            }
        }
    }
    Ok(())
}
