// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk actions over schedule ids

use anyhow::Result;
use clap::{Args, ValueEnum};
use esched_core::ScheduleId;
use esched_engine::BulkAction;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BulkActionArg {
    Activate,
    Delete,
}

impl From<BulkActionArg> for BulkAction {
    fn from(arg: BulkActionArg) -> Self {
        match arg {
            BulkActionArg::Activate => BulkAction::Activate,
            BulkActionArg::Delete => BulkAction::Delete,
        }
    }
}

#[derive(Args)]
pub struct BulkArgs {
    #[arg(value_enum)]
    pub action: BulkActionArg,
    #[arg(required = true)]
    pub ids: Vec<u64>,
}

/// Runs every id; fails only when nothing succeeded
pub async fn handle(args: BulkArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let ids = args.ids.into_iter().map(ScheduleId).collect();
    let outcome = client.bulk(args.action.into(), ids).await?;
    output::print(&outcome, || output::bulk_text(&outcome), format);

    if outcome.processed == 0 && !outcome.errors.is_empty() {
        anyhow::bail!("no schedules were processed");
    }
    Ok(())
}
