//! Diff command - Show what differs between the local tree and the remote side
//!
//! Always compares in the push direction (local as source) with no policy
//! overrides, and lists which attributes differ for every modification.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use drivesync_core::domain::ChangePolicy;
use drivesync_sync::reconciler::Direction;

use super::plan::build_plan;
use super::CommandContext;
use crate::output::print_plan;

#[derive(Debug, Args)]
pub struct DiffCommand {
    /// Include dot-files and dot-directories
    #[arg(long)]
    pub hidden: bool,

    /// Remote listing to compare against (overrides sync.remote_manifest)
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

impl DiffCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let plan = build_plan(
            ctx,
            Direction::Push,
            ChangePolicy::default(),
            self.manifest.clone(),
            self.hidden,
        )
        .await?;

        let formatter = ctx.formatter();
        print_plan(
            formatter.as_ref(),
            ctx.format(),
            &plan,
            Direction::Push,
            ctx.quiet(),
            true,
        );
        Ok(())
    }
}
