//! Push and pull commands - Plan the changes for one direction
//!
//! Provides `drivesync push` and `drivesync pull`, which:
//! 1. Load and validate the configuration
//! 2. List the local tree and the remote manifest
//! 3. Classify every path and print the ordered plan

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use drivesync_core::domain::ChangePolicy;
use drivesync_sync::filesystem::LocalFileSystemAdapter;
use drivesync_sync::filter::ListingFilter;
use drivesync_sync::manifest::ManifestLister;
use drivesync_sync::reconciler::{Direction, Plan, Reconciler};
use tracing::info;

use super::CommandContext;
use crate::output::print_plan;

#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Treat every path as new on the destination
    #[arg(long)]
    pub force: bool,

    /// Never overwrite or delete anything on the destination
    #[arg(long)]
    pub no_clobber: bool,

    /// Include dot-files and dot-directories
    #[arg(long)]
    pub hidden: bool,

    /// Remote listing to reconcile against (overrides sync.remote_manifest)
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

impl PlanCommand {
    pub async fn execute(&self, direction: Direction, ctx: &CommandContext) -> Result<()> {
        let policy = ChangePolicy::new(self.force, self.no_clobber);
        let plan = build_plan(ctx, direction, policy, self.manifest.clone(), self.hidden).await?;

        let formatter = ctx.formatter();
        print_plan(
            formatter.as_ref(),
            ctx.format(),
            &plan,
            direction,
            ctx.quiet(),
            false,
        );
        Ok(())
    }
}

/// Lists both sides and reconciles them in `direction`
pub async fn build_plan(
    ctx: &CommandContext,
    direction: Direction,
    policy: ChangePolicy,
    manifest: Option<PathBuf>,
    hidden: bool,
) -> Result<Plan> {
    let config = ctx.config();

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!(
            "Invalid configuration ({}): {}",
            ctx.config_path().display(),
            messages.join("; ")
        );
    }

    let Some(manifest) = manifest.or_else(|| config.sync.remote_manifest_path()) else {
        bail!("No remote listing configured. Pass --manifest or set sync.remote_manifest.");
    };

    let mut filter = ListingFilter::from(&config.reconcile);
    filter.include_hidden |= hidden;

    let root = config.sync.root_path();
    let local = LocalFileSystemAdapter::new(&root).with_filter(filter);
    let remote = ManifestLister::new(&manifest).with_filter(filter);

    info!(
        %direction,
        root = %root.display(),
        manifest = %manifest.display(),
        force = policy.force,
        no_clobber = policy.no_clobber,
        "Planning reconciliation"
    );

    let (source, destination) = direction.arrange(&local, &remote);
    Reconciler::new(config.reconcile.concurrency)
        .reconcile(source, destination, policy)
        .await
        .context("Failed to reconcile")
}
