//! Init command - Create a drivesync context in a directory
//!
//! `drivesync init [DIR]` creates `DIR/.drivesync/config.yaml` with the sync
//! root pointing at `DIR`. If a first initialization fails or SIGINT/SIGTERM
//! arrives while it is in progress, the half-created context directory is
//! removed again. An existing context is never removed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use drivesync_core::config::{Config, ConfigBuilder, CONTEXT_DIR_NAME};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::CommandContext;
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Directory to initialize
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

/// What an interrupted init has to undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitState {
    pub context_dir: PathBuf,
    pub first_init: bool,
}

impl InitState {
    pub fn for_root(root: &Path) -> Self {
        let context_dir = root.join(CONTEXT_DIR_NAME);
        let first_init = !context_dir.exists();
        Self {
            context_dir,
            first_init,
        }
    }

    /// Removes the context directory if this run created it
    pub fn cleanup(&self) -> Result<()> {
        if !self.first_init {
            return Ok(());
        }
        match std::fs::remove_dir_all(&self.context_dir) {
            Ok(()) => {
                info!(path = %self.context_dir.display(), "Removed partially initialized context");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove {}", self.context_dir.display())
            }),
        }
    }
}

impl InitCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = ctx.formatter();
        let root = std::fs::canonicalize(&self.dir)
            .with_context(|| format!("Directory not found: {}", self.dir.display()))?;

        let token = CancellationToken::new();
        let signal_token = token.clone();
        let signals = tokio::spawn(async move {
            shutdown_signal(signal_token).await;
        });

        let result = initialize(&root, token).await;
        signals.abort();
        let config_path = result?;

        if ctx.format() == OutputFormat::Json {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "root": root.display().to_string(),
                "config": config_path.display().to_string(),
            }));
        } else if !ctx.quiet() {
            formatter.success(&format!(
                "Initialized drivesync context in {}",
                root.display()
            ));
        }
        Ok(())
    }
}

/// Writes the context for `root`, undoing a first init if it fails or `token` fires
///
/// Returns the path of the configuration file.
pub async fn initialize(root: &Path, token: CancellationToken) -> Result<PathBuf> {
    let state = InitState::for_root(root);
    let config_path = Config::context_path(root);

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            warn!(root = %root.display(), "Initialization interrupted");
            state.cleanup()?;
            bail!("Initialization of {} was interrupted", root.display());
        }
        written = write_context(root, &state, &config_path) => {
            if let Err(e) = written {
                if let Err(cleanup) = state.cleanup() {
                    warn!(error = %cleanup, "Failed to clean up after failed initialization");
                }
                return Err(e);
            }
        }
    }

    Ok(config_path)
}

async fn write_context(root: &Path, state: &InitState, config_path: &Path) -> Result<()> {
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    tokio::fs::create_dir_all(&state.context_dir)
        .await
        .with_context(|| format!("Failed to create {}", state.context_dir.display()))?;

    if config_path.is_file() {
        info!(config = %config_path.display(), "Keeping existing configuration");
        return Ok(());
    }

    let config = ConfigBuilder::new().sync_root(root.to_path_buf()).build();
    let target = config_path.to_path_buf();
    tokio::task::spawn_blocking(move || config.save(&target))
        .await
        .context("Configuration writer panicked")?
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    info!(config = %config_path.display(), "Wrote configuration");
    Ok(())
}

/// Cancels `token` on SIGINT or SIGTERM
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
