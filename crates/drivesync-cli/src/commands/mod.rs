//! CLI command implementations

pub mod diff;
pub mod init;
pub mod plan;

use std::path::{Path, PathBuf};

use drivesync_core::config::Config;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// State shared by every command: global flags and the loaded configuration
#[derive(Debug)]
pub struct CommandContext {
    format: OutputFormat,
    config_path: PathBuf,
    config: Config,
    quiet: bool,
}

impl CommandContext {
    pub fn new(format: OutputFormat, explicit_config: Option<PathBuf>, quiet: bool) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let config_path = resolve_config_path(explicit_config, &cwd);
        let config = Config::load_or_default(&config_path);
        Self {
            format,
            config_path,
            config,
            quiet,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(matches!(self.format, OutputFormat::Json))
    }
}

/// Picks the configuration file: `--config`, then the context of the
/// current directory, then the per-user default.
pub fn resolve_config_path(explicit: Option<PathBuf>, cwd: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    let context = Config::context_path(cwd);
    if context.is_file() {
        return context;
    }
    Config::default_path()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_explicit_config_wins() {
        let dir = TempDir::new().unwrap();
        let path = resolve_config_path(Some(PathBuf::from("/etc/drivesync.yaml")), dir.path());
        assert_eq!(path, PathBuf::from("/etc/drivesync.yaml"));
    }

    #[test]
    fn test_context_config_is_found() {
        let dir = TempDir::new().unwrap();
        let context = Config::context_path(dir.path());
        std::fs::create_dir_all(context.parent().unwrap()).unwrap();
        std::fs::write(&context, "reconcile:\n  concurrency: 2\n").unwrap();

        assert_eq!(resolve_config_path(None, dir.path()), context);
    }

    #[test]
    fn test_falls_back_to_default_path() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_config_path(None, dir.path()), Config::default_path());
    }

    #[test]
    fn test_context_loads_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "reconcile:\n  concurrency: 3\n").unwrap();

        let ctx = CommandContext::new(OutputFormat::Json, Some(path.clone()), true);
        assert_eq!(ctx.config_path(), path);
        assert_eq!(ctx.config().reconcile.concurrency, 3);
        assert!(ctx.quiet());
        assert_eq!(ctx.format(), OutputFormat::Json);
    }
}
