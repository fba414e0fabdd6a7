//! Configuration module for drivesync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the per-tree directory created by `drivesync init`.
pub const CONTEXT_DIR_NAME: &str = ".drivesync";

/// File name of the configuration inside a context directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for drivesync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub reconcile: ReconcileConfig,
    pub logging: LoggingConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root directory of the local mirror.
    pub root: PathBuf,
    /// JSON listing exported from the remote service.
    pub remote_manifest: Option<PathBuf>,
}

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Maximum number of paths classified (and possibly hashed) at once.
    pub concurrency: usize,
    /// Whether dot-files and dot-directories take part in reconciliation.
    pub include_hidden: bool,
    /// Whether subdirectories of the root are listed.
    pub recursive: bool,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Write the configuration as YAML to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/drivesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("drivesync")
            .join(CONFIG_FILE_NAME)
    }

    /// Path of the configuration file inside the context directory of `root`.
    pub fn context_path(root: &Path) -> PathBuf {
        root.join(CONTEXT_DIR_NAME).join(CONFIG_FILE_NAME)
    }
}

impl SyncConfig {
    /// The sync root with a leading `~` replaced by the home directory.
    pub fn root_path(&self) -> PathBuf {
        expand_tilde(&self.root)
    }

    /// The remote manifest path, tilde-expanded like [`SyncConfig::root_path`].
    pub fn remote_manifest_path(&self) -> Option<PathBuf> {
        self.remote_manifest.as_deref().map(expand_tilde)
    }
}

/// Replaces a leading `~` or `~/` with the user's home directory.
///
/// Paths such as `~other/x` and paths without a tilde are returned unchanged,
/// as is everything when the home directory is unknown.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("Drive"),
            remote_manifest: None,
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            include_hidden: false,
            recursive: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"reconcile.concurrency"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `reconcile.concurrency`.
const MAX_CONCURRENCY: usize = 256;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        let root = self.sync.root_path();
        if !root.is_dir() {
            errors.push(ValidationError {
                field: "sync.root".into(),
                message: format!("directory does not exist: {}", root.display()),
            });
        }
        if let Some(manifest) = &self.sync.remote_manifest {
            if manifest.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: "sync.remote_manifest".into(),
                    message: "must not be empty when set".into(),
                });
            }
        }

        // --- reconcile ---
        if self.reconcile.concurrency == 0 || self.reconcile.concurrency > MAX_CONCURRENCY {
            errors.push(ValidationError {
                field: "reconcile.concurrency".into(),
                message: format!("must be in range 1..={MAX_CONCURRENCY}"),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use drivesync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_root(PathBuf::from("/home/user/Drive"))
///     .reconcile_concurrency(4)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn sync_root(mut self, root: PathBuf) -> Self {
        self.config.sync.root = root;
        self
    }

    pub fn sync_remote_manifest(mut self, manifest: PathBuf) -> Self {
        self.config.sync.remote_manifest = Some(manifest);
        self
    }

    // --- reconcile ---

    pub fn reconcile_concurrency(mut self, n: usize) -> Self {
        self.config.reconcile.concurrency = n;
        self
    }

    pub fn reconcile_include_hidden(mut self, include: bool) -> Self {
        self.config.reconcile.include_hidden = include;
        self
    }

    pub fn reconcile_recursive(mut self, recursive: bool) -> Self {
        self.config.reconcile.recursive = recursive;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
