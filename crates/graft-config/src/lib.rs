//! Layered configuration for the graft binary.
//!
//! [`Config`] derives [`ortho_config::OrthoConfig`], which merges built-in
//! defaults, a `.graft.toml` configuration file, `GRAFT_*` environment
//! variables and command-line flags, in increasing order of precedence.
//! Every field is optional; the accessors resolve unset values to the
//! `default_*` functions exported here.

mod defaults;
mod logging;

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CARGO, DEFAULT_LOG_FILTER, SCRATCH_DIR_NAME, default_cargo, default_log_filter,
    default_log_format, default_source_dir, default_target_dir, default_workspace_dir,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for a graft invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "GRAFT")]
pub struct Config {
    /// Tracing filter directive, for example `info` or `graft_build=debug`.
    pub log_filter: Option<String>,
    /// Output format for log events written to stderr.
    pub log_format: Option<LogFormat>,
    /// Canonical graft source tree copied into the scratch workspace.
    pub source_dir: Option<PathBuf>,
    /// Scratch workspace recreated by every build cycle.
    pub workspace_dir: Option<PathBuf>,
    /// Cargo target directory used for rebuilds.
    pub target_dir: Option<PathBuf>,
    /// Cargo executable used for dependency and build steps.
    pub cargo: Option<PathBuf>,
}

impl Config {
    /// Returns the configured log filter or [`DEFAULT_LOG_FILTER`].
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Returns the configured log format or the compact default.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Returns the canonical source tree.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.source_dir.clone().unwrap_or_else(default_source_dir)
    }

    /// Returns the scratch workspace directory.
    #[must_use]
    pub fn workspace_dir(&self) -> PathBuf {
        self.workspace_dir
            .clone()
            .unwrap_or_else(default_workspace_dir)
    }

    /// Returns the cargo target directory.
    #[must_use]
    pub fn target_dir(&self) -> PathBuf {
        self.target_dir.clone().unwrap_or_else(default_target_dir)
    }

    /// Returns the cargo program.
    #[must_use]
    pub fn cargo(&self) -> PathBuf {
        self.cargo.clone().unwrap_or_else(default_cargo)
    }
}
