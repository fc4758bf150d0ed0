//! Failure classification for build cycles.
//!
//! A cycle either completes or stops at the first fatal [`BuildError`], which
//! names the [`BuildStage`] that failed and a classified [`BuildFailure`].
//! Per-plugin wiring problems are not fatal; they are collected as
//! [`PluginWiringFailure`] values in the cycle's report.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use graft_plugins::{PluginError, PluginId};
use graft_syntax::ImportEditError;
use thiserror::Error;

use crate::tool::ToolError;
use crate::workspace::WorkspaceError;

/// Stages of a build cycle, in execution order.
///
/// Each variant names the state the cycle is trying to reach; a failure in
/// that stage moves the cycle to its terminal failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    /// Recreate the scratch workspace from the canonical source tree.
    WorkspacePrepared,
    /// Reconcile the plugin set and regenerate the plugin list.
    ListGenerated,
    /// Add each plugin to the CLI manifest and import it.
    ImportsWired,
    /// Fetch or upgrade dependencies.
    DependenciesFetched,
    /// Compile the binary.
    Compiled,
    /// Replace the install target with the new binary.
    Installed,
}

impl BuildStage {
    /// Every stage in execution order.
    pub const ALL: [Self; 6] = [
        Self::WorkspacePrepared,
        Self::ListGenerated,
        Self::ImportsWired,
        Self::DependenciesFetched,
        Self::Compiled,
        Self::Installed,
    ];

    /// Describes the work done in the stage.
    #[must_use]
    pub const fn activity(self) -> &'static str {
        match self {
            Self::WorkspacePrepared => "preparing the workspace",
            Self::ListGenerated => "generating the plugin list",
            Self::ImportsWired => "wiring imports",
            Self::DependenciesFetched => "fetching dependencies",
            Self::Compiled => "compiling",
            Self::Installed => "installing the binary",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.activity())
    }
}

/// Classified cause of a fatal stage failure.
#[derive(Debug, Clone, Error)]
pub enum BuildFailure {
    /// The source tree or its generated files are not what the cycle
    /// expects.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// An external tool failed.
    #[error(transparent)]
    ExternalTool(#[from] ToolError),

    /// A filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl BuildFailure {
    /// Creates a configuration failure.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O failure for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Returns `true` for configuration failures.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<WorkspaceError> for BuildFailure {
    fn from(error: WorkspaceError) -> Self {
        match error {
            WorkspaceError::MissingSource { .. } | WorkspaceError::MissingFile { .. } => {
                Self::configuration(error.to_string())
            }
            WorkspaceError::Io { path, source } => Self::Io { path, source },
        }
    }
}

impl From<ImportEditError> for BuildFailure {
    fn from(error: ImportEditError) -> Self {
        match error {
            ImportEditError::Read { path, source } | ImportEditError::Write { path, source } => {
                Self::io(path, source)
            }
            other => Self::configuration(other.to_string()),
        }
    }
}

impl From<PluginError> for BuildFailure {
    fn from(error: PluginError) -> Self {
        match error {
            PluginError::Write { path, source } => Self::Io { path, source },
            other => Self::configuration(other.to_string()),
        }
    }
}

/// Fatal failure of a build cycle.
#[derive(Debug, Clone, Error)]
#[error("build failed while {stage}: {cause}")]
pub struct BuildError {
    stage: BuildStage,
    #[source]
    cause: BuildFailure,
}

impl BuildError {
    /// Creates an error for `stage`.
    #[must_use]
    pub const fn new(stage: BuildStage, cause: BuildFailure) -> Self {
        Self { stage, cause }
    }

    /// Returns the stage that failed.
    #[must_use]
    pub const fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Returns the classified cause.
    #[must_use]
    pub const fn cause(&self) -> &BuildFailure {
        &self.cause
    }
}

/// A plugin that could not be wired into the workspace.
///
/// The plugin is left out of the build; the rest of the cycle continues.
#[derive(Debug, Clone, Error)]
#[error("failed to wire plugin '{plugin}': {cause}")]
pub struct PluginWiringFailure {
    plugin: PluginId,
    #[source]
    cause: ToolError,
}

impl PluginWiringFailure {
    /// Records a wiring failure for `plugin`.
    #[must_use]
    pub const fn new(plugin: PluginId, cause: ToolError) -> Self {
        Self { plugin, cause }
    }

    /// Returns the plugin that was skipped.
    #[must_use]
    pub const fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    /// Returns the tool failure behind the skip.
    #[must_use]
    pub const fn cause(&self) -> &ToolError {
        &self.cause
    }
}
