//! Fixed locations inside a graft workspace.

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

/// Name of the binary target rebuilt by each cycle.
pub const BINARY_NAME: &str = "graft";

/// Workspace manifest, relative to the workspace root.
pub const WORKSPACE_MANIFEST: &str = "Cargo.toml";

/// Manifest of the crate that owns the binary.
pub const CLI_MANIFEST: &str = "crates/graft-cli/Cargo.toml";

/// Generated plugin list module.
pub const PLUGIN_LIST: &str = "crates/graft-cli/src/plugin_list.rs";

/// Entry point whose import block links plugin crates into the binary.
pub const PLUGIN_IMPORTS: &str = "crates/graft-cli/src/plugin_imports.rs";

/// Paths used by one build cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    source_dir: PathBuf,
    workspace_dir: PathBuf,
    target_dir: PathBuf,
    install_target: PathBuf,
}

impl ProjectLayout {
    /// Describes a cycle that copies `source_dir` into `workspace_dir`,
    /// builds into `target_dir` and installs to `install_target`.
    #[must_use]
    pub fn new(
        source_dir: impl Into<PathBuf>,
        workspace_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        install_target: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            workspace_dir: workspace_dir.into(),
            target_dir: target_dir.into(),
            install_target: install_target.into(),
        }
    }

    /// Canonical source tree.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Scratch workspace owned by the cycle.
    #[must_use]
    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    /// Cargo target directory.
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// File replaced by the installed binary.
    #[must_use]
    pub fn install_target(&self) -> &Path {
        &self.install_target
    }

    /// Workspace `Cargo.toml`.
    #[must_use]
    pub fn workspace_manifest(&self) -> PathBuf {
        self.workspace_dir.join(WORKSPACE_MANIFEST)
    }

    /// `Cargo.toml` of the CLI crate inside the workspace.
    #[must_use]
    pub fn cli_manifest(&self) -> PathBuf {
        self.workspace_dir.join(CLI_MANIFEST)
    }

    /// Generated plugin list inside the workspace.
    #[must_use]
    pub fn plugin_list(&self) -> PathBuf {
        self.workspace_dir.join(PLUGIN_LIST)
    }

    /// Entry point with the plugin import block inside the workspace.
    #[must_use]
    pub fn plugin_imports(&self) -> PathBuf {
        self.workspace_dir.join(PLUGIN_IMPORTS)
    }

    /// Files a freshly copied workspace must contain.
    #[must_use]
    pub fn required_files(&self) -> [PathBuf; 4] {
        [
            self.workspace_manifest(),
            self.cli_manifest(),
            self.plugin_list(),
            self.plugin_imports(),
        ]
    }

    /// Binary produced by a release build.
    #[must_use]
    pub fn built_binary(&self) -> PathBuf {
        self.target_dir
            .join("release")
            .join(format!("{BINARY_NAME}{EXE_SUFFIX}"))
    }
}
