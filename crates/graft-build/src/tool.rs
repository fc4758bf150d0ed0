//! External tool invocations and the runner seam.
//!
//! The orchestrator never spawns processes itself. It builds
//! [`ToolInvocation`] values through [`Cargo`] and hands them to a
//! [`ToolRunner`]; production code uses
//! [`SystemToolRunner`](crate::process::SystemToolRunner) while tests script
//! the runner.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use graft_plugins::PluginId;
use thiserror::Error;

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl ToolInvocation {
    /// Creates an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Returns the program to run.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Returns the working directory, if one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Returns the first argument when it is valid UTF-8, which for cargo is
    /// the subcommand.
    #[must_use]
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().and_then(|arg| arg.to_str())
    }

    /// Returns the argument following `flag`, if present.
    #[must_use]
    pub fn flag_value(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(OsString::as_os_str)
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Standard output, decoded lossily.
    pub stdout: String,
    /// Standard error, decoded lossily.
    pub stderr: String,
}

/// Errors raised while running an external tool.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// The process could not be started.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The process ran and reported failure.
    #[error("`{command}` exited with {}:\n{stderr}", describe_status(*status))]
    NonZeroExit {
        /// Rendered command line.
        command: String,
        /// Exit code, or `None` when the process was killed by a signal.
        status: Option<i32>,
        /// Captured standard error, verbatim.
        stderr: String,
    },
}

fn describe_status(status: Option<i32>) -> String {
    status.map_or_else(
        || String::from("no exit code"),
        |code| format!("status {code}"),
    )
}

/// Runs external tools on behalf of the orchestrator.
pub trait ToolRunner {
    /// Runs `invocation` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Spawn`] when the process cannot start and
    /// [`ToolError::NonZeroExit`] when it exits unsuccessfully.
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        (**self).run(invocation)
    }
}

/// Builds the cargo invocations used by a build cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cargo {
    program: PathBuf,
}

impl Cargo {
    /// Creates a builder that runs `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the cargo program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, subcommand: &str, manifest: &Path) -> ToolInvocation {
        let invocation = ToolInvocation::new(&self.program)
            .arg(subcommand)
            .arg("--manifest-path")
            .arg(manifest);
        match manifest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => invocation.current_dir(dir),
            _ => invocation,
        }
    }

    /// `cargo add <package>` against the given crate manifest.
    #[must_use]
    pub fn add(&self, manifest: &Path, package: &PluginId) -> ToolInvocation {
        self.command("add", manifest).arg(package.as_str())
    }

    /// `cargo update --package <package>` for the workspace.
    #[must_use]
    pub fn update(&self, manifest: &Path, package: &PluginId) -> ToolInvocation {
        self.command("update", manifest)
            .arg("--package")
            .arg(package.as_str())
    }

    /// `cargo fetch` for the workspace.
    #[must_use]
    pub fn fetch(&self, manifest: &Path) -> ToolInvocation {
        self.command("fetch", manifest)
    }

    /// `cargo build --release --bin <binary> --target-dir <dir>`.
    #[must_use]
    pub fn build(&self, manifest: &Path, binary: &str, target_dir: &Path) -> ToolInvocation {
        self.command("build", manifest)
            .arg("--release")
            .arg("--bin")
            .arg(binary)
            .arg("--target-dir")
            .arg(target_dir)
    }
}
