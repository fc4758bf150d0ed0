//! The self-rebuild cycle for the `graft` binary.
//!
//! Changing the plugin set of `graft` means recompiling it. This crate drives
//! that cycle:
//!
//! 1. copy the canonical source tree into a scratch workspace;
//! 2. reconcile the requested operation against the installed plugins and
//!    regenerate the plugin list;
//! 3. add each plugin to the CLI crate's manifest and import it from the
//!    entry point;
//! 4. fetch or upgrade dependencies;
//! 5. compile the release binary;
//! 6. atomically replace the installed binary.
//!
//! [`BuildOrchestrator`] sequences these stages and reports failures as a
//! [`BuildError`] naming the stage that failed. External tools are invoked
//! through the [`ToolRunner`] trait so the cycle can be exercised without a
//! real toolchain; [`SystemToolRunner`] runs them as child processes.

pub mod error;
pub mod layout;
pub mod orchestrator;
pub mod process;
pub mod tool;
pub mod workspace;

pub use self::error::{BuildError, BuildFailure, BuildStage, PluginWiringFailure};
pub use self::layout::{BINARY_NAME, ProjectLayout};
pub use self::orchestrator::{BuildOrchestrator, BuildReport, WiringReport};
pub use self::process::SystemToolRunner;
pub use self::tool::{Cargo, ToolError, ToolInvocation, ToolOutput, ToolRunner};
pub use self::workspace::WorkspaceError;

#[cfg(test)]
mod tests;
