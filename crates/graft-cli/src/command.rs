//! Translation of parsed arguments into plugin operations.

use std::path::PathBuf;

use graft_plugins::{PluginId, UpdateOperation};

use crate::AppError;
use crate::cli::{BuildArgs, CliCommand};

/// A validated request ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandPlan {
    /// Run a build cycle for `operation`.
    Build {
        operation: UpdateOperation,
        output: Option<PathBuf>,
    },
    /// Print the compiled-in plugin set.
    List,
}

impl TryFrom<CliCommand> for CommandPlan {
    type Error = AppError;

    fn try_from(command: CliCommand) -> Result<Self, Self::Error> {
        let (operation, build) = match command {
            CliCommand::List => return Ok(Self::List),
            CliCommand::Rebuild { build } => (UpdateOperation::Rebuild, build),
            CliCommand::Add { plugin, build } => (UpdateOperation::Add(parse_plugin(plugin)?), build),
            CliCommand::Remove { plugin, build } => {
                (UpdateOperation::Remove(parse_plugin(plugin)?), build)
            }
            CliCommand::Update { plugin, build } => {
                (UpdateOperation::Update(parse_plugin(plugin)?), build)
            }
        };
        let BuildArgs { output } = build;
        Ok(Self::Build { operation, output })
    }
}

fn parse_plugin(name: String) -> Result<PluginId, AppError> {
    PluginId::new(name).map_err(AppError::InvalidPlugin)
}
