//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use graft_build::BuildError;
use graft_plugins::PluginError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid plugin name: {0}")]
    InvalidPlugin(PluginError),
    #[error("the compiled-in plugin list is invalid: {0}")]
    CompiledPlugins(PluginError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to locate the running executable: {0}")]
    CurrentExe(io::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("failed to write output: {0}")]
    Output(io::Error),
}
