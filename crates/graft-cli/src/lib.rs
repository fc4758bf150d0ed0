//! Command-line runtime for graft.
//!
//! The runtime owns argument parsing, configuration bootstrapping and the
//! mapping from commands onto plugin operations. A command that changes the
//! plugin set drives a full rebuild through [`graft_build`]; `list` reports
//! the set compiled into the running binary. Configuration loading and the
//! external tool runner can be substituted so the runtime is testable
//! without touching the real toolchain.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use graft_build::{BINARY_NAME, BuildOrchestrator, Cargo, ProjectLayout, SystemToolRunner, ToolRunner};
use graft_config::Config;
use graft_plugins::{PluginRegistry, UpdateOperation, generation_timestamp};
use tracing::info;

mod cli;
mod command;
mod config;
mod errors;
mod plugin_imports;
pub mod plugin_list;
pub mod telemetry;

use cli::Cli;
use command::CommandPlan;
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use plugin_list::PLUGIN_PACKAGES;

const CLI_TARGET: &str = "graft_cli";

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `graft_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--source-dir",
    "--workspace-dir",
    "--target-dir",
    "--cargo",
];

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Collaborators the runtime depends on.
pub(crate) struct Runtime<'a, L, R> {
    pub(crate) loader: &'a L,
    pub(crate) runner: &'a R,
    pub(crate) compiled_plugins: &'a [&'a str],
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    let runtime = Runtime {
        loader: &OrthoConfigLoader,
        runner: &SystemToolRunner,
        compiled_plugins: PLUGIN_PACKAGES,
    };
    run_with(args, &mut io, &runtime)
}

/// Runs the CLI against substituted collaborators.
pub(crate) fn run_with<I, W, E, L, R>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    runtime: &Runtime<'_, L, R>,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    R: ToolRunner,
{
    match execute(args, io, runtime) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            let _ = writeln!(io.stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<I, W, E, L, R>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    runtime: &Runtime<'_, L, R>,
) -> Result<ExitCode, AppError>
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    R: ToolRunner,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(&split.command_arguments) {
        Ok(cli) => cli,
        // Help and version requests are not failures.
        Err(error) if !error.use_stderr() => {
            write!(io.stdout, "{error}").map_err(AppError::Output)?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(error) => return Err(AppError::CliUsage(error)),
    };
    let plan = CommandPlan::try_from(cli.command)?;

    let config = runtime.loader.load(&split.config_arguments)?;
    telemetry::initialise(&config)?;
    let registry =
        PluginRegistry::from_generated(runtime.compiled_plugins).map_err(AppError::CompiledPlugins)?;

    match plan {
        CommandPlan::List => {
            list_plugins(&registry, io)?;
            Ok(ExitCode::SUCCESS)
        }
        CommandPlan::Build { operation, output } => {
            rebuild(&config, &registry, runtime.runner, &operation, output, io)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn list_plugins<W, E>(registry: &PluginRegistry, io: &mut IoStreams<'_, W, E>) -> Result<(), AppError>
where
    W: Write,
    E: Write,
{
    for plugin in registry.plugins() {
        writeln!(io.stdout, "{plugin}").map_err(AppError::Output)?;
    }
    Ok(())
}

fn rebuild<W, E, R>(
    config: &Config,
    registry: &PluginRegistry,
    runner: &R,
    operation: &UpdateOperation,
    output: Option<PathBuf>,
    io: &mut IoStreams<'_, W, E>,
) -> Result<(), AppError>
where
    W: Write,
    E: Write,
    R: ToolRunner,
{
    let install_target = match output {
        Some(path) => path,
        None => std::env::current_exe().map_err(AppError::CurrentExe)?,
    };
    let layout = ProjectLayout::new(
        config.source_dir(),
        config.workspace_dir(),
        config.target_dir(),
        install_target,
    );

    let mut warnings = Vec::new();
    let timestamp = generation_timestamp(&mut warnings);
    for warning in &warnings {
        writeln!(io.stderr, "warning: {warning}").map_err(AppError::Output)?;
    }

    info!(
        target: CLI_TARGET,
        operation = %operation,
        installed = registry.len(),
        "rebuilding {BINARY_NAME}"
    );
    let orchestrator = BuildOrchestrator::new(layout, Cargo::new(config.cargo()), runner);
    let report = orchestrator.run(registry, operation, timestamp)?;

    for failure in report.wiring().failures() {
        writeln!(io.stderr, "warning: {failure}").map_err(AppError::Output)?;
    }
    writeln!(
        io.stdout,
        "{operation}: installed {BINARY_NAME} with {} plugin(s) at {}",
        report.wiring().wired().len(),
        report.installed().display()
    )
    .map_err(AppError::Output)
}

#[cfg(test)]
mod tests;
