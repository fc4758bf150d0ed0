//! CLI argument definitions for graft.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line interface for managing the plugins compiled into graft.
#[derive(Parser, Debug)]
#[command(name = "graft", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Options shared by every command that rebuilds the binary.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct BuildArgs {
    /// Installs the rebuilt binary at PATH instead of replacing the running
    /// executable.
    #[arg(long, value_name = "PATH")]
    pub(crate) output: Option<PathBuf>,
}

/// Plugin management commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Rebuilds the binary with the current plugin set.
    Rebuild {
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Adds a plugin crate and rebuilds.
    Add {
        /// Package name of the plugin crate.
        #[arg(value_name = "PLUGIN")]
        plugin: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Removes a plugin crate and rebuilds.
    Remove {
        /// Package name of the plugin crate.
        #[arg(value_name = "PLUGIN")]
        plugin: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Upgrades a plugin crate to its newest compatible version and rebuilds.
    Update {
        /// Package name of the plugin crate.
        #[arg(value_name = "PLUGIN")]
        plugin: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Prints the plugins compiled into this binary.
    List,
}
