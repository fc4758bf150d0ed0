//! Entry point for the `graft` binary.
//!
//! Delegates to [`graft_cli::run`], which loads configuration, parses the
//! command and drives a rebuild cycle when the plugin set changes.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    graft_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
