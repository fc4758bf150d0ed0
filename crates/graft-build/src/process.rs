//! Process-backed tool runner.

use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::tool::{ToolError, ToolInvocation, ToolOutput, ToolRunner};

const PROCESS_TARGET: &str = "graft_build::process";

/// Runs tools as child processes, blocking until they exit.
///
/// Standard output and standard error are captured; standard input is
/// closed. There is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        let command_line = invocation.to_string();

        let mut command = Command::new(invocation.program());
        command.args(invocation.args()).stdin(Stdio::null());
        if let Some(dir) = invocation.working_dir() {
            command.current_dir(dir);
        }

        debug!(
            target: PROCESS_TARGET,
            command = %command_line,
            "running external tool"
        );

        let output = command.output().map_err(|err| ToolError::Spawn {
            command: command_line.clone(),
            source: Arc::new(err),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            warn!(
                target: PROCESS_TARGET,
                command = %command_line,
                status = ?output.status.code(),
                "external tool failed"
            );
            return Err(ToolError::NonZeroExit {
                command: command_line,
                status: output.status.code(),
                stderr,
            });
        }

        debug!(
            target: PROCESS_TARGET,
            command = %command_line,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "external tool finished"
        );
        Ok(ToolOutput { stdout, stderr })
    }
}
