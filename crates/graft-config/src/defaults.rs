use std::env;
use std::path::{Path, PathBuf};

use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Program used to invoke cargo when `$CARGO` is unset.
pub const DEFAULT_CARGO: &str = "cargo";

/// Directory under the system temporary directory that holds graft's
/// scratch state.
pub const SCRATCH_DIR_NAME: &str = "graft";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::default()
}

/// Root of the graft workspace this binary was compiled from.
#[must_use]
pub fn default_source_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Scratch copy of the workspace rebuilt by each cycle.
#[must_use]
pub fn default_workspace_dir() -> PathBuf {
    scratch_root().join("workspace")
}

/// Cargo target directory shared across cycles so incremental artefacts
/// survive the workspace being recreated.
#[must_use]
pub fn default_target_dir() -> PathBuf {
    scratch_root().join("target")
}

/// Cargo program: `$CARGO` when set, otherwise `cargo` from `PATH`.
#[must_use]
pub fn default_cargo() -> PathBuf {
    env::var_os("CARGO").map_or_else(|| PathBuf::from(DEFAULT_CARGO), PathBuf::from)
}

fn scratch_root() -> PathBuf {
    env::temp_dir().join(SCRATCH_DIR_NAME)
}
