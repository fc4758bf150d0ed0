//! Rendering of the generated plugin list module.
//!
//! The list is a Rust source file compiled into the `graft` binary. It is
//! always regenerated in full; the only input besides the plugin set is the
//! generation timestamp, so equal inputs render byte-identical output.

mod timestamp;

use std::io::Write;
use std::path::Path;

use tempfile::Builder;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use tracing::debug;

use crate::error::PluginError;
use crate::set::PluginSet;

pub use self::timestamp::generation_timestamp;

const GENERATOR_TARGET: &str = "graft_plugins::generator";

/// Name of the constant holding the package names in the generated module.
pub const PLUGIN_LIST_CONST: &str = "PLUGIN_PACKAGES";

/// Renders the plugin list module for `plugins`.
///
/// # Example
///
/// ```
/// use graft_plugins::{PluginId, PluginSet, render};
/// use time::OffsetDateTime;
///
/// let plugins: PluginSet = [PluginId::new("graft-plugin-zip").expect("valid name")]
///     .into_iter()
///     .collect();
/// let module = render(&plugins, OffsetDateTime::UNIX_EPOCH);
///
/// assert!(module.contains("1970-01-01T00:00:00Z"));
/// assert!(module.contains("    \"graft-plugin-zip\",\n"));
/// ```
#[must_use]
pub fn render(plugins: &PluginSet, timestamp: OffsetDateTime) -> String {
    let mut module = format!(
        "// @generated by graft at {}. Do not edit.\n\
         //! Plugin crates compiled into this binary.\n\
         \n\
         /// Package names of the enabled plugin crates, in lexicographic order.\n",
        format_timestamp(timestamp)
    );

    if plugins.is_empty() {
        module.push_str(&format!("pub const {PLUGIN_LIST_CONST}: &[&str] = &[];\n"));
        return module;
    }

    module.push_str(&format!("pub const {PLUGIN_LIST_CONST}: &[&str] = &[\n"));
    for id in plugins {
        module.push_str(&format!("    {:?},\n", id.as_str()));
    }
    module.push_str("];\n");
    module
}

/// Renders the plugin list and atomically replaces the file at `path`.
///
/// # Errors
///
/// Returns [`PluginError::Write`] when the destination directory is missing
/// or the file cannot be written.
pub fn write_plugin_list(
    path: &Path,
    plugins: &PluginSet,
    timestamp: OffsetDateTime,
) -> Result<(), PluginError> {
    let module = render(plugins, timestamp);
    atomic_write(path, module.as_bytes()).map_err(|err| PluginError::write(path, err))?;

    debug!(
        target: GENERATOR_TARGET,
        path = %path.display(),
        plugins = plugins.len(),
        "wrote plugin list"
    );
    Ok(())
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    let utc = timestamp
        .checked_to_offset(UtcOffset::UTC)
        .unwrap_or(timestamp);
    let whole_seconds = utc.replace_nanosecond(0).unwrap_or(utc);
    whole_seconds
        .format(&Rfc3339)
        .unwrap_or_else(|_| whole_seconds.unix_timestamp().to_string())
}

fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let directory = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "plugin list path has no parent directory",
        )
    })?;

    let mut file = Builder::new()
        .prefix(".plugin_list")
        .tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
