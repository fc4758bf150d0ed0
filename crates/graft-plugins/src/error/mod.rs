//! Domain errors raised by plugin set operations.
//!
//! I/O errors are wrapped in `Arc` so the enum stays cheap to clone into
//! reports and small enough for the `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising from plugin identifiers, the registry and the generated
/// plugin list.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// A plugin name is not a usable crate package name.
    #[error("invalid plugin name '{name}': {reason}")]
    InvalidIdentifier {
        /// The rejected name.
        name: String,
        /// Which rule the name broke.
        reason: &'static str,
    },

    /// The same plugin was registered twice.
    #[error("plugin '{name}' is already registered")]
    Duplicate {
        /// Name of the repeated plugin.
        name: String,
    },

    /// The generated plugin list could not be written.
    #[error("failed to write plugin list {}: {source}", path.display())]
    Write {
        /// Destination of the generated list.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The installed plugin set could not be determined.
    #[error("failed to read installed plugins: {message}")]
    Source {
        /// Description of the failure.
        message: String,
    },
}

impl PluginError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
