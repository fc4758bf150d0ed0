//! Registry of the plugins compiled into the running binary.
//!
//! The registry is an explicit value built once at startup from the
//! generated `PLUGIN_PACKAGES` constant and passed to whoever needs the
//! installed set. Duplicate registrations are rejected.

use crate::error::PluginError;
use crate::id::PluginId;
use crate::set::PluginSet;

/// Source of the currently installed plugin set.
pub trait InstalledPluginSource {
    /// Returns the plugins compiled into the running binary.
    ///
    /// # Errors
    ///
    /// Returns an error when the installed set cannot be determined.
    fn list_installed(&self) -> Result<PluginSet, PluginError>;
}

/// Plugins compiled into the running binary.
///
/// # Example
///
/// ```
/// use graft_plugins::{InstalledPluginSource, PluginRegistry};
///
/// let registry = PluginRegistry::from_generated(&["graft-plugin-zip"])
///     .expect("generated list is valid");
/// let installed = registry.list_installed().expect("static registry");
/// assert_eq!(installed.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: PluginSet,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the package names of a generated plugin list.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidIdentifier`] for a malformed name and
    /// [`PluginError::Duplicate`] when a name appears twice.
    pub fn from_generated(packages: &[&str]) -> Result<Self, PluginError> {
        let mut registry = Self::new();
        for package in packages {
            registry.register(PluginId::new(*package)?)?;
        }
        Ok(registry)
    }

    /// Registers a plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Duplicate`] if the plugin is already
    /// registered.
    pub fn register(&mut self, id: PluginId) -> Result<(), PluginError> {
        if self.plugins.contains(&id) {
            return Err(PluginError::Duplicate {
                name: id.as_str().to_owned(),
            });
        }
        self.plugins.insert(id);
        Ok(())
    }

    /// Returns whether a plugin with the given package name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|id| id.as_str() == name)
    }

    /// Returns the registered plugins in lexicographic order.
    #[must_use]
    pub const fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` when no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl InstalledPluginSource for PluginRegistry {
    fn list_installed(&self) -> Result<PluginSet, PluginError> {
        Ok(self.plugins.clone())
    }
}
