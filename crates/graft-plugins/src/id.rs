//! Validated plugin identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::PluginError;

/// Package name of a plugin crate.
///
/// Names are non-empty, start with an ASCII letter and otherwise contain
/// only ASCII letters, digits, `-` and `_`. Ordering is lexicographic on the
/// name, which fixes iteration order wherever identifiers are collected.
///
/// # Example
///
/// ```
/// use graft_plugins::PluginId;
///
/// let id = PluginId::new("graft-plugin-audit").expect("valid name");
/// assert_eq!(id.import_path(), "graft_plugin_audit");
/// assert!(PluginId::new("../escape").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PluginId(String);

impl PluginId {
    /// Validates `name` and wraps it as an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidIdentifier`] when the name breaks one of
    /// the naming rules.
    pub fn new(raw: impl Into<String>) -> Result<Self, PluginError> {
        let name: String = raw.into();
        match violation(&name) {
            Some(reason) => Err(PluginError::InvalidIdentifier { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Returns the package name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the crate path used in `use` declarations.
    #[must_use]
    pub fn import_path(&self) -> String {
        self.0.replace('-', "_")
    }
}

fn violation(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Some("must not be empty");
    };
    if !first.is_ascii_alphabetic() {
        return Some("must start with an ASCII letter");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Some("may only contain ASCII letters, digits, '-' and '_'");
    }
    None
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PluginId {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
