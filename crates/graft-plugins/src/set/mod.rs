//! Plugin sets and the reconciliation of a requested operation against the
//! installed set.
//!
//! [`reconcile`] is pure: it takes the installed set by value and returns
//! the target set plus an optional upgrade request. Nothing here touches the
//! filesystem or runs tools.

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;

use crate::id::PluginId;

/// Deduplicated, lexicographically ordered collection of plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginSet {
    members: BTreeSet<PluginId>,
}

impl PluginSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: BTreeSet::new(),
        }
    }

    /// Adds `id`, returning `false` when it was already present.
    pub fn insert(&mut self, id: PluginId) -> bool {
        self.members.insert(id)
    }

    /// Removes `id`, returning `false` when it was absent.
    pub fn remove(&mut self, id: &PluginId) -> bool {
        self.members.remove(id)
    }

    /// Returns whether `id` is a member.
    #[must_use]
    pub fn contains(&self, id: &PluginId) -> bool {
        self.members.contains(id)
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` when the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates members in lexicographic order.
    pub fn iter(&self) -> btree_set::Iter<'_, PluginId> {
        self.members.iter()
    }
}

impl FromIterator<PluginId> for PluginSet {
    fn from_iter<I: IntoIterator<Item = PluginId>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl Extend<PluginId> for PluginSet {
    fn extend<I: IntoIterator<Item = PluginId>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

impl<'a> IntoIterator for &'a PluginSet {
    type Item = &'a PluginId;
    type IntoIter = btree_set::Iter<'a, PluginId>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl IntoIterator for PluginSet {
    type Item = PluginId;
    type IntoIter = btree_set::IntoIter<PluginId>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

/// Change requested by the user for one build cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOperation {
    /// Rebuild with the installed set unchanged.
    Rebuild,
    /// Enable a plugin.
    Add(PluginId),
    /// Disable a plugin.
    Remove(PluginId),
    /// Keep membership and refresh one plugin's dependency.
    Update(PluginId),
}

impl UpdateOperation {
    /// Returns the plugin the operation names, if any.
    #[must_use]
    pub const fn plugin(&self) -> Option<&PluginId> {
        match self {
            Self::Rebuild => None,
            Self::Add(id) | Self::Remove(id) | Self::Update(id) => Some(id),
        }
    }

    /// Returns the lower-case verb for the operation.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Rebuild => "rebuild",
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Update(_) => "update",
        }
    }
}

impl fmt::Display for UpdateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.plugin() {
            Some(id) => write!(f, "{} {id}", self.verb()),
            None => f.write_str(self.verb()),
        }
    }
}

/// Target set for a cycle plus the plugin to upgrade, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    plugins: PluginSet,
    upgrade: Option<PluginId>,
}

impl Reconciliation {
    /// Returns the plugin set the cycle should build.
    #[must_use]
    pub const fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    /// Returns the plugin whose dependency should be upgraded.
    #[must_use]
    pub const fn upgrade(&self) -> Option<&PluginId> {
        self.upgrade.as_ref()
    }

    /// Splits the reconciliation into its parts.
    #[must_use]
    pub fn into_parts(self) -> (PluginSet, Option<PluginId>) {
        (self.plugins, self.upgrade)
    }
}

/// Applies `operation` to the installed set.
///
/// Adding a present plugin and removing an absent one are no-ops. `Update`
/// never changes membership; it only reports the plugin to upgrade.
///
/// # Example
///
/// ```
/// use graft_plugins::{PluginId, PluginSet, UpdateOperation, reconcile};
///
/// let zip = PluginId::new("graft-plugin-zip").expect("valid name");
/// let result = reconcile(PluginSet::new(), &UpdateOperation::Add(zip.clone()));
///
/// assert!(result.plugins().contains(&zip));
/// assert!(result.upgrade().is_none());
/// ```
#[must_use]
pub fn reconcile(installed: PluginSet, operation: &UpdateOperation) -> Reconciliation {
    let mut plugins = installed;
    let mut upgrade = None;

    match operation {
        UpdateOperation::Rebuild => {}
        UpdateOperation::Add(id) => {
            plugins.insert(id.clone());
        }
        UpdateOperation::Remove(id) => {
            plugins.remove(id);
        }
        UpdateOperation::Update(id) => upgrade = Some(id.clone()),
    }

    Reconciliation { plugins, upgrade }
}
