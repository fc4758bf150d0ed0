// @generated by graft at 1970-01-01T00:00:00Z. Do not edit.
//! Plugin crates compiled into this binary.

/// Package names of the enabled plugin crates, in lexicographic order.
pub const PLUGIN_PACKAGES: &[&str] = &[];
