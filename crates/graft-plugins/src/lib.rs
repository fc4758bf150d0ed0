//! Plugin set management for the graft toolchain.
//!
//! A graft plugin is an ordinary crate that is linked into the `graft`
//! binary. This crate models which plugins are enabled and produces the
//! generated source that tells the binary about them:
//!
//! - [`PluginId`] validates crate package names;
//! - [`reconcile`] applies an [`UpdateOperation`] to the installed
//!   [`PluginSet`] and yields the target set for a build cycle;
//! - [`PluginRegistry`] holds the set compiled into the running binary and
//!   implements [`InstalledPluginSource`];
//! - [`render`] and [`write_plugin_list`] produce the generated
//!   `PLUGIN_PACKAGES` module.
//!
//! # Example
//!
//! ```
//! use graft_plugins::{
//!     InstalledPluginSource, PluginId, PluginRegistry, UpdateOperation, reconcile, render,
//! };
//! use time::OffsetDateTime;
//!
//! let registry = PluginRegistry::from_generated(&["graft-plugin-audit"])
//!     .expect("generated list is valid");
//! let installed = registry.list_installed().expect("static registry");
//!
//! let zip = PluginId::new("graft-plugin-zip").expect("valid name");
//! let target = reconcile(installed, &UpdateOperation::Add(zip));
//!
//! let module = render(target.plugins(), OffsetDateTime::UNIX_EPOCH);
//! assert!(module.contains("\"graft-plugin-audit\",\n    \"graft-plugin-zip\","));
//! ```

pub mod error;
pub mod generator;
pub mod id;
pub mod registry;
pub mod set;

pub use self::error::PluginError;
pub use self::generator::{PLUGIN_LIST_CONST, generation_timestamp, render, write_plugin_list};
pub use self::id::PluginId;
pub use self::registry::{InstalledPluginSource, PluginRegistry};
pub use self::set::{PluginSet, Reconciliation, UpdateOperation, reconcile};
