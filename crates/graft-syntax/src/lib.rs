//! Tree-sitter powered import editing for the graft toolchain.
//!
//! This crate owns the one piece of live-source surgery graft performs: making
//! sure the generated entry point of the `graft` binary imports every enabled
//! plugin crate. The edit is structural rather than textual:
//!
//! - the file is parsed with the Rust grammar and its top-level `use` and
//!   `extern crate` declarations are read into an [`ImportBlock`];
//! - a missing import is inserted directly after the last existing one,
//!   reusing its indentation and the file's line endings;
//! - every other byte of the file is reproduced verbatim.
//!
//! A file without an import block, or with syntax errors inside it, is
//! rejected rather than patched.
//!
//! # Example
//!
//! ```
//! use graft_syntax::ensure_import_in;
//!
//! let source = "use std::fmt;\n\nfn main() {}\n";
//! let edit = ensure_import_in(source, "graft_plugin_audit")?;
//!
//! assert!(edit.changed());
//! assert_eq!(
//!     edit.output(),
//!     "use std::fmt;\nuse graft_plugin_audit as _;\n\nfn main() {}\n"
//! );
//!
//! // A second pass finds the import and leaves the text alone.
//! let again = ensure_import_in(edit.output(), "graft_plugin_audit")?;
//! assert!(!again.changed());
//! # Ok::<(), graft_syntax::ImportEditError>(())
//! ```

mod error;
mod imports;
mod parser;

pub use error::{ImportEditError, SyntaxError};
pub use imports::{ImportBlock, ImportEdit, ImportEditor, ImportRecord, ensure_import_in};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
