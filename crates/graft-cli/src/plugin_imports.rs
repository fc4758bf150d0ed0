//! Links every enabled plugin crate into the binary.

use graft_plugins as _;
