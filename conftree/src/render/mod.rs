//! `local.conf` generation.
//!
//! Rendering walks the tree depth-first in declaration order. Each node's
//! fragments are rendered against one value snapshot taken at the start of
//! the render, and a child subtree is skipped entirely when its
//! `when_parent_is` does not match its parent's current value.

/// Fragment parsing and placeholder substitution.
pub mod fragment;

/// Tree traversal producing the document.
pub mod local_conf;

pub use fragment::Fragment;
pub use local_conf::LOCAL_CONF_HEADER;
