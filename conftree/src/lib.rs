//! # conftree
//!
//! Schema-driven option tree that renders DevStack `local.conf` files.
//!
//! A [`Schema`](data::Schema) of nested, typed options is loaded once. For each
//! request a fresh [`Tree`](data::Tree) is built from it, submitted values are
//! applied by dotted path, and the tree renders a deterministic document by
//! composing each active node's template fragments against a snapshot of all
//! current values.
//!
//! ## Features
//!
//! - Option kinds: boolean, string, choice, hidden and plugin
//! - Schema files in JSON, YAML or TOML
//! - Subtrees gated on their parent's value with `when_parent_is`
//! - HTML form generation for every option
//! - Web front end with pluggable document storage (`web` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use conftree::data::{NodeSchema, Schema, Tree};
//!
//! let schema = Schema::new(vec![
//!     NodeSchema::new("mysql", "boolean").with_template("enable_service mysql"),
//! ])
//! .unwrap();
//!
//! let mut tree = Tree::build(&schema).unwrap();
//! let local_conf = tree.local_conf([("mysql", "on")]).unwrap();
//! assert_eq!(local_conf, "[[local|localrc]]\nenable_service mysql\n");
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Schema model and the runtime option tree
//! - [`render`] - `local.conf` generation
//! - [`form`] - HTML form markup
//! - [`store`] - Generated document storage (requires `web` feature)
//! - [`web`] - HTTP front end (requires `web` feature)

#[macro_use]
extern crate log;

/// Schema model and the runtime option tree.
pub mod data;

/// Error types and result definitions.
pub mod error;

/// HTML form markup for the option tree.
pub mod form;

/// `local.conf` generation.
pub mod render;

/// Storage backends for generated documents.
#[cfg(feature = "web")]
pub mod store;

/// Web server for filling in the form and fetching stored documents.
///
/// This module is only available when the `web` feature is enabled.
#[cfg(feature = "web")]
pub mod web;

pub use error::{Error, Result};
pub use serde_json::Value;
