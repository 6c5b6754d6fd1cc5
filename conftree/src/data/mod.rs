//! Option schema and the runtime option tree.
//!
//! - [`schema`] - declarative option definitions and schema file loading
//! - [`kind`] - the closed set of option kinds and their values
//! - [`node`] - runtime option nodes
//! - [`tree`] - the tree root: construction, path access and snapshots

/// Declarative option definitions and schema file loading.
pub mod schema;

/// Option kinds, defaults and value coercion.
pub mod kind;

/// Runtime option nodes.
pub mod node;

/// Tree root, path-addressed access and value snapshots.
pub mod tree;

pub use kind::{NodeKind, NodeValue};
pub use node::Node;
pub use schema::{NodeSchema, Schema, SchemaFormat};
pub use tree::{Tree, ValueTree};
