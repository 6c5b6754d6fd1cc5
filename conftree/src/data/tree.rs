use std::fmt::Write as _;

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    data::{
        kind::{NodeKind, NodeValue},
        node::{Children, Node, build_children, lookup, lookup_mut},
        schema::Schema,
    },
    error::{SchemaError, UnknownPathError},
};

/// Flat snapshot of every option's value, keyed by dotted path.
pub type ValueTree = IndexMap<String, NodeValue>;

/// Root of an option tree.
///
/// The root carries no schema, no value and an empty path; it owns every
/// node through its children. A tree is built per request from the shared
/// [`Schema`] and dropped after rendering.
#[derive(Debug, Clone)]
pub struct Tree<'s> {
    children: Children<'s>,
}

impl<'s> Tree<'s> {
    /// Instantiate one node per declared option, each holding its default.
    pub fn build(schema: &'s Schema) -> Result<Self, SchemaError> {
        for option in &schema.options {
            if option.when_parent_is.is_some() {
                return Err(SchemaError::RootActivation {
                    path: option.name.clone(),
                });
            }
        }
        let children = build_children(&schema.options, "")?;
        Ok(Self { children })
    }

    /// Top-level options in declaration order.
    pub fn children(&self) -> &Children<'s> {
        &self.children
    }

    /// Find a node by dotted path.
    pub fn get(&self, path: &str) -> Option<&Node<'s>> {
        lookup(&self.children, path)
    }

    /// Current value of the node at `path`.
    pub fn value(&self, path: &str) -> Result<&NodeValue, UnknownPathError> {
        self.get(path)
            .map(Node::value)
            .ok_or_else(|| UnknownPathError::new(path))
    }

    /// Coerce and store `raw` on the node at `path`.
    ///
    /// The path is resolved before anything is written, so an unknown path
    /// leaves the tree untouched.
    pub fn set_value(&mut self, path: &str, raw: &Value) -> Result<(), UnknownPathError> {
        let node = lookup_mut(&mut self.children, path).ok_or_else(|| UnknownPathError::new(path))?;
        node.set_value(raw);
        trace!("{path} = {:?}", node.value());
        Ok(())
    }

    /// Apply assignments in iteration order, stopping at the first unknown path.
    ///
    /// Assignments before the failing one stay applied; none after it are.
    pub fn set_values<I, K, V>(&mut self, values: I) -> Result<(), UnknownPathError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in values {
            self.set_value(key.as_ref(), &value.into())?;
        }
        Ok(())
    }

    /// Collect `path -> value` for every node in pre-order.
    ///
    /// Activation conditions are ignored here; they only affect rendering.
    pub fn flatten(&self) -> ValueTree {
        fn walk(children: &Children<'_>, out: &mut ValueTree) {
            for child in children.values() {
                out.insert(child.path().to_string(), child.value().clone());
                walk(child.children(), out);
            }
        }

        let mut out = ValueTree::new();
        walk(&self.children, &mut out);
        out
    }

    /// Paths a form submission may target, in pre-order.
    pub fn keys(&self) -> Vec<String> {
        fn walk(children: &Children<'_>, out: &mut Vec<String>) {
            for child in children.values() {
                if !matches!(child.kind(), NodeKind::Hidden) {
                    out.push(child.path().to_string());
                }
                walk(child.children(), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }

    /// Indented `name : value` listing of the whole tree.
    pub fn dump(&self) -> String {
        fn walk(children: &Children<'_>, indent: usize, out: &mut String) {
            for (name, child) in children {
                let _ = writeln!(out, "{:indent$}{name} : {}", "", child.value());
                walk(child.children(), indent + 2, out);
            }
        }

        let mut out = String::new();
        walk(&self.children, 0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::NodeSchema;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(vec![
            NodeSchema::new("a", "boolean").with_child(NodeSchema::new("b", "string").with_default("ab")),
            NodeSchema::new("x", "boolean")
                .with_default(false)
                .with_child(NodeSchema::new("b", "string").with_default("xb")),
            NodeSchema::new("secret", "hidden").with_template("ADMIN_PASSWORD=secret"),
        ])
        .unwrap()
    }

    #[test]
    fn test_flatten_keeps_paths_distinct() {
        let schema = schema();
        let tree = Tree::build(&schema).unwrap();
        let snapshot = tree.flatten();
        assert_eq!(
            snapshot.keys().collect::<Vec<_>>(),
            vec!["a", "a.b", "x", "x.b", "secret"]
        );
        assert_eq!(snapshot["a.b"], NodeValue::Str("ab".into()));
        assert_eq!(snapshot["x.b"], NodeValue::Str("xb".into()));
        assert_eq!(snapshot["secret"], NodeValue::Null);
    }

    #[test]
    fn test_flatten_includes_inactive_nodes() {
        let schema = Schema::new(vec![
            NodeSchema::new("p", "boolean")
                .with_default(false)
                .with_child(NodeSchema::new("c", "string").when_parent_is(true)),
        ])
        .unwrap();
        let tree = Tree::build(&schema).unwrap();
        assert!(tree.flatten().contains_key("p.c"));
    }

    #[test]
    fn test_flatten_is_fresh() {
        let schema = schema();
        let mut tree = Tree::build(&schema).unwrap();
        let before = tree.flatten();
        tree.set_value("a.b", &json!("changed")).unwrap();
        let after = tree.flatten();
        assert_eq!(before["a.b"], NodeValue::Str("ab".into()));
        assert_eq!(after["a.b"], NodeValue::Str("changed".into()));
    }

    #[test]
    fn test_unknown_path_leaves_tree_untouched() {
        let schema = schema();
        let mut tree = Tree::build(&schema).unwrap();
        let before = tree.flatten();
        let err = tree.set_value("nonexistent.path", &json!("v")).unwrap_err();
        assert_eq!(err, UnknownPathError::new("nonexistent.path"));
        assert_eq!(tree.flatten(), before);
        assert!(tree.set_value("", &json!("v")).is_err());
    }

    #[test]
    fn test_set_values_fail_fast() {
        let schema = schema();
        let mut tree = Tree::build(&schema).unwrap();
        let err = tree
            .set_values([("a.b", "first"), ("missing", "x"), ("x.b", "never")])
            .unwrap_err();
        assert_eq!(err.path, "missing");
        assert_eq!(tree.value("a.b").unwrap().as_str(), Some("first"));
        assert_eq!(tree.value("x.b").unwrap().as_str(), Some("xb"));
    }

    #[test]
    fn test_keys_skip_hidden() {
        let schema = schema();
        let tree = Tree::build(&schema).unwrap();
        assert_eq!(tree.keys(), vec!["a", "a.b", "x", "x.b"]);
    }

    #[test]
    fn test_dump() {
        let schema = schema();
        let tree = Tree::build(&schema).unwrap();
        let dump = tree.dump();
        assert!(dump.starts_with("a : True\n  b : ab\n"));
        assert!(dump.contains("secret : \n"));
        assert!(!dump.contains("Bool("));
    }

    #[test]
    fn test_root_activation_rejected() {
        let schema = Schema {
            options: vec![NodeSchema::new("a", "boolean").when_parent_is(true)],
        };
        assert!(matches!(
            Tree::build(&schema),
            Err(SchemaError::RootActivation { .. })
        ));
    }

    #[test]
    fn test_duplicate_top_level() {
        let err = Schema::new(vec![
            NodeSchema::new("a", "boolean"),
            NodeSchema::new("a", "string"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { ref path } if path == "a"));
    }
}
