use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    data::{
        kind::{NodeKind, NodeValue},
        schema::NodeSchema,
    },
    error::{SchemaError, UnknownPathError},
};

/// Ordered mapping from child name to child node.
pub type Children<'s> = IndexMap<String, Node<'s>>;

/// Runtime instance of one declared option.
#[derive(Debug, Clone)]
pub struct Node<'s> {
    schema: &'s NodeSchema,
    kind: NodeKind<'s>,
    path: String,
    value: NodeValue,
    children: Children<'s>,
}

impl<'s> Node<'s> {
    /// Instantiate `schema` and its whole subtree below `parent_path`.
    pub(crate) fn build(schema: &'s NodeSchema, parent_path: &str) -> Result<Self, SchemaError> {
        if schema.name.is_empty() || schema.name.contains('.') {
            return Err(SchemaError::InvalidName {
                parent: parent_path.to_string(),
                name: schema.name.clone(),
            });
        }

        let path = if parent_path.is_empty() {
            schema.name.clone()
        } else {
            format!("{parent_path}.{}", schema.name)
        };

        let kind = NodeKind::from_schema(schema, &path)?;
        let value = kind.default_value(schema.default.as_ref(), &path)?;
        let children = build_children(&schema.children, &path)?;

        Ok(Self {
            schema,
            kind,
            path,
            value,
            children,
        })
    }

    pub fn name(&self) -> &'s str {
        &self.schema.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> NodeKind<'s> {
        self.kind
    }

    pub fn description(&self) -> Option<&'s str> {
        self.schema.description.as_deref()
    }

    pub fn templates(&self) -> &'s [String] {
        &self.schema.templates
    }

    pub fn schema(&self) -> &'s NodeSchema {
        self.schema
    }

    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    pub fn children(&self) -> &Children<'s> {
        &self.children
    }

    /// Whether this subtree renders under a parent currently holding `parent_value`.
    pub fn is_active_under(&self, parent_value: &NodeValue) -> bool {
        match &self.schema.when_parent_is {
            None => true,
            Some(expected) => parent_value.matches(expected),
        }
    }

    /// Coerce `raw` for this node's kind and store it.
    pub fn set_value(&mut self, raw: &Value) {
        let value = self.kind.coerce(raw);
        if let (NodeKind::Choice { choices }, NodeValue::Str(s)) = (&self.kind, &value) {
            if !choices.contains(s) {
                warn!("`{}` set to {s:?}, which is not one of {choices:?}", self.path);
            }
        }
        self.value = value;
    }

    /// Resolve a dotted path relative to this node.
    pub fn child(&self, path: &str) -> Option<&Node<'s>> {
        lookup(&self.children, path)
    }

    /// Mutable variant of [`Node::child`].
    pub fn child_mut(&mut self, path: &str) -> Option<&mut Node<'s>> {
        lookup_mut(&mut self.children, path)
    }

    /// Set the value of a descendant addressed by a relative dotted path.
    pub fn set_child_value(&mut self, path: &str, raw: &Value) -> Result<(), UnknownPathError> {
        let node = self
            .child_mut(path)
            .ok_or_else(|| UnknownPathError::new(path))?;
        node.set_value(raw);
        Ok(())
    }
}

pub(crate) fn build_children<'s>(
    schemas: &'s [NodeSchema],
    parent_path: &str,
) -> Result<Children<'s>, SchemaError> {
    let mut children = Children::with_capacity(schemas.len());
    for schema in schemas {
        let node = Node::build(schema, parent_path)?;
        if children.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateName {
                path: node.path.clone(),
            });
        }
        children.insert(schema.name.clone(), node);
    }
    Ok(children)
}

pub(crate) fn lookup<'a, 's>(children: &'a Children<'s>, path: &str) -> Option<&'a Node<'s>> {
    let mut segments = path.split('.');
    let mut node = children.get(segments.next()?)?;
    for segment in segments {
        node = node.children.get(segment)?;
    }
    Some(node)
}

pub(crate) fn lookup_mut<'a, 's>(
    children: &'a mut Children<'s>,
    path: &str,
) -> Option<&'a mut Node<'s>> {
    let mut segments = path.split('.');
    let mut node = children.get_mut(segments.next()?)?;
    for segment in segments {
        node = node.children.get_mut(segment)?;
    }
    Some(node)
}
