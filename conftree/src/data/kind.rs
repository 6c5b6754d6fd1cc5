use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{data::schema::NodeSchema, error::SchemaError};

const PLUGIN_REPO_BASE: &str = "https://git.openstack.org/openstack";

/// Current value of an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NodeValue {
    Bool(bool),
    Str(String),
    Null,
}

impl NodeValue {
    /// Boolean view; strings and null are never "on".
    pub fn as_bool(&self) -> bool {
        matches!(self, NodeValue::Bool(true))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NodeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Compare against a `when_parent_is` declaration.
    ///
    /// Booleans also match the numbers 1 and 0, the way checkbox values and
    /// hand-written YAML mix them.
    pub fn matches(&self, expected: &Value) -> bool {
        match (self, expected) {
            (NodeValue::Bool(b), Value::Bool(e)) => b == e,
            (NodeValue::Bool(b), Value::Number(n)) => {
                n.as_f64() == Some(if *b { 1.0 } else { 0.0 })
            }
            (NodeValue::Str(s), Value::String(e)) => s == e,
            (NodeValue::Null, Value::Null) => true,
            _ => false,
        }
    }
}

/// Text substituted into templates.
impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Bool(true) => f.write_str("True"),
            NodeValue::Bool(false) => f.write_str("False"),
            NodeValue::Str(s) => f.write_str(s),
            NodeValue::Null => Ok(()),
        }
    }
}

/// Closed set of option kinds with their kind-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'s> {
    /// Checkbox.
    Boolean,
    /// Free text field.
    String,
    /// Select from a fixed list.
    Choice { choices: &'s [String] },
    /// Not shown in the form; carries fixed template lines.
    Hidden,
    /// Checkbox enabling a DevStack plugin and its services.
    Plugin {
        repo: Option<&'s str>,
        services: &'s [String],
    },
}

impl<'s> NodeKind<'s> {
    /// Resolve the declared kind string of `schema`.
    pub fn from_schema(schema: &'s NodeSchema, path: &str) -> Result<Self, SchemaError> {
        match schema.kind.as_str() {
            "boolean" => Ok(NodeKind::Boolean),
            "string" => Ok(NodeKind::String),
            "choice" => match schema.choices.as_deref() {
                Some(choices) if !choices.is_empty() => Ok(NodeKind::Choice { choices }),
                _ => Err(SchemaError::MissingChoices {
                    path: path.to_string(),
                }),
            },
            "hidden" => Ok(NodeKind::Hidden),
            "plugin" => Ok(NodeKind::Plugin {
                repo: schema.repo.as_deref(),
                services: &schema.services,
            }),
            other => Err(SchemaError::UnknownKind {
                path: path.to_string(),
                kind: other.to_string(),
            }),
        }
    }

    /// Kind name as written in schema files.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Boolean => "boolean",
            NodeKind::String => "string",
            NodeKind::Choice { .. } => "choice",
            NodeKind::Hidden => "hidden",
            NodeKind::Plugin { .. } => "plugin",
        }
    }

    /// Whether the option is a checkbox in the form.
    pub fn is_checkbox(&self) -> bool {
        matches!(self, NodeKind::Boolean | NodeKind::Plugin { .. })
    }

    /// Initial value from the schema default, checked against the kind.
    pub fn default_value(&self, default: Option<&Value>, path: &str) -> Result<NodeValue, SchemaError> {
        let invalid = |expected: &str, actual: &Value| SchemaError::InvalidDefault {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        };

        match self {
            NodeKind::Boolean | NodeKind::Plugin { .. } => match default {
                None => Ok(NodeValue::Bool(true)),
                Some(Value::Bool(b)) => Ok(NodeValue::Bool(*b)),
                Some(other) => Err(invalid("boolean", other)),
            },
            NodeKind::String => match default {
                None => Ok(NodeValue::Str(String::new())),
                Some(Value::String(s)) => Ok(NodeValue::Str(s.clone())),
                Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(NodeValue::Str(v.to_string())),
                Some(other) => Err(invalid("string", other)),
            },
            NodeKind::Choice { choices } => match default {
                None => Ok(NodeValue::Str(String::new())),
                Some(Value::String(s)) if choices.contains(s) => Ok(NodeValue::Str(s.clone())),
                Some(other) => Err(invalid(&format!("one of: {choices:?}"), other)),
            },
            NodeKind::Hidden => Ok(NodeValue::Null),
        }
    }

    /// Coerce a submitted raw value for this kind.
    ///
    /// Checkboxes are on only for `"on"`, `true` or `1`; that is what an HTML
    /// checkbox and its hidden `0` fallback send.
    pub fn coerce(&self, raw: &Value) -> NodeValue {
        match self {
            NodeKind::Boolean | NodeKind::Plugin { .. } => {
                let on = match raw {
                    Value::String(s) => s == "on",
                    Value::Bool(b) => *b,
                    Value::Number(n) => n.as_f64() == Some(1.0),
                    _ => false,
                };
                NodeValue::Bool(on)
            }
            NodeKind::String | NodeKind::Choice { .. } | NodeKind::Hidden => match raw {
                Value::Null => NodeValue::Null,
                Value::String(s) => NodeValue::Str(s.clone()),
                other => NodeValue::Str(other.to_string()),
            },
        }
    }

    /// Lines a plugin contributes while it is enabled.
    pub(crate) fn plugin_lines(&self, name: &str, value: &NodeValue) -> Vec<String> {
        let NodeKind::Plugin { repo, services } = self else {
            return Vec::new();
        };
        if !value.as_bool() {
            return Vec::new();
        }

        let repo = match repo {
            Some(repo) => repo.to_string(),
            None => format!("{PLUGIN_REPO_BASE}/{name}.git"),
        };
        let mut lines = vec![format!("enable_plugin {name} {repo}")];
        if !services.is_empty() {
            lines.push(format!("enable_service {}", services.join(",")));
        }
        lines
    }
}
