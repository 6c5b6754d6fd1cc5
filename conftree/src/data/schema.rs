use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{data::tree::Tree, error::SchemaError};

/// One declared option, exactly as written in the schema file.
///
/// The `type` string is kept raw here and checked when a [`Tree`] is built,
/// so an unknown kind is reported as [`SchemaError::UnknownKind`] with the
/// offending option's path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSchema {
    /// Option name, one segment of the dotted path.
    pub name: String,
    /// Declared kind: `boolean`, `string`, `choice`, `hidden` or `plugin`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human readable label, also used as the comment above rendered lines.
    #[serde(default, rename = "desc", alias = "description")]
    pub description: Option<String>,
    /// Default value; its expected type depends on the kind.
    #[serde(default)]
    pub default: Option<Value>,
    /// Allowed values of a `choice` option.
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    /// Services enabled along with a `plugin` option.
    #[serde(default)]
    pub services: Vec<String>,
    /// Git repository of a `plugin` option.
    #[serde(default)]
    pub repo: Option<String>,
    /// Template fragments rendered against the value snapshot.
    #[serde(default)]
    pub templates: Vec<String>,
    /// Value the parent must hold for this subtree to be rendered.
    #[serde(default)]
    pub when_parent_is: Option<Value>,
    /// Nested options, in declaration order.
    #[serde(default)]
    pub children: Vec<NodeSchema>,
}

impl NodeSchema {
    /// Shorthand used by tests and embedders building schemas in code.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: None,
            default: None,
            choices: None,
            services: Vec::new(),
            repo: None,
            templates: Vec::new(),
            when_parent_is: None,
            children: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.templates.push(template.into());
        self
    }

    pub fn when_parent_is(mut self, value: impl Into<Value>) -> Self {
        self.when_parent_is = Some(value.into());
        self
    }

    pub fn with_child(mut self, child: NodeSchema) -> Self {
        self.children.push(child);
        self
    }
}

/// Source formats accepted for schema files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Toml,
    Yaml,
}

impl SchemaFormat {
    /// Pick the format from a file extension.
    pub fn from_extension(ext: &str) -> Result<Self, SchemaError> {
        match ext {
            "json" => Ok(Self::Json),
            "toml" | "tml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(SchemaError::UnsupportedFormat(other.to_string())),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }
}

/// Top-level layout of a schema document.
///
/// TOML cannot express a bare array at the document root, so the table form
/// is accepted in every format.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    List(Vec<NodeSchema>),
    Table { options: Vec<NodeSchema> },
}

/// The immutable option schema, loaded once per process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Top-level options in declaration order.
    pub options: Vec<NodeSchema>,
}

impl Schema {
    /// Wrap already parsed options, checking them the same way a file would be.
    pub fn new(options: Vec<NodeSchema>) -> Result<Self, SchemaError> {
        let schema = Self { options };
        schema.validate()?;
        Ok(schema)
    }

    /// Load and validate a schema file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let format = SchemaFormat::from_extension(ext)?;

        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema = Self::parse(&content, format)?;
        info!(
            "Loaded {} top-level options from {}",
            schema.options.len(),
            path.display()
        );
        Ok(schema)
    }

    /// Parse and validate schema content held in memory.
    pub fn parse(content: &str, format: SchemaFormat) -> Result<Self, SchemaError> {
        let parse_err = |reason: String| SchemaError::Parse {
            format: format.name(),
            reason,
        };

        let doc: SchemaDocument = match format {
            SchemaFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?
            }
            SchemaFormat::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            SchemaFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?
            }
        };

        let options = match doc {
            SchemaDocument::List(options) => options,
            SchemaDocument::Table { options } => options,
        };
        Self::new(options)
    }

    /// Build a throwaway tree so every structural error surfaces up front.
    pub fn validate(&self) -> Result<(), SchemaError> {
        Tree::build(self).map(|_| ())
    }

    /// Number of declared options, nested ones included.
    pub fn len(&self) -> usize {
        fn count(nodes: &[NodeSchema]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.options)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
