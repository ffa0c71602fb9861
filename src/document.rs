//! Declarative schema documents
//!
//! A document describes a tree in JSON or TOML instead of builder calls:
//!
//! ```json
//! {
//!   "properties": [
//!     { "name": "email", "type": "string", "rules": ["required", "email"] },
//!     {
//!       "name": "tags",
//!       "type": "array",
//!       "each": { "type": "string", "rules": [{ "name": "max", "args": [32] }] }
//!     },
//!     {
//!       "name": "newsletter", "type": "boolean",
//!       "rules": [{ "name": "required_with", "args": [{ "relative": "../email" }] }]
//!     }
//!   ]
//! }
//! ```
//!
//! String rules are appended verbatim. Rules in `{ name, args }` form go
//! through the same compilation as [`SchemaNode::rule_with`]; an argument
//! written as `{ "relative": "..." }` is a slash-separated path expression
//! resolved from the owning node.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::build::{RuleArg, RuleSet};
use crate::config::BuilderConfig;
use crate::error::{Result, SchemaError};
use crate::nodes::{CompoundNode, Node, NodeKind, ObjectBuilder, RootNode, SchemaNode};
use crate::path_exp::PathExp;

/// Top level of a document: the root object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unknown_properties: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleSpec>,

    #[serde(default)]
    pub properties: Vec<PropertySpec>,
}

/// Named property of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,

    #[serde(flatten)]
    pub node: NodeSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Kind tag: string, integer, numeric, float, boolean, scalar, array,
    /// object or file
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleSpec>,

    /// Object properties, in output order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unknown_properties: Option<bool>,

    /// Array element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub each: Option<Box<NodeSpec>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mime_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<DimensionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Token(String),
    Named {
        name: String,
        #[serde(default)]
        args: Vec<ArgSpec>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgSpec {
    Relative { relative: String },
    Value(serde_json::Value),
}

/// File dimension constraints; emitted in field order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    /// Number or fraction string such as `"3/2"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<serde_json::Value>,
}

impl SchemaDocument {
    /// Load a document, picking the format from the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let document = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            Some("toml") => Self::from_toml_str(&content)?,
            other => {
                return Err(SchemaError::invalid(format!(
                    "unsupported document extension {:?} for {}; expected .json or .toml",
                    other.unwrap_or(""),
                    path.display()
                )))
            }
        };
        debug!(
            path = %path.display(),
            properties = document.properties.len(),
            "loaded schema document"
        );
        Ok(document)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build a fresh tree from the document
    pub fn to_tree(&self, config: BuilderConfig) -> Result<RootNode> {
        let root = RootNode::with_config(config);
        if let Some(allow) = self.allow_unknown_properties {
            root.clone().allow_unknown_properties(allow);
        }
        apply_rules(&root, &self.rules)?;
        apply_properties(&root, &self.properties)?;
        Ok(root)
    }

    /// Build the tree and flatten it
    pub fn compile(&self, config: BuilderConfig) -> Result<RuleSet> {
        self.to_tree(config)?.build()
    }
}

fn apply_properties<N: ObjectBuilder>(object: &N, properties: &[PropertySpec]) -> Result<()> {
    for property in properties {
        let kind: NodeKind = property.node.kind.parse()?;
        let child = object.property(&property.name, kind)?;
        apply_node(untyped(&child)?, &property.node)?;
    }
    Ok(())
}

fn apply_node(node: Node<CompoundNode>, spec: &NodeSpec) -> Result<()> {
    apply_rules(&node, &spec.rules)?;

    match node {
        Node::Object(object) => {
            if let Some(allow) = spec.allow_unknown_properties {
                object.clone().allow_unknown_properties(allow);
            }
            apply_properties(&object, &spec.properties)?;
        }
        Node::Array(array) => {
            if let Some(each) = &spec.each {
                let kind: NodeKind = each.kind.parse()?;
                let element = array.each(kind)?;
                apply_node(untyped(&element)?, each)?;
            }
        }
        Node::File(file) => {
            if !spec.mime_types.is_empty() {
                spec.mime_types
                    .iter()
                    .fold(file.mime_type(), |mime, mime_type| mime.allow(mime_type))
                    .end();
            }
            if let Some(dimensions) = &spec.dimensions {
                let mut builder = file.dimensions();
                if let Some(px) = dimensions.width {
                    builder = builder.width(px);
                }
                if let Some(px) = dimensions.height {
                    builder = builder.height(px);
                }
                if let Some(px) = dimensions.min_width {
                    builder = builder.min_width(px);
                }
                if let Some(px) = dimensions.min_height {
                    builder = builder.min_height(px);
                }
                if let Some(px) = dimensions.max_width {
                    builder = builder.max_width(px);
                }
                if let Some(px) = dimensions.max_height {
                    builder = builder.max_height(px);
                }
                if let Some(ratio) = &dimensions.ratio {
                    builder.ratio(ratio_text(ratio)?);
                }
            }
        }
        Node::Scalar(_) => {}
    }
    Ok(())
}

fn apply_rules<N: SchemaNode>(node: &N, rules: &[RuleSpec]) -> Result<()> {
    for rule in rules {
        match rule {
            RuleSpec::Token(token) => {
                node.clone().rule(token.as_str())?;
            }
            RuleSpec::Named { name, args } => {
                let args = args.iter().map(arg_value).collect::<Result<Vec<_>>>()?;
                node.clone().rule_with(name, args)?;
            }
        }
    }
    Ok(())
}

fn arg_value(arg: &ArgSpec) -> Result<RuleArg> {
    match arg {
        ArgSpec::Relative { relative } => Ok(RuleArg::Path(relative.parse::<PathExp>()?)),
        ArgSpec::Value(value) => Ok(RuleArg::from(value.clone())),
    }
}

fn ratio_text(ratio: &serde_json::Value) -> Result<String> {
    match ratio {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(SchemaError::invalid(format!(
            "dimension ratio must be a number or a fraction string, got {}",
            other
        ))),
    }
}

/// Re-parent a typed child under an untyped compound handle
fn untyped<N: SchemaNode>(node: &N) -> Result<Node<CompoundNode>> {
    Node::from_ref(&node.to_ref())
}
