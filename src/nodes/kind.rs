//! Node kinds and their default rules

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::build::RuleEntry;
use crate::error::SchemaError;

/// Kind of a schema node
///
/// The scalar kinds differ only in the rule they start with. `Custom` lets
/// callers register their own scalar kind with its own default rules.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Unconstrained scalar; no default rule
    Scalar,
    String,
    Integer,
    Numeric,
    Float,
    Boolean,
    Array,
    Object,
    File,
    Custom(CustomKind),
}

impl NodeKind {
    /// Tag used in documents and error messages
    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Scalar => "scalar",
            NodeKind::String => "string",
            NodeKind::Integer => "integer",
            NodeKind::Numeric => "numeric",
            NodeKind::Float => "float",
            NodeKind::Boolean => "boolean",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
            NodeKind::File => "file",
            NodeKind::Custom(custom) => custom.name(),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, NodeKind::Array | NodeKind::Object)
    }

    /// Rules a freshly created node of this kind starts with
    ///
    /// Objects carry none here: their `array` or known-properties rule is
    /// decided when the tree is flattened.
    pub fn default_rule_names(&self) -> Vec<String> {
        match self {
            NodeKind::String => vec!["string".to_string()],
            NodeKind::Integer => vec!["integer".to_string()],
            NodeKind::Numeric => vec!["numeric".to_string()],
            NodeKind::Float => vec!["float".to_string()],
            NodeKind::Boolean => vec!["boolean".to_string()],
            NodeKind::Array => vec!["array".to_string()],
            NodeKind::Scalar | NodeKind::Object | NodeKind::File => Vec::new(),
            NodeKind::Custom(custom) => (custom.defaults)(),
        }
    }

    pub(crate) fn default_rules(&self) -> Vec<RuleEntry> {
        self.default_rule_names()
            .into_iter()
            .map(RuleEntry::Literal)
            .collect()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NodeKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scalar" => Ok(NodeKind::Scalar),
            "string" => Ok(NodeKind::String),
            "integer" | "int" => Ok(NodeKind::Integer),
            "numeric" => Ok(NodeKind::Numeric),
            "float" => Ok(NodeKind::Float),
            "boolean" | "bool" => Ok(NodeKind::Boolean),
            "array" => Ok(NodeKind::Array),
            "object" => Ok(NodeKind::Object),
            "file" => Ok(NodeKind::File),
            other => Err(SchemaError::invalid(format!(
                "unknown node kind \"{}\"",
                other
            ))),
        }
    }
}

impl From<CustomKind> for NodeKind {
    fn from(custom: CustomKind) -> Self {
        NodeKind::Custom(custom)
    }
}

/// User-registered scalar kind
///
/// Two custom kinds are the same kind when their names match.
#[derive(Clone)]
pub struct CustomKind {
    name: String,
    defaults: Rc<dyn Fn() -> Vec<String>>,
}

impl CustomKind {
    pub fn new(name: impl Into<String>, defaults: impl Fn() -> Vec<String> + 'static) -> Self {
        Self {
            name: name.into(),
            defaults: Rc::new(defaults),
        }
    }

    /// Custom kind with a fixed list of default rules
    pub fn with_rules<I, S>(name: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules: Vec<String> = rules.into_iter().map(Into::into).collect();
        Self::new(name, move || rules.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for CustomKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for CustomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomKind").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        assert_eq!(NodeKind::String.default_rule_names(), vec!["string"]);
        assert_eq!(NodeKind::Integer.default_rule_names(), vec!["integer"]);
        assert_eq!(NodeKind::Numeric.default_rule_names(), vec!["numeric"]);
        assert_eq!(NodeKind::Float.default_rule_names(), vec!["float"]);
        assert_eq!(NodeKind::Boolean.default_rule_names(), vec!["boolean"]);
        assert_eq!(NodeKind::Array.default_rule_names(), vec!["array"]);
        assert!(NodeKind::Scalar.default_rule_names().is_empty());
        assert!(NodeKind::File.default_rule_names().is_empty());
        assert!(NodeKind::Object.default_rule_names().is_empty());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("integer".parse::<NodeKind>().unwrap(), NodeKind::Integer);
        assert_eq!("Boolean".parse::<NodeKind>().unwrap(), NodeKind::Boolean);
        let err = "widget".parse::<NodeKind>().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
    }

    #[test]
    fn test_custom_kind() {
        let email = CustomKind::with_rules("email", ["string", "email"]);
        let kind = NodeKind::from(email.clone());
        assert_eq!(kind.tag(), "email");
        assert_eq!(kind.default_rule_names(), vec!["string", "email"]);
        assert_eq!(kind, NodeKind::Custom(CustomKind::with_rules("email", ["x"])));
        assert_ne!(kind, NodeKind::String);
    }
}
