//! Rule values
//!
//! Most rules are plain tokens (`required`, `max:10`). Rules that carry
//! structure implement [`RuleObject`] and pass through flattening as
//! objects; the consuming engine decides how to apply them.

mod dimensions;
mod known_properties;
mod mime;

use std::fmt;
use std::rc::Rc;

pub use dimensions::{DimensionSet, Dimensions};
pub use known_properties::KnownPropertiesOnly;
pub use mime::{MimeTypeSet, MimeTypes};

use crate::nodes::NodeRef;

/// Structured rule passed through to the output as an object
pub trait RuleObject: fmt::Debug + fmt::Display {
    /// Serialized form; defaults to the display string
    fn to_value(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}

/// Anything accepted by [`SchemaNode::rule`](crate::SchemaNode::rule)
#[derive(Clone)]
pub enum RuleInput {
    /// Raw rule token, stored verbatim
    Token(String),
    Object(Rc<dyn RuleObject>),
    /// Converted with `to_string()` when the tree is flattened
    Stringable(Rc<dyn fmt::Display>),
    /// Rendered as the node's dot-path
    Node(NodeRef),
    /// Lists and maps; rejected
    Aggregate(serde_json::Value),
}

impl RuleInput {
    pub fn object(rule: impl RuleObject + 'static) -> Self {
        RuleInput::Object(Rc::new(rule))
    }

    pub fn stringable(value: impl fmt::Display + 'static) -> Self {
        RuleInput::Stringable(Rc::new(value))
    }
}

impl fmt::Debug for RuleInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleInput::Token(token) => f.debug_tuple("Token").field(token).finish(),
            RuleInput::Object(rule) => f.debug_tuple("Object").field(rule).finish(),
            RuleInput::Stringable(value) => {
                f.debug_tuple("Stringable").field(&value.to_string()).finish()
            }
            RuleInput::Node(node) => f.debug_tuple("Node").field(node).finish(),
            RuleInput::Aggregate(value) => f.debug_tuple("Aggregate").field(value).finish(),
        }
    }
}

impl From<&str> for RuleInput {
    fn from(token: &str) -> Self {
        RuleInput::Token(token.to_string())
    }
}

impl From<String> for RuleInput {
    fn from(token: String) -> Self {
        RuleInput::Token(token)
    }
}

impl From<Rc<dyn RuleObject>> for RuleInput {
    fn from(rule: Rc<dyn RuleObject>) -> Self {
        RuleInput::Object(rule)
    }
}

impl From<serde_json::Value> for RuleInput {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::String(token) => RuleInput::Token(token),
            Value::Array(_) | Value::Object(_) => RuleInput::Aggregate(value),
            scalar => RuleInput::Token(scalar.to_string()),
        }
    }
}
