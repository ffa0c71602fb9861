//! Rule arguments and their normalization to rule-token text

use std::fmt;
use std::rc::Rc;

use crate::error::{Result, SchemaError};
use crate::nodes::NodeRef;
use crate::path_exp::PathExp;

/// One argument of a rule declaration
///
/// `Path` and `Node` arguments are symbolic: they turn the whole rule into a
/// [`LazyRule`](super::LazyRule) that resolves them to dot-paths when the
/// tree is flattened.
#[derive(Clone)]
pub enum RuleArg {
    Text(String),
    Integer(i128),
    Float(f64),
    Boolean(bool),
    Null,
    /// Value with its own textual form, converted at final assembly
    Stringable(Rc<dyn fmt::Display>),
    /// Relative reference, resolved against the rule's owning node
    Path(PathExp),
    /// Absolute reference to a declared node
    Node(NodeRef),
    /// Lists and maps; always rejected by [`normalize`]
    Aggregate(serde_json::Value),
}

impl RuleArg {
    pub fn stringable(value: impl fmt::Display + 'static) -> Self {
        RuleArg::Stringable(Rc::new(value))
    }

    /// Whether the argument needs the tree to be resolved
    pub fn is_reference(&self) -> bool {
        matches!(self, RuleArg::Path(_) | RuleArg::Node(_))
    }
}

impl fmt::Debug for RuleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleArg::Text(s) => f.debug_tuple("Text").field(s).finish(),
            RuleArg::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            RuleArg::Float(x) => f.debug_tuple("Float").field(x).finish(),
            RuleArg::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            RuleArg::Null => f.write_str("Null"),
            RuleArg::Stringable(d) => f.debug_tuple("Stringable").field(&d.to_string()).finish(),
            RuleArg::Path(p) => f.debug_tuple("Path").field(p).finish(),
            RuleArg::Node(n) => f.debug_tuple("Node").field(n).finish(),
            RuleArg::Aggregate(v) => f.debug_tuple("Aggregate").field(v).finish(),
        }
    }
}

/// Normalized argument text
pub enum ArgText {
    Text(String),
    /// Stringable value left unconverted until the token is assembled
    Deferred(Rc<dyn fmt::Display>),
}

impl ArgText {
    pub fn into_string(self) -> String {
        match self {
            ArgText::Text(s) => s,
            ArgText::Deferred(d) => d.to_string(),
        }
    }
}

/// Convert a single argument to its rule-token form
pub fn normalize(arg: &RuleArg) -> Result<ArgText> {
    match arg {
        RuleArg::Text(s) => Ok(ArgText::Text(s.clone())),
        RuleArg::Integer(i) => Ok(ArgText::Text(i.to_string())),
        RuleArg::Float(x) => Ok(ArgText::Text(x.to_string())),
        RuleArg::Boolean(b) => Ok(ArgText::Text(if *b { "true" } else { "false" }.to_string())),
        RuleArg::Null => Ok(ArgText::Text("NULL".to_string())),
        RuleArg::Stringable(d) => Ok(ArgText::Deferred(Rc::clone(d))),
        RuleArg::Aggregate(_) => Err(SchemaError::invalid(
            "cannot use lists or maps as argument to string-based rules",
        )),
        RuleArg::Path(_) | RuleArg::Node(_) => Err(SchemaError::invalid(
            "node references must be resolved against the tree before normalization",
        )),
    }
}

/// First argument of the relational rules (`required_if`, `same`, ...)
#[derive(Debug, Clone)]
pub enum PathArg {
    /// Dot-path written out by hand
    Absolute(String),
    Relative(PathExp),
    Node(NodeRef),
}

impl From<PathArg> for RuleArg {
    fn from(path: PathArg) -> Self {
        match path {
            PathArg::Absolute(s) => RuleArg::Text(s),
            PathArg::Relative(exp) => RuleArg::Path(exp),
            PathArg::Node(node) => RuleArg::Node(node),
        }
    }
}

impl From<&str> for PathArg {
    fn from(s: &str) -> Self {
        PathArg::Absolute(s.to_string())
    }
}

impl From<String> for PathArg {
    fn from(s: String) -> Self {
        PathArg::Absolute(s)
    }
}

impl From<PathExp> for PathArg {
    fn from(exp: PathExp) -> Self {
        PathArg::Relative(exp)
    }
}

impl From<&PathExp> for PathArg {
    fn from(exp: &PathExp) -> Self {
        PathArg::Relative(exp.clone())
    }
}

impl From<&str> for RuleArg {
    fn from(s: &str) -> Self {
        RuleArg::Text(s.to_string())
    }
}

impl From<String> for RuleArg {
    fn from(s: String) -> Self {
        RuleArg::Text(s)
    }
}

impl From<&String> for RuleArg {
    fn from(s: &String) -> Self {
        RuleArg::Text(s.clone())
    }
}

macro_rules! integer_args {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RuleArg {
                fn from(value: $ty) -> Self {
                    RuleArg::Integer(value as i128)
                }
            }
        )*
    };
}

integer_args!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for RuleArg {
    fn from(value: f32) -> Self {
        RuleArg::Float(f64::from(value))
    }
}

impl From<f64> for RuleArg {
    fn from(value: f64) -> Self {
        RuleArg::Float(value)
    }
}

impl From<bool> for RuleArg {
    fn from(value: bool) -> Self {
        RuleArg::Boolean(value)
    }
}

impl<T: Into<RuleArg>> From<Option<T>> for RuleArg {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RuleArg::Null)
    }
}

impl From<PathExp> for RuleArg {
    fn from(exp: PathExp) -> Self {
        RuleArg::Path(exp)
    }
}

impl From<&PathExp> for RuleArg {
    fn from(exp: &PathExp) -> Self {
        RuleArg::Path(exp.clone())
    }
}

impl From<serde_json::Value> for RuleArg {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => RuleArg::Null,
            Value::Bool(b) => RuleArg::Boolean(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RuleArg::Integer(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    RuleArg::Integer(i128::from(u))
                } else {
                    RuleArg::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => RuleArg::Text(s),
            aggregate => RuleArg::Aggregate(aggregate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(arg: impl Into<RuleArg>) -> String {
        normalize(&arg.into()).unwrap().into_string()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(text("foo"), "foo");
        assert_eq!(text(42), "42");
        assert_eq!(text(-7i64), "-7");
        assert_eq!(text(0.5), "0.5");
        assert_eq!(text(true), "true");
        assert_eq!(text(false), "false");
        assert_eq!(text(None::<i32>), "NULL");
        assert_eq!(text(Some("x")), "x");
    }

    #[test]
    fn test_stringable_is_left_unconverted() {
        let normalized = normalize(&RuleArg::stringable("later")).unwrap();
        assert!(matches!(normalized, ArgText::Deferred(_)));
        assert_eq!(normalized.into_string(), "later");
    }

    #[test]
    fn test_aggregates_are_rejected() {
        let err = normalize(&json!([1, 2]).into()).err().unwrap();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
        let err = normalize(&json!({"a": 1}).into()).err().unwrap();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(text(json!("a")), "a");
        assert_eq!(text(json!(3)), "3");
        assert_eq!(text(json!(null)), "NULL");
        assert_eq!(text(json!(true)), "true");
    }

    #[test]
    fn test_references_need_a_tree() {
        let err = normalize(&PathExp::new().parent().into()).err().unwrap();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
    }
}
