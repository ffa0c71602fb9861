//! Rule Tree
//!
//! A fluent builder that compiles a tree of typed schema nodes into a flat
//! validation rule mapping, keyed by dot-path, for an external validation
//! engine to execute.
//!
//! ## Features
//!
//! - **Typed nodes**: strings, numbers, booleans, objects, arrays and file
//!   uploads, each starting with its type rule
//! - **Symbolic references**: rules can point at other nodes by handle or by
//!   relative path expression; references become dot-paths at build time
//! - **Unknown-property guard**: objects reject undeclared keys unless told
//!   otherwise
//! - **Declarative documents**: the same tree can be described in JSON or
//!   TOML
//!
//! ## Example
//!
//! ```
//! use ruletree::prelude::*;
//!
//! let root = ruletree::create();
//! let item = root.array("bar").unwrap().each_object().unwrap();
//! item.boolean("cool_kid").unwrap();
//! item.array("hobbies")
//!     .unwrap()
//!     .required_if(PathExp::new().parent().get("cool_kid").unwrap(), true)
//!     .unwrap();
//!
//! let rules = root.build().unwrap();
//! assert_eq!(
//!     rules.tokens("bar.*.hobbies").unwrap(),
//!     ["array", "required_if:bar.*.cool_kid,true"]
//! );
//! ```
//!
//! ## Output
//!
//! ```text
//! ""                -> [known_properties_only(bar)]
//! "bar"             -> ["array"]
//! "bar.*"           -> [known_properties_only(cool_kid, hobbies)]
//! "bar.*.cool_kid"  -> ["boolean"]
//! "bar.*.hobbies"   -> ["array", "required_if:bar.*.cool_kid,true"]
//! ```

pub mod build;
pub mod config;
pub mod document;
pub mod error;
pub mod names;
pub mod nodes;
pub mod path_exp;
pub mod rules;

mod path;

pub use build::{BuiltRule, LazyRule, PathArg, RuleArg, RuleSet};
pub use config::{BuilderConfig, DelimiterPolicy, OutputFormat};
pub use document::SchemaDocument;
pub use error::{Result, SchemaError};
pub use nodes::{
    ArrayNode, CompoundNode, CustomKind, FileNode, Node, NodeHandle, NodeId, NodeKind, NodeRef,
    ObjectBuilder, ObjectNode, ObjectView, RootNode, ScalarNode, SchemaNode,
};
pub use path_exp::{Movement, PathExp};
pub use rules::{KnownPropertiesOnly, RuleInput, RuleObject};

/// Start a new tree with default configuration
pub fn create() -> RootNode {
    RootNode::new()
}

/// Everything needed to declare and build a tree
pub mod prelude {
    pub use crate::build::{BuiltRule, LazyRule, PathArg, RuleArg, RuleSet};
    pub use crate::config::BuilderConfig;
    pub use crate::error::{Result, SchemaError};
    pub use crate::nodes::{
        ArrayNode, CompoundNode, CustomKind, FileNode, Node, NodeKind, NodeRef, ObjectBuilder,
        ObjectNode, RootNode, ScalarNode, SchemaNode,
    };
    pub use crate::path_exp::PathExp;
    pub use crate::rules::{KnownPropertiesOnly, RuleInput, RuleObject};
}
