//! Rule compilation and tree flattening
//!
//! Rules are compiled when they are declared: plain arguments become rule
//! text right away, and rules that reference other nodes are stored as
//! [`LazyRule`]s. [`flatten`] walks the tree depth-first in declaration
//! order and produces a [`RuleSet`] keyed by absolute dot-path.

mod argument;
mod lazy;

use std::fmt;
use std::rc::Rc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, trace};

pub use argument::{normalize, ArgText, PathArg, RuleArg};
pub use lazy::LazyRule;

use crate::config::OutputFormat;
use crate::error::{display_path, Result, SchemaError};
use crate::names::{to_snake_case, WILDCARD};
use crate::nodes::{NodeBody, NodeHandle, NodeId, ObjectView, Tree};
use crate::path::join;
use crate::rules::{DimensionSet, KnownPropertiesOnly, MimeTypeSet, RuleInput, RuleObject};

use lazy::{compile, CompiledRule};

/// Rule as stored on a node
#[derive(Clone)]
pub(crate) enum RuleEntry {
    Literal(String),
    Deferred(LazyRule),
    Object(Rc<dyn RuleObject>),
    Stringable(Rc<dyn fmt::Display>),
    Node(crate::nodes::NodeRef),
    Dimensions(DimensionSet),
    MimeTypes(MimeTypeSet),
}

pub(crate) fn add_bare(handle: &NodeHandle, name: &str) -> Result<()> {
    let name = to_snake_case(name);
    if name.is_empty() {
        return Err(SchemaError::invalid("rule names cannot be empty"));
    }
    push(handle, RuleEntry::Literal(name));
    Ok(())
}

/// Built-in rule names skip validation
pub(crate) fn add_known(handle: &NodeHandle, name: &'static str) {
    push(handle, RuleEntry::Literal(name.to_string()));
}

pub(crate) fn add_rule(handle: &NodeHandle, name: &str, args: Vec<RuleArg>) -> Result<()> {
    if name.is_empty() {
        return Err(SchemaError::invalid("rule names cannot be empty"));
    }
    let policy = handle.tree().config().arguments.delimiters;
    let entry = match compile(policy, name, args)? {
        CompiledRule::Ready(text) => RuleEntry::Literal(text),
        CompiledRule::Deferred(rule) => RuleEntry::Deferred(rule),
    };
    push(handle, entry);
    Ok(())
}

pub(crate) fn add_input(handle: &NodeHandle, input: RuleInput) -> Result<()> {
    let entry = match input {
        RuleInput::Token(token) => RuleEntry::Literal(token),
        RuleInput::Object(rule) => RuleEntry::Object(rule),
        RuleInput::Stringable(value) => RuleEntry::Stringable(value),
        RuleInput::Node(node) => RuleEntry::Node(node),
        RuleInput::Aggregate(_) => {
            return Err(SchemaError::invalid(
                "cannot use lists or maps as rules; declare each rule separately",
            ))
        }
    };
    push(handle, entry);
    Ok(())
}

fn push(handle: &NodeHandle, entry: RuleEntry) {
    handle.tree_mut().node_mut(handle.id()).rules.push(entry);
}

/// One rule of the flattened output
#[derive(Clone, Debug)]
pub enum BuiltRule {
    Token(String),
    Object(Rc<dyn RuleObject>),
}

impl BuiltRule {
    pub fn token(token: impl Into<String>) -> Self {
        BuiltRule::Token(token.into())
    }

    pub fn object(rule: impl RuleObject + 'static) -> Self {
        BuiltRule::Object(Rc::new(rule))
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            BuiltRule::Token(token) => Some(token),
            BuiltRule::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn RuleObject> {
        match self {
            BuiltRule::Token(_) => None,
            BuiltRule::Object(rule) => Some(rule.as_ref()),
        }
    }
}

impl PartialEq for BuiltRule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BuiltRule::Token(a), BuiltRule::Token(b)) => a == b,
            (BuiltRule::Object(a), BuiltRule::Object(b)) => a.to_value() == b.to_value(),
            _ => false,
        }
    }
}

impl fmt::Display for BuiltRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltRule::Token(token) => f.write_str(token),
            BuiltRule::Object(rule) => write!(f, "{}", rule),
        }
    }
}

impl Serialize for BuiltRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BuiltRule::Token(token) => serializer.serialize_str(token),
            BuiltRule::Object(rule) => rule.to_value().serialize(serializer),
        }
    }
}

/// Flattened rules, keyed by dot-path in depth-first declaration order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleSet {
    entries: Vec<(String, Vec<BuiltRule>)>,
}

impl RuleSet {
    pub fn get(&self, path: &str) -> Option<&[BuiltRule]> {
        self.entries
            .iter()
            .find(|(key, _)| key == path)
            .map(|(_, rules)| rules.as_slice())
    }

    /// Rules at `path` in display form; rule objects use their `Display`
    pub fn tokens(&self, path: &str) -> Option<Vec<String>> {
        self.get(path)
            .map(|rules| rules.iter().map(ToString::to_string).collect())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BuiltRule])> {
        self.entries
            .iter()
            .map(|(key, rules)| (key.as_str(), rules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every rule in display form, `|`-joined per path
    pub fn to_pipe_strings(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(key, rules)| {
                let joined = rules
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("|");
                (key.clone(), joined)
            })
            .collect()
    }

    /// Serialize to JSON, keeping path order
    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let json = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(json)
    }

    fn insert(&mut self, path: String, rules: Vec<BuiltRule>) {
        match self.entries.iter_mut().find(|(key, _)| *key == path) {
            Some((_, existing)) => *existing = rules,
            None => self.entries.push((path, rules)),
        }
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, rules) in &self.entries {
            map.serialize_entry(key, rules)?;
        }
        map.end()
    }
}

impl IntoIterator for RuleSet {
    type Item = (String, Vec<BuiltRule>);
    type IntoIter = std::vec::IntoIter<(String, Vec<BuiltRule>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Flatten the subtree rooted at `handle`
///
/// Keys are absolute paths even when flattening starts below the root.
pub fn flatten(handle: &NodeHandle) -> Result<RuleSet> {
    let tree = handle.tree();
    let key = tree.path(handle.id());
    let mut out = RuleSet::default();
    flatten_node(&tree, handle.id(), key.clone(), &mut out)?;
    debug!(
        path = display_path(&key),
        entries = out.len(),
        "flattened rule tree"
    );
    Ok(out)
}

fn flatten_node(tree: &Tree, id: NodeId, key: String, out: &mut RuleSet) -> Result<()> {
    let node = tree.node(id);
    let mut rules = Vec::with_capacity(node.rules.len() + 1);

    if let NodeBody::Object(body) = &node.body {
        if body.allow_unknown_properties || body.properties.is_empty() {
            rules.push(BuiltRule::token("array"));
        } else if let Some(properties_rule) = &body.properties_rule {
            for input in properties_rule(&ObjectView::new(tree, id)) {
                rules.push(render_input(input)?);
            }
        } else {
            let names = body.properties.iter().map(|(name, _)| name.as_str());
            rules.push(BuiltRule::object(KnownPropertiesOnly::new(names)));
        }
    }

    for entry in &node.rules {
        if let Some(rule) = render_entry(tree, id, entry)? {
            rules.push(rule);
        }
    }

    out.insert(key.clone(), rules);

    match &node.body {
        NodeBody::Object(body) => {
            for (name, child) in &body.properties {
                flatten_node(tree, *child, join(&key, name), out)?;
            }
        }
        NodeBody::Array(body) => {
            if let Some(each) = body.each {
                flatten_node(tree, each, join(&key, WILDCARD), out)?;
            }
        }
        NodeBody::Leaf | NodeBody::File(_) => {}
    }
    Ok(())
}

fn render_entry(tree: &Tree, owner: NodeId, entry: &RuleEntry) -> Result<Option<BuiltRule>> {
    let rule = match entry {
        RuleEntry::Literal(token) => BuiltRule::Token(token.clone()),
        RuleEntry::Deferred(rule) => BuiltRule::Token(rule.resolve_in(tree, owner)?),
        RuleEntry::Object(rule) => BuiltRule::Object(Rc::clone(rule)),
        RuleEntry::Stringable(value) => BuiltRule::Token(value.to_string()),
        RuleEntry::Node(node) => {
            let path = node.path()?;
            trace!(owner = %tree.path(owner), target = %path, "rendered node rule");
            BuiltRule::Token(path)
        }
        RuleEntry::Dimensions(set) if set.is_empty() => return Ok(None),
        RuleEntry::Dimensions(set) => BuiltRule::Token(set.to_string()),
        RuleEntry::MimeTypes(set) if set.is_empty() => return Ok(None),
        RuleEntry::MimeTypes(set) => BuiltRule::Token(set.to_string()),
    };
    Ok(Some(rule))
}

fn render_input(input: RuleInput) -> Result<BuiltRule> {
    match input {
        RuleInput::Token(token) => Ok(BuiltRule::Token(token)),
        RuleInput::Object(rule) => Ok(BuiltRule::Object(rule)),
        RuleInput::Stringable(value) => Ok(BuiltRule::Token(value.to_string())),
        RuleInput::Node(node) => Ok(BuiltRule::Token(node.path()?)),
        RuleInput::Aggregate(_) => Err(SchemaError::invalid(
            "properties rules must produce single rules, not lists or maps",
        )),
    }
}
