//! Object nodes and the root

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::config::BuilderConfig;
use crate::error::{Result, SchemaError};
use crate::rules::RuleInput;

use super::array::element_of;
use super::tree::{NodeBody, NodeId, Tree};
use super::{
    ArrayNode, CompoundNode, CustomKind, FileNode, Node, NodeHandle, NodeKind, ObjectView,
    ScalarNode, SchemaNode,
};

pub(crate) fn property_of(tree: &Tree, object: NodeId, name: &str) -> Result<NodeId> {
    tree.object_body(object)?
        .property(name)
        .ok_or_else(|| SchemaError::NotFound {
            path: tree.path(object),
            property: name.to_string(),
        })
}

/// Property declaration and lookup, shared by the root and object nodes
///
/// Declaring a property that already exists with the same kind returns the
/// existing node, so a schema can be extended from several places. A
/// different kind is a `Conflict`.
pub trait ObjectBuilder: SchemaNode {
    /// Declare or fetch a property of the given kind
    fn property(&self, name: &str, kind: impl Into<NodeKind>) -> Result<Node<Self>> {
        let handle = self.handle();
        let id = handle
            .tree_mut()
            .declare_property(handle.id(), name, kind.into())?;
        Ok(Node::from_parts(handle.child(id), self.clone()))
    }

    fn string(&self, name: &str) -> Result<ScalarNode<Self>> {
        self.property(name, NodeKind::String)?.into_scalar()
    }

    fn integer(&self, name: &str) -> Result<ScalarNode<Self>> {
        self.property(name, NodeKind::Integer)?.into_scalar()
    }

    fn numeric(&self, name: &str) -> Result<ScalarNode<Self>> {
        self.property(name, NodeKind::Numeric)?.into_scalar()
    }

    fn float(&self, name: &str) -> Result<ScalarNode<Self>> {
        self.property(name, NodeKind::Float)?.into_scalar()
    }

    fn boolean(&self, name: &str) -> Result<ScalarNode<Self>> {
        self.property(name, NodeKind::Boolean)?.into_scalar()
    }

    /// Scalar without a type rule
    fn scalar(&self, name: &str) -> Result<ScalarNode<Self>> {
        self.property(name, NodeKind::Scalar)?.into_scalar()
    }

    fn custom(&self, name: &str, kind: CustomKind) -> Result<ScalarNode<Self>> {
        self.property(name, kind)?.into_scalar()
    }

    fn array(&self, name: &str) -> Result<ArrayNode<Self>> {
        self.property(name, NodeKind::Array)?.into_array()
    }

    fn object(&self, name: &str) -> Result<ObjectNode<Self>> {
        self.property(name, NodeKind::Object)?.into_object()
    }

    fn file(&self, name: &str) -> Result<FileNode<Self>> {
        self.property(name, NodeKind::File)?.into_file()
    }

    fn string_with<T>(self, name: &str, f: impl FnOnce(ScalarNode<Self>) -> Result<T>) -> Result<Self> {
        f(self.string(name)?)?;
        Ok(self)
    }

    fn integer_with<T>(self, name: &str, f: impl FnOnce(ScalarNode<Self>) -> Result<T>) -> Result<Self> {
        f(self.integer(name)?)?;
        Ok(self)
    }

    fn numeric_with<T>(self, name: &str, f: impl FnOnce(ScalarNode<Self>) -> Result<T>) -> Result<Self> {
        f(self.numeric(name)?)?;
        Ok(self)
    }

    fn float_with<T>(self, name: &str, f: impl FnOnce(ScalarNode<Self>) -> Result<T>) -> Result<Self> {
        f(self.float(name)?)?;
        Ok(self)
    }

    fn boolean_with<T>(self, name: &str, f: impl FnOnce(ScalarNode<Self>) -> Result<T>) -> Result<Self> {
        f(self.boolean(name)?)?;
        Ok(self)
    }

    fn array_with<T>(self, name: &str, f: impl FnOnce(ArrayNode<Self>) -> Result<T>) -> Result<Self> {
        f(self.array(name)?)?;
        Ok(self)
    }

    fn object_with<T>(self, name: &str, f: impl FnOnce(ObjectNode<Self>) -> Result<T>) -> Result<Self> {
        f(self.object(name)?)?;
        Ok(self)
    }

    fn file_with<T>(self, name: &str, f: impl FnOnce(FileNode<Self>) -> Result<T>) -> Result<Self> {
        f(self.file(name)?)?;
        Ok(self)
    }

    /// When set, the object entry carries a plain `array` rule instead of the
    /// known-properties guard
    fn allow_unknown_properties(self, allow: bool) -> Self {
        let handle = self.handle();
        if let Ok(body) = handle.tree_mut().object_body_mut(handle.id()) {
            body.allow_unknown_properties = allow;
        }
        self
    }

    /// Replace the known-properties guard with rules produced by `f`
    ///
    /// `f` runs during flattening and sees the object's final property list.
    /// It is not called when unknown properties are allowed or the object
    /// has no properties; the entry then starts with a plain `array` rule.
    fn properties_rule(self, f: impl Fn(&ObjectView<'_>) -> Vec<RuleInput> + 'static) -> Self {
        let handle = self.handle();
        if let Ok(body) = handle.tree_mut().object_body_mut(handle.id()) {
            body.properties_rule = Some(Rc::new(f));
        }
        self
    }

    /// Existing property; `NotFound` when undeclared
    fn get(&self, name: &str) -> Result<Node<Self>> {
        let handle = self.handle();
        let id = property_of(&handle.tree(), handle.id(), name)?;
        Ok(Node::from_parts(handle.child(id), self.clone()))
    }

    fn has(&self, name: &str) -> bool {
        let handle = self.handle();
        let tree = handle.tree();
        tree.object_body(handle.id())
            .map(|body| body.property(name).is_some())
            .unwrap_or(false)
    }

    /// Unlink a property; removing an unknown name is a no-op
    fn remove(self, name: &str) -> Self {
        let handle = self.handle();
        if let Ok(body) = handle.tree_mut().object_body_mut(handle.id()) {
            body.properties.retain(|(existing, _)| existing != name);
        }
        self
    }

    /// Property names in declaration order
    fn defined_property_names(&self) -> Vec<String> {
        let handle = self.handle();
        let tree = handle.tree();
        tree.object_body(handle.id())
            .map(|body| body.properties.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }
}

/// Root of a schema tree
///
/// The root is an object whose own path is the empty string. Its `end()`
/// returns itself, so a chain that climbs past the top stays on the root.
#[derive(Clone, Debug)]
pub struct RootNode {
    handle: NodeHandle,
}

impl RootNode {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        debug!(
            allow_unknown_properties = config.objects.allow_unknown_properties,
            delimiters = ?config.arguments.delimiters,
            "creating schema tree"
        );
        let tree = Rc::new(RefCell::new(Tree::new(config)));
        Self {
            handle: NodeHandle::new(tree, NodeId::ROOT),
        }
    }

    pub fn end(self) -> Self {
        self
    }

    pub fn config(&self) -> BuilderConfig {
        self.handle.tree().config().clone()
    }

    /// Look up a declared node by dot-path; `""` is the root
    pub fn node_at(&self, path: &str) -> Result<Node<CompoundNode>> {
        let target = {
            let tree = self.handle.tree();
            let mut current = NodeId::ROOT;
            if !path.is_empty() {
                for segment in path.split('.') {
                    current = match &tree.node(current).body {
                        NodeBody::Array(_) => element_of(&tree, current, segment)?,
                        NodeBody::Object(_) => property_of(&tree, current, segment)?,
                        NodeBody::Leaf | NodeBody::File(_) => {
                            return Err(SchemaError::NotFound {
                                path: tree.path(current),
                                property: segment.to_string(),
                            })
                        }
                    };
                }
            }
            current
        };
        Node::from_ref(&self.handle.child(target).to_ref())
    }
}

impl Default for RootNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaNode for RootNode {
    fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}

impl ObjectBuilder for RootNode {}

/// Object property or array element with named properties of its own
#[derive(Clone, Debug)]
pub struct ObjectNode<P> {
    handle: NodeHandle,
    parent: P,
}

impl<P: Clone> ObjectNode<P> {
    pub(crate) fn new(handle: NodeHandle, parent: P) -> Self {
        Self { handle, parent }
    }

    pub fn end(self) -> P {
        self.parent
    }
}

impl<P: Clone> SchemaNode for ObjectNode<P> {
    fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}

impl<P: Clone> ObjectBuilder for ObjectNode<P> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_root_path_is_empty() {
        let root = RootNode::new();
        assert_eq!(root.path(), "");
        assert_eq!(root.name(), "");
        assert!(root.clone().end().is_same(&root));
    }

    #[test]
    fn test_declaration_order() {
        let root = RootNode::new();
        root.string("b").unwrap();
        root.integer("a").unwrap();
        root.object("c").unwrap();
        assert_eq!(root.defined_property_names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_redeclare_same_kind_returns_existing() {
        let root = RootNode::new();
        let first = root.object("user").unwrap();
        let second = root.object("user").unwrap();
        assert!(first.is_same(&second));
    }

    #[test]
    fn test_redeclare_other_kind_conflicts() {
        let root = RootNode::new();
        root.string("user").unwrap();
        let err = root.object("user").unwrap_err();
        assert!(matches!(err, SchemaError::Conflict { .. }));
    }

    #[test]
    fn test_get_and_has() {
        let root = RootNode::new();
        root.object("user").unwrap().string("name").unwrap();
        assert!(root.has("user"));
        assert!(!root.has("nope"));
        let user = root.get("user").unwrap().into_object().unwrap();
        assert_eq!(user.get("name").unwrap().path(), "user.name");
        let err = root.get("nope").unwrap_err();
        assert!(matches!(err, SchemaError::NotFound { .. }));
    }

    #[test]
    fn test_get_with_wrong_kind() {
        let root = RootNode::new();
        root.string("name").unwrap();
        let err = root.get("name").unwrap().into_object().unwrap_err();
        assert!(matches!(err, SchemaError::Conflict { .. }));
    }

    #[test]
    fn test_remove() {
        let root = RootNode::new().remove("missing");
        root.string("a").unwrap();
        root.string("b").unwrap();
        let root = root.remove("a");
        assert_eq!(root.defined_property_names(), vec!["b"]);
        assert!(!root.has("a"));
    }

    #[test]
    fn test_end_returns_typed_parent() {
        let root = RootNode::new();
        let user = root.object("user").unwrap();
        let back: RootNode = user.string("name").unwrap().end().end();
        assert!(back.is_same(&root));
    }

    #[test]
    fn test_with_callbacks() {
        let root = RootNode::new()
            .object_with("user", |user| {
                user.string("name")?.required();
                Ok(())
            })
            .unwrap()
            .string_with("token", |token| token.max(64))
            .unwrap();
        assert!(root.has("user"));
        assert!(root.has("token"));
    }

    #[test]
    fn test_node_at() {
        let root = RootNode::new();
        root.array("items")
            .unwrap()
            .each_object()
            .unwrap()
            .string("sku")
            .unwrap();
        let sku = root.node_at("items.*.sku").unwrap();
        assert_eq!(sku.path(), "items.*.sku");
        assert!(root.node_at("").unwrap().handle().is_root());
        assert!(root.node_at("items.0").is_err());
        assert!(root.node_at("items.*.nope").is_err());
    }

    #[test]
    fn test_config_seeds_allow_unknown() {
        let mut config = BuilderConfig::default();
        config.objects.allow_unknown_properties = true;
        let root = RootNode::with_config(config);
        root.object("meta").unwrap().string("a").unwrap();
        let rules = root.build().unwrap();
        assert_eq!(rules.tokens("meta").unwrap(), vec!["array"]);
    }
}
