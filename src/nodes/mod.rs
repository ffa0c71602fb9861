//! Schema nodes
//!
//! Nodes live in a shared arena ([`Tree`]). The public types are handles
//! into it: [`RootNode`], [`ObjectNode`], [`ArrayNode`], [`ScalarNode`] and
//! [`FileNode`]. Child handles carry their parent handle as a type
//! parameter, so `end()` returns the parent with its concrete type and a
//! chain can hop back up without losing its builder methods:
//!
//! ```
//! use ruletree::prelude::*;
//!
//! let root = ruletree::create()
//!     .object("user").unwrap()
//!         .string("name").unwrap().required().end()
//!         .integer("age").unwrap().min(18).unwrap().end()
//!     .end();
//!
//! let rules = root.build().unwrap();
//! assert_eq!(rules.tokens("user.age").unwrap(), ["integer", "min:18"]);
//! ```
//!
//! Rule arguments that point at other nodes hold a [`NodeRef`]: a weak,
//! symbolic reference that is resolved to a dot-path only when the tree is
//! flattened.

mod array;
mod file;
pub mod kind;
mod object;
mod scalar;
mod tree;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

pub use array::ArrayNode;
pub use file::FileNode;
pub use kind::{CustomKind, NodeKind};
pub use object::{ObjectBuilder, ObjectNode, RootNode};
pub use scalar::ScalarNode;
pub use tree::NodeId;

pub(crate) use tree::{NodeBody, Tree};

use crate::build::{self, PathArg, RuleArg, RuleSet};
use crate::error::{Result, SchemaError};
use crate::names::to_snake_case;
use crate::rules::RuleInput;

pub(crate) type TreeRef = Rc<RefCell<Tree>>;

fn known<N: SchemaNode>(node: N, name: &'static str) -> N {
    build::add_known(node.handle(), name);
    node
}

/// Strong handle to one node of a tree
#[derive(Clone)]
pub struct NodeHandle {
    tree: TreeRef,
    id: NodeId,
}

impl NodeHandle {
    pub(crate) fn new(tree: TreeRef, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub(crate) fn tree(&self) -> Ref<'_, Tree> {
        self.tree.borrow()
    }

    pub(crate) fn tree_mut(&self) -> RefMut<'_, Tree> {
        self.tree.borrow_mut()
    }

    /// Handle to another node of the same tree
    pub(crate) fn child(&self, id: NodeId) -> NodeHandle {
        NodeHandle::new(Rc::clone(&self.tree), id)
    }

    pub(crate) fn parent(&self) -> Option<NodeHandle> {
        let parent = self.tree().node(self.id).parent;
        parent.map(|id| self.child(id))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn to_ref(&self) -> NodeRef {
        NodeRef {
            tree: Rc::downgrade(&self.tree),
            id: self.id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.tree().node(self.id).parent.is_none()
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree();
        f.debug_struct("NodeHandle")
            .field("path", &tree.path(self.id))
            .field("kind", &tree.node(self.id).kind.tag())
            .finish()
    }
}

/// Symbolic reference to a node
///
/// Does not keep the tree alive. Resolving a reference whose tree has been
/// dropped fails with `IllegalState`.
#[derive(Clone)]
pub struct NodeRef {
    tree: Weak<RefCell<Tree>>,
    id: NodeId,
}

impl NodeRef {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn upgrade(&self) -> Result<NodeHandle> {
        self.tree
            .upgrade()
            .map(|tree| NodeHandle::new(tree, self.id))
            .ok_or_else(|| {
                SchemaError::illegal("referenced node belongs to a tree that no longer exists")
            })
    }

    /// Absolute dot-path of the referenced node
    pub fn path(&self) -> Result<String> {
        let handle = self.upgrade()?;
        let path = handle.tree().path(self.id);
        Ok(path)
    }

    pub fn name(&self) -> Result<String> {
        let handle = self.upgrade()?;
        let name = handle.tree().node(self.id).name.clone();
        Ok(name)
    }

    /// Typed view of the referenced node
    pub fn resolve(&self) -> Result<Node<CompoundNode>> {
        Node::from_ref(self)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Ok(path) => f.debug_tuple("NodeRef").field(&path).finish(),
            Err(_) => f.debug_tuple("NodeRef").field(&"<dropped>").finish(),
        }
    }
}

/// Behavior shared by every node handle
///
/// Rule methods consume the handle and return it so declarations chain.
/// Methods whose arguments can be malformed return `Result`.
pub trait SchemaNode: Clone + Sized {
    fn handle(&self) -> &NodeHandle;

    fn id(&self) -> NodeId {
        self.handle().id()
    }

    /// Name in the parent; empty for the root, `*` for array elements
    fn name(&self) -> String {
        let handle = self.handle();
        let name = handle.tree().node(handle.id()).name.clone();
        name
    }

    /// Absolute dot-path
    fn path(&self) -> String {
        let handle = self.handle();
        let path = handle.tree().path(handle.id());
        path
    }

    fn kind(&self) -> NodeKind {
        let handle = self.handle();
        let kind = handle.tree().node(handle.id()).kind.clone();
        kind
    }

    fn to_ref(&self) -> NodeRef {
        self.handle().to_ref()
    }

    fn is_same<N: SchemaNode>(&self, other: &N) -> bool {
        self.to_ref() == other.to_ref()
    }

    /// Flatten this node and its descendants into a rule mapping
    fn build(&self) -> Result<RuleSet> {
        build::flatten(self.handle())
    }

    /// Rendered rule tokens of this node alone, without descendants
    fn rule_tokens(&self) -> Result<Vec<String>> {
        let path = self.path();
        let rules = self.build()?;
        Ok(rules.tokens(&path).unwrap_or_default())
    }

    /// Append a rule: a token, a rule object, a stringable value or a node
    fn rule(self, rule: impl Into<RuleInput>) -> Result<Self> {
        build::add_input(self.handle(), rule.into())?;
        Ok(self)
    }

    /// Append a bare rule by name; the name is converted to snake case
    fn rule_named(self, name: &str) -> Result<Self> {
        build::add_bare(self.handle(), name)?;
        Ok(self)
    }

    /// Append a named rule with arguments; the name is converted to snake case
    fn rule_with<I>(self, name: &str, args: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<RuleArg>,
    {
        let args = args.into_iter().map(Into::into).collect();
        build::add_rule(self.handle(), &to_snake_case(name), args)?;
        Ok(self)
    }

    /// Run `f` on this node and return the node for further chaining
    fn with<T>(self, f: impl FnOnce(Self) -> Result<T>) -> Result<Self> {
        f(self.clone())?;
        Ok(self)
    }

    /// Run `f` only when `condition` holds
    fn when<T>(self, condition: bool, f: impl FnOnce(Self) -> Result<T>) -> Result<Self> {
        if condition {
            self.with(f)
        } else {
            Ok(self)
        }
    }

    /// Store a copy of the handle in `slot`
    fn assign_to(self, slot: &mut Option<Self>) -> Self {
        *slot = Some(self.clone());
        self
    }

    fn required(self) -> Self {
        known(self, "required")
    }

    /// `required` only when `condition` holds
    fn required_when(self, condition: bool) -> Self {
        if condition {
            self.required()
        } else {
            self
        }
    }

    fn nullable(self) -> Self {
        known(self, "nullable")
    }

    fn sometimes(self) -> Self {
        known(self, "sometimes")
    }

    fn present(self) -> Self {
        known(self, "present")
    }

    fn filled(self) -> Self {
        known(self, "filled")
    }

    fn accepted(self) -> Self {
        known(self, "accepted")
    }

    fn declined(self) -> Self {
        known(self, "declined")
    }

    fn prohibited(self) -> Self {
        known(self, "prohibited")
    }

    fn missing(self) -> Self {
        known(self, "missing")
    }

    fn bail(self) -> Self {
        known(self, "bail")
    }

    fn distinct(self) -> Self {
        known(self, "distinct")
    }

    fn uppercase(self) -> Self {
        known(self, "uppercase")
    }

    fn lowercase(self) -> Self {
        known(self, "lowercase")
    }

    fn timezone(self) -> Self {
        known(self, "timezone")
    }

    fn confirmed(self) -> Self {
        known(self, "confirmed")
    }

    fn digits(self, count: u32) -> Result<Self> {
        self.rule_with("digits", [count])
    }

    fn digits_between(self, min: u32, max: u32) -> Result<Self> {
        self.rule_with("digits_between", [min, max])
    }

    fn min(self, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("min", [value.into()])
    }

    fn max(self, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("max", [value.into()])
    }

    fn size(self, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("size", [value.into()])
    }

    fn between(self, min: impl Into<RuleArg>, max: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("between", [min.into(), max.into()])
    }

    /// `gt` accepts a value or a reference to a sibling field
    fn gt(self, other: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("gt", [other.into()])
    }

    fn gte(self, other: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("gte", [other.into()])
    }

    fn lt(self, other: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("lt", [other.into()])
    }

    fn lte(self, other: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("lte", [other.into()])
    }

    fn in_list<I>(self, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<RuleArg>,
    {
        self.rule_with("in", values)
    }

    fn not_in_list<I>(self, values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<RuleArg>,
    {
        self.rule_with("not_in", values)
    }

    fn date_format(self, format: &str) -> Result<Self> {
        self.rule_with("date_format", [format])
    }

    fn starts_with<I>(self, prefixes: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<RuleArg>,
    {
        self.rule_with("starts_with", prefixes)
    }

    fn ends_with<I>(self, suffixes: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<RuleArg>,
    {
        self.rule_with("ends_with", suffixes)
    }

    fn same(self, field: impl Into<PathArg>) -> Result<Self> {
        self.rule_with("same", [RuleArg::from(field.into())])
    }

    fn different(self, field: impl Into<PathArg>) -> Result<Self> {
        self.rule_with("different", [RuleArg::from(field.into())])
    }

    fn required_if(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("required_if", [RuleArg::from(field.into()), value.into()])
    }

    fn required_unless(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("required_unless", [RuleArg::from(field.into()), value.into()])
    }

    fn required_if_accepted(self, field: impl Into<PathArg>) -> Result<Self> {
        self.rule_with("required_if_accepted", [RuleArg::from(field.into())])
    }

    fn required_if_declined(self, field: impl Into<PathArg>) -> Result<Self> {
        self.rule_with("required_if_declined", [RuleArg::from(field.into())])
    }

    fn required_with<I>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PathArg>,
    {
        self.rule_with("required_with", path_args(fields))
    }

    fn required_with_all<I>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PathArg>,
    {
        self.rule_with("required_with_all", path_args(fields))
    }

    fn required_without<I>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PathArg>,
    {
        self.rule_with("required_without", path_args(fields))
    }

    fn required_without_all<I>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PathArg>,
    {
        self.rule_with("required_without_all", path_args(fields))
    }

    fn accepted_if(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("accepted_if", [RuleArg::from(field.into()), value.into()])
    }

    fn declined_if(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("declined_if", [RuleArg::from(field.into()), value.into()])
    }

    fn prohibited_if(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("prohibited_if", [RuleArg::from(field.into()), value.into()])
    }

    fn prohibited_unless(
        self,
        field: impl Into<PathArg>,
        value: impl Into<RuleArg>,
    ) -> Result<Self> {
        self.rule_with("prohibited_unless", [RuleArg::from(field.into()), value.into()])
    }

    fn prohibits<I>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PathArg>,
    {
        self.rule_with("prohibits", path_args(fields))
    }

    fn missing_if(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("missing_if", [RuleArg::from(field.into()), value.into()])
    }

    fn missing_unless(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("missing_unless", [RuleArg::from(field.into()), value.into()])
    }

    fn missing_with<I>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PathArg>,
    {
        self.rule_with("missing_with", path_args(fields))
    }

    fn missing_with_all<I>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PathArg>,
    {
        self.rule_with("missing_with_all", path_args(fields))
    }

    fn missing_without<I>(self, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PathArg>,
    {
        self.rule_with("missing_without", path_args(fields))
    }

    fn exclude_if(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("exclude_if", [RuleArg::from(field.into()), value.into()])
    }

    fn exclude_unless(self, field: impl Into<PathArg>, value: impl Into<RuleArg>) -> Result<Self> {
        self.rule_with("exclude_unless", [RuleArg::from(field.into()), value.into()])
    }

    fn exclude_with(self, field: impl Into<PathArg>) -> Result<Self> {
        self.rule_with("exclude_with", [RuleArg::from(field.into())])
    }

    fn exclude_without(self, field: impl Into<PathArg>) -> Result<Self> {
        self.rule_with("exclude_without", [RuleArg::from(field.into())])
    }
}

fn path_args<I>(fields: I) -> Vec<RuleArg>
where
    I: IntoIterator,
    I::Item: Into<PathArg>,
{
    fields
        .into_iter()
        .map(|field| RuleArg::from(field.into()))
        .collect()
}

/// Untyped handle to an object or array, used as the parent of nodes
/// reached through a [`NodeRef`] or a dot-path lookup
#[derive(Clone, Debug)]
pub struct CompoundNode {
    handle: NodeHandle,
}

impl CompoundNode {
    pub(crate) fn new(handle: NodeHandle) -> Self {
        Self { handle }
    }

    pub fn is_root(&self) -> bool {
        self.handle.is_root()
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self.handle.tree().node(self.handle.id()).body,
            NodeBody::Array(_)
        )
    }

    /// Parent compound; the root ends in itself
    pub fn end(self) -> CompoundNode {
        match self.handle.parent() {
            Some(parent) => CompoundNode::new(parent),
            None => self,
        }
    }

    pub fn into_object(self) -> Result<ObjectNode<CompoundNode>> {
        let parent = self.clone().end();
        Node::from_parts(self.handle, parent).into_object()
    }

    pub fn into_array(self) -> Result<ArrayNode<CompoundNode>> {
        let parent = self.clone().end();
        Node::from_parts(self.handle, parent).into_array()
    }

    /// Child by name; arrays only answer to `*`
    pub fn get(&self, name: &str) -> Result<Node<CompoundNode>> {
        let target = {
            let tree = self.handle.tree();
            match &tree.node(self.handle.id()).body {
                NodeBody::Array(_) => array::element_of(&tree, self.handle.id(), name)?,
                _ => object::property_of(&tree, self.handle.id(), name)?,
            }
        };
        Ok(Node::from_parts(self.handle.child(target), self.clone()))
    }
}

impl SchemaNode for CompoundNode {
    fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}

/// Handle to a node whose kind is only known at run time
#[derive(Clone, Debug)]
pub enum Node<P> {
    Scalar(ScalarNode<P>),
    Object(ObjectNode<P>),
    Array(ArrayNode<P>),
    File(FileNode<P>),
}

impl<P: Clone> Node<P> {
    pub(crate) fn from_parts(handle: NodeHandle, parent: P) -> Self {
        let kind = handle.tree().node(handle.id()).kind.clone();
        match kind {
            NodeKind::Object => Node::Object(ObjectNode::new(handle, parent)),
            NodeKind::Array => Node::Array(ArrayNode::new(handle, parent)),
            NodeKind::File => Node::File(FileNode::new(handle, parent)),
            _ => Node::Scalar(ScalarNode::new(handle, parent)),
        }
    }

    fn mismatch(&self, requested: &str) -> SchemaError {
        SchemaError::Conflict {
            path: self.path(),
            existing: self.kind().tag().to_string(),
            requested: requested.to_string(),
        }
    }

    pub fn into_scalar(self) -> Result<ScalarNode<P>> {
        match self {
            Node::Scalar(node) => Ok(node),
            other => Err(other.mismatch("scalar")),
        }
    }

    pub fn into_object(self) -> Result<ObjectNode<P>> {
        match self {
            Node::Object(node) => Ok(node),
            other => Err(other.mismatch("object")),
        }
    }

    pub fn into_array(self) -> Result<ArrayNode<P>> {
        match self {
            Node::Array(node) => Ok(node),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn into_file(self) -> Result<FileNode<P>> {
        match self {
            Node::File(node) => Ok(node),
            other => Err(other.mismatch("file")),
        }
    }

    pub fn end(self) -> P {
        match self {
            Node::Scalar(node) => node.end(),
            Node::Object(node) => node.end(),
            Node::Array(node) => node.end(),
            Node::File(node) => node.end(),
        }
    }
}

impl Node<CompoundNode> {
    /// Typed view of a referenced node, parented by an untyped compound
    pub fn from_ref(node: &NodeRef) -> Result<Self> {
        let handle = node.upgrade()?;
        let parent = match handle.parent() {
            Some(parent) => CompoundNode::new(parent),
            None => CompoundNode::new(handle.clone()),
        };
        Ok(Node::from_parts(handle, parent))
    }
}

impl<P: Clone> SchemaNode for Node<P> {
    fn handle(&self) -> &NodeHandle {
        match self {
            Node::Scalar(node) => node.handle(),
            Node::Object(node) => node.handle(),
            Node::Array(node) => node.handle(),
            Node::File(node) => node.handle(),
        }
    }
}

/// Read-only view of an object, passed to custom properties rules
pub struct ObjectView<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> ObjectView<'a> {
    pub(crate) fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn name(&self) -> &str {
        &self.tree.node(self.id).name
    }

    pub fn path(&self) -> String {
        self.tree.path(self.id)
    }

    pub fn defined_property_names(&self) -> Vec<String> {
        self.tree
            .object_body(self.id)
            .map(|body| body.properties.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn allows_unknown_properties(&self) -> bool {
        self.tree
            .object_body(self.id)
            .map(|body| body.allow_unknown_properties)
            .unwrap_or(false)
    }
}

macro_rules! node_reference_conversions {
    ($target:ident) => {
        impl From<NodeRef> for $target {
            fn from(node: NodeRef) -> Self {
                $target::Node(node)
            }
        }

        impl From<&NodeRef> for $target {
            fn from(node: &NodeRef) -> Self {
                $target::Node(node.clone())
            }
        }

        impl From<&RootNode> for $target {
            fn from(node: &RootNode) -> Self {
                $target::Node(node.to_ref())
            }
        }

        impl From<&CompoundNode> for $target {
            fn from(node: &CompoundNode) -> Self {
                $target::Node(node.to_ref())
            }
        }

        impl<P: Clone> From<&ObjectNode<P>> for $target {
            fn from(node: &ObjectNode<P>) -> Self {
                $target::Node(node.to_ref())
            }
        }

        impl<P: Clone> From<&ArrayNode<P>> for $target {
            fn from(node: &ArrayNode<P>) -> Self {
                $target::Node(node.to_ref())
            }
        }

        impl<P: Clone> From<&ScalarNode<P>> for $target {
            fn from(node: &ScalarNode<P>) -> Self {
                $target::Node(node.to_ref())
            }
        }

        impl<P: Clone> From<&FileNode<P>> for $target {
            fn from(node: &FileNode<P>) -> Self {
                $target::Node(node.to_ref())
            }
        }

        impl<P: Clone> From<&Node<P>> for $target {
            fn from(node: &Node<P>) -> Self {
                $target::Node(node.to_ref())
            }
        }
    };
}

node_reference_conversions!(RuleArg);
node_reference_conversions!(PathArg);
node_reference_conversions!(RuleInput);
