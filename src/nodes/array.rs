//! Array nodes

use crate::error::{Result, SchemaError};
use crate::names::WILDCARD;

use super::tree::{NodeBody, NodeId, Tree};
use super::{FileNode, Node, NodeHandle, NodeKind, ObjectNode, ScalarNode, SchemaNode};

/// Element node of an array; only the wildcard name addresses it
pub(crate) fn element_of(tree: &Tree, array: NodeId, name: &str) -> Result<NodeId> {
    if name != WILDCARD {
        return Err(SchemaError::invalid(format!(
            "array \"{}\" only has the \"{}\" child, not \"{}\"",
            tree.path(array),
            WILDCARD,
            name
        )));
    }
    match &tree.node(array).body {
        NodeBody::Array(body) => body.each.ok_or_else(|| {
            SchemaError::illegal(format!(
                "array \"{}\" has no element node; declare one with each()",
                tree.path(array)
            ))
        }),
        _ => Err(SchemaError::illegal(format!(
            "\"{}\" is not an array node",
            tree.path(array)
        ))),
    }
}

/// Array property; its element node is addressed as `*`
#[derive(Clone, Debug)]
pub struct ArrayNode<P> {
    handle: NodeHandle,
    parent: P,
}

impl<P: Clone> ArrayNode<P> {
    pub(crate) fn new(handle: NodeHandle, parent: P) -> Self {
        Self { handle, parent }
    }

    pub fn end(self) -> P {
        self.parent
    }

    /// Declare the element node, or fetch it if already declared
    ///
    /// Asking for a different kind than the existing element is an
    /// `IllegalState`.
    pub fn each(&self, kind: impl Into<NodeKind>) -> Result<Node<Self>> {
        let id = self
            .handle
            .tree_mut()
            .declare_each(self.handle.id(), kind.into())?;
        Ok(Node::from_parts(self.handle.child(id), self.clone()))
    }

    pub fn each_object(&self) -> Result<ObjectNode<Self>> {
        self.each(NodeKind::Object)?.into_object()
    }

    pub fn each_array(&self) -> Result<ArrayNode<Self>> {
        self.each(NodeKind::Array)?.into_array()
    }

    pub fn each_file(&self) -> Result<FileNode<Self>> {
        self.each(NodeKind::File)?.into_file()
    }

    /// Scalar element of any scalar kind, custom kinds included
    pub fn each_scalar(&self, kind: impl Into<NodeKind>) -> Result<ScalarNode<Self>> {
        let kind = kind.into();
        if kind.is_compound() || kind == NodeKind::File {
            return Err(SchemaError::invalid(format!(
                "\"{}\" is not a scalar kind",
                kind.tag()
            )));
        }
        self.each(kind)?.into_scalar()
    }

    /// Element node by its wildcard name
    pub fn get(&self, name: &str) -> Result<Node<Self>> {
        let id = element_of(&self.handle.tree(), self.handle.id(), name)?;
        Ok(Node::from_parts(self.handle.child(id), self.clone()))
    }

    /// Whether the element node is declared
    pub fn has(&self, name: &str) -> Result<bool> {
        if name != WILDCARD {
            return Err(SchemaError::invalid(format!(
                "arrays only have the \"{}\" child, not \"{}\"",
                WILDCARD, name
            )));
        }
        let tree = self.handle.tree();
        Ok(matches!(
            &tree.node(self.handle.id()).body,
            NodeBody::Array(body) if body.each.is_some()
        ))
    }
}

impl<P: Clone> SchemaNode for ArrayNode<P> {
    fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}
