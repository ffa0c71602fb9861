//! Node arena
//!
//! Every node of a schema lives in one [`Tree`]. Handles address nodes by
//! [`NodeId`]; the root is always the first slot. Nodes are never removed
//! from the arena: removing a property only unlinks it from its object.

use std::rc::Rc;

use crate::build::RuleEntry;
use crate::config::BuilderConfig;
use crate::error::{Result, SchemaError};
use crate::names::{IN_PLACE, MOVE_UP};
use crate::path::path_of;
use crate::rules::RuleInput;

use super::kind::NodeKind;
use super::ObjectView;

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

pub(crate) type PropertiesRule = Rc<dyn Fn(&ObjectView<'_>) -> Vec<RuleInput>>;

pub(crate) struct Tree {
    nodes: Vec<NodeData>,
    config: BuilderConfig,
}

pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) rules: Vec<RuleEntry>,
    pub(crate) body: NodeBody,
}

pub(crate) enum NodeBody {
    Leaf,
    Object(ObjectBody),
    Array(ArrayBody),
    File(FileBody),
}

impl NodeBody {
    pub(crate) fn is_compound(&self) -> bool {
        matches!(self, NodeBody::Object(_) | NodeBody::Array(_))
    }
}

pub(crate) struct ObjectBody {
    /// Declaration order is output order
    pub(crate) properties: Vec<(String, NodeId)>,
    pub(crate) allow_unknown_properties: bool,
    pub(crate) properties_rule: Option<PropertiesRule>,
}

impl ObjectBody {
    pub(crate) fn property(&self, name: &str) -> Option<NodeId> {
        self.properties
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, id)| *id)
    }
}

pub(crate) struct ArrayBody {
    pub(crate) each: Option<NodeId>,
}

/// Slots of the file node's aggregate rules in its rule list
#[derive(Default)]
pub(crate) struct FileBody {
    pub(crate) dimensions: Option<usize>,
    pub(crate) mime_types: Option<usize>,
}

impl Tree {
    pub(crate) fn new(config: BuilderConfig) -> Self {
        let root = NodeData {
            name: String::new(),
            parent: None,
            kind: NodeKind::Object,
            rules: Vec::new(),
            body: NodeBody::Object(ObjectBody {
                properties: Vec::new(),
                allow_unknown_properties: config.objects.allow_unknown_properties,
                properties_rule: None,
            }),
        };
        Self {
            nodes: vec![root],
            config,
        }
    }

    pub(crate) fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub(crate) fn path(&self, id: NodeId) -> String {
        path_of(self, id)
    }

    fn insert(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let body = match &kind {
            NodeKind::Object => NodeBody::Object(ObjectBody {
                properties: Vec::new(),
                allow_unknown_properties: self.config.objects.allow_unknown_properties,
                properties_rule: None,
            }),
            NodeKind::Array => NodeBody::Array(ArrayBody { each: None }),
            NodeKind::File => NodeBody::File(FileBody::default()),
            _ => NodeBody::Leaf,
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.to_string(),
            parent: Some(parent),
            rules: kind.default_rules(),
            kind,
            body,
        });
        id
    }

    pub(crate) fn object_body(&self, id: NodeId) -> Result<&ObjectBody> {
        match &self.node(id).body {
            NodeBody::Object(body) => Ok(body),
            _ => Err(SchemaError::illegal(format!(
                "\"{}\" is not an object node",
                self.path(id)
            ))),
        }
    }

    pub(crate) fn object_body_mut(&mut self, id: NodeId) -> Result<&mut ObjectBody> {
        let path = self.path(id);
        match &mut self.node_mut(id).body {
            NodeBody::Object(body) => Ok(body),
            _ => Err(SchemaError::illegal(format!(
                "\"{}\" is not an object node",
                path
            ))),
        }
    }

    /// Declare a property, or return the existing one when the kind matches
    pub(crate) fn declare_property(
        &mut self,
        object: NodeId,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId> {
        validate_property_name(name)?;

        if let Some(existing) = self.object_body(object)?.property(name) {
            let existing_kind = &self.node(existing).kind;
            if *existing_kind != kind {
                return Err(SchemaError::Conflict {
                    path: crate::path::join(&self.path(object), name),
                    existing: existing_kind.tag().to_string(),
                    requested: kind.tag().to_string(),
                });
            }
            return Ok(existing);
        }

        let id = self.insert(object, name, kind);
        self.object_body_mut(object)?
            .properties
            .push((name.to_string(), id));
        Ok(id)
    }

    /// Declare the element node of an array, or return the existing one
    pub(crate) fn declare_each(&mut self, array: NodeId, kind: NodeKind) -> Result<NodeId> {
        let existing = match &self.node(array).body {
            NodeBody::Array(body) => body.each,
            _ => {
                return Err(SchemaError::illegal(format!(
                    "\"{}\" is not an array node",
                    self.path(array)
                )))
            }
        };

        if let Some(each) = existing {
            let existing_kind = &self.node(each).kind;
            if *existing_kind != kind {
                return Err(SchemaError::illegal(format!(
                    "elements of \"{}\" are already declared as {}, cannot redeclare as {}",
                    self.path(array),
                    existing_kind.tag(),
                    kind.tag()
                )));
            }
            return Ok(each);
        }

        let id = self.insert(array, crate::names::WILDCARD, kind);
        if let NodeBody::Array(body) = &mut self.node_mut(array).body {
            body.each = Some(id);
        }
        Ok(id)
    }
}

fn validate_property_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SchemaError::invalid("property names cannot be empty"));
    }
    if name == MOVE_UP || name == IN_PLACE || name.contains('.') {
        return Err(SchemaError::invalid(format!(
            "property name {:?} collides with path syntax",
            name
        )));
    }
    Ok(())
}
