//! Relative path expressions
//!
//! A [`PathExp`] is a list of movements (up, stay, into a named child) that
//! is traversed from a starting node. Traversal is pure: it reads the tree
//! and returns the node it lands on, so the same expression can be resolved
//! against several owners.
//!
//! ```
//! use ruletree::prelude::*;
//!
//! let root = ruletree::create();
//! let bar = root.array("bar").unwrap();
//! let item = bar.each_object().unwrap();
//! item.boolean("cool_kid").unwrap();
//! let hobbies = item.array("hobbies").unwrap();
//!
//! let target = PathExp::new().parent().get("cool_kid").unwrap();
//! let node = target.traverse(&hobbies.to_ref()).unwrap();
//! assert_eq!(node.path().unwrap(), "bar.*.cool_kid");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SchemaError};
use crate::names::{IN_PLACE, MOVE_UP, WILDCARD};
use crate::nodes::{NodeBody, NodeId, NodeRef, Tree};
use crate::path::path_of;

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Movement {
    /// Move to the parent node
    Up,
    /// Stay on the current node
    InPlace,
    /// Move to a named child; on arrays any name selects the element node
    Child(String),
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Movement::Up => f.write_str(MOVE_UP),
            Movement::InPlace => f.write_str(IN_PLACE),
            Movement::Child(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathExp {
    movements: Vec<Movement>,
}

impl PathExp {
    /// Empty expression; traversing it returns the starting node
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(mut self) -> Self {
        self.movements.push(Movement::Up);
        self
    }

    pub fn here(mut self) -> Self {
        self.movements.push(Movement::InPlace);
        self
    }

    /// Append a named movement
    ///
    /// `"."` is recorded as a stay-in-place movement. `".."` and the empty
    /// name are rejected; use [`PathExp::parent`] to move up.
    pub fn get(mut self, segment: &str) -> Result<Self> {
        self.movements.push(parse_segment(segment, false)?);
        Ok(self)
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Resolve the expression starting at `start`
    pub fn traverse(&self, start: &NodeRef) -> Result<NodeRef> {
        let handle = start.upgrade()?;
        let target = {
            let tree = handle.tree();
            self.traverse_in(&tree, handle.id())?
        };
        Ok(handle.child(target).to_ref())
    }

    /// Nearest object or array at or above `node`
    pub fn find_starting_point(node: &NodeRef) -> Result<NodeRef> {
        let handle = node.upgrade()?;
        let start = {
            let tree = handle.tree();
            let mut current = handle.id();
            while !tree.node(current).body.is_compound() {
                match tree.node(current).parent {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            current
        };
        Ok(handle.child(start).to_ref())
    }

    pub(crate) fn traverse_in(&self, tree: &Tree, start: NodeId) -> Result<NodeId> {
        let mut current = start;
        for movement in &self.movements {
            current = match movement {
                Movement::Up => tree.node(current).parent.ok_or_else(|| {
                    SchemaError::illegal(format!(
                        "cannot move up from the root while resolving \"{}\"",
                        self
                    ))
                })?,
                Movement::InPlace => current,
                Movement::Child(name) => child_of(tree, current, name)?,
            };
        }
        Ok(current)
    }
}

fn child_of(tree: &Tree, id: NodeId, name: &str) -> Result<NodeId> {
    match &tree.node(id).body {
        NodeBody::Array(array) => array.each.ok_or_else(|| {
            SchemaError::illegal(format!(
                "array \"{}\" has no element node to move into",
                path_of(tree, id)
            ))
        }),
        NodeBody::Object(object) => object.property(name).ok_or_else(|| SchemaError::NotFound {
            path: path_of(tree, id),
            property: name.to_string(),
        }),
        NodeBody::Leaf | NodeBody::File(_) => Err(SchemaError::NotFound {
            path: path_of(tree, id),
            property: name.to_string(),
        }),
    }
}

fn parse_segment(segment: &str, allow_up: bool) -> Result<Movement> {
    match segment {
        MOVE_UP if allow_up => Ok(Movement::Up),
        MOVE_UP => Err(SchemaError::invalid(
            "\"..\" is reserved for moving up; use parent() instead",
        )),
        IN_PLACE => Ok(Movement::InPlace),
        "" => Err(SchemaError::invalid("path segments cannot be empty")),
        WILDCARD => Ok(Movement::Child(WILDCARD.to_string())),
        name => Ok(Movement::Child(name.to_string())),
    }
}

/// Slash-separated form, e.g. `../cool_kid` or `../*/name`
impl FromStr for PathExp {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let movements = trimmed
            .split('/')
            .map(|segment| parse_segment(segment, true))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { movements })
    }
}

impl fmt::Display for PathExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.movements.is_empty() {
            return f.write_str(IN_PLACE);
        }
        for (i, movement) in self.movements.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", movement)?;
        }
        Ok(())
    }
}
