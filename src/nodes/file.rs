//! File upload nodes

use crate::build::RuleEntry;
use crate::rules::{DimensionSet, Dimensions, MimeTypeSet, MimeTypes};

use super::tree::{FileBody, NodeBody, NodeData};
use super::{NodeHandle, SchemaNode};

/// File upload field
///
/// Dimension and MIME constraints accumulate in one rule each, placed where
/// the first constraint of that family was declared.
#[derive(Clone, Debug)]
pub struct FileNode<P> {
    handle: NodeHandle,
    parent: P,
}

impl<P: Clone> FileNode<P> {
    pub(crate) fn new(handle: NodeHandle, parent: P) -> Self {
        Self { handle, parent }
    }

    pub fn end(self) -> P {
        self.parent
    }

    pub fn image(self) -> Self {
        super::known(self, "image")
    }

    /// Image dimension constraints, e.g. `dimensions:max_width=100,ratio=1.5`
    pub fn dimensions(&self) -> Dimensions<P> {
        let slot = self.aggregate_slot(
            |file| &mut file.dimensions,
            || RuleEntry::Dimensions(DimensionSet::default()),
        );
        Dimensions::new(self.clone(), slot)
    }

    /// Allowed MIME types, e.g. `mimetypes:image/jpeg,application/pdf`
    pub fn mime_type(&self) -> MimeTypes<P> {
        let slot = self.aggregate_slot(
            |file| &mut file.mime_types,
            || RuleEntry::MimeTypes(MimeTypeSet::default()),
        );
        MimeTypes::new(self.clone(), slot)
    }

    /// Edit the rule entry at `slot` in place
    pub(crate) fn edit_rule(&self, slot: usize, edit: impl FnOnce(&mut RuleEntry)) {
        let mut tree = self.handle.tree_mut();
        if let Some(entry) = tree.node_mut(self.handle.id()).rules.get_mut(slot) {
            edit(entry);
        }
    }

    fn aggregate_slot(
        &self,
        select: fn(&mut FileBody) -> &mut Option<usize>,
        create: fn() -> RuleEntry,
    ) -> usize {
        let mut tree = self.handle.tree_mut();
        let NodeData { rules, body, .. } = tree.node_mut(self.handle.id());
        let recorded = match body {
            NodeBody::File(file) => Some(select(file)),
            _ => None,
        };
        match recorded {
            Some(Some(slot)) if *slot < rules.len() => *slot,
            Some(slot) => {
                rules.push(create());
                *slot = Some(rules.len() - 1);
                rules.len() - 1
            }
            None => {
                rules.push(create());
                rules.len() - 1
            }
        }
    }
}

impl<P: Clone> SchemaNode for FileNode<P> {
    fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}
