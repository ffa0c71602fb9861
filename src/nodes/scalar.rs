use super::{NodeHandle, SchemaNode};

/// Leaf node: string, integer, numeric, float, boolean, plain scalar or a
/// custom kind
#[derive(Clone, Debug)]
pub struct ScalarNode<P> {
    handle: NodeHandle,
    parent: P,
}

impl<P: Clone> ScalarNode<P> {
    pub(crate) fn new(handle: NodeHandle, parent: P) -> Self {
        Self { handle, parent }
    }

    pub fn end(self) -> P {
        self.parent
    }
}

impl<P: Clone> SchemaNode for ScalarNode<P> {
    fn handle(&self) -> &NodeHandle {
        &self.handle
    }
}
