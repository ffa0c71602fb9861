//! Dot-path computation
//!
//! A node's path is the dot-joined names of its ancestors, root excluded.
//! The root's own path is the empty string.

use crate::nodes::{NodeId, Tree};

/// Absolute dot-path of `id`
pub(crate) fn path_of(tree: &Tree, id: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = id;

    while let Some(parent) = tree.node(current).parent {
        segments.push(tree.node(current).name.as_str());
        current = parent;
    }

    segments.reverse();
    segments.join(".")
}

/// Append a segment to a dot-path
pub(crate) fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join("", "foo"), "foo");
        assert_eq!(join("foo", "*"), "foo.*");
        assert_eq!(join("foo.*", "bar"), "foo.*.bar");
    }
}
