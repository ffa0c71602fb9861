use std::fmt;

use crate::build::RuleEntry;
use crate::nodes::FileNode;

/// Accumulated `dimensions` constraints
///
/// Keys keep the order they were first set in; setting a key again replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionSet {
    constraints: Vec<(&'static str, String)>,
}

impl DimensionSet {
    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.constraints.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.constraints.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.constraints
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dimensions:")?;
        for (i, (key, value)) in self.constraints.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Builder for the dimension constraints of a file node
///
/// ```
/// use ruletree::prelude::*;
///
/// let root = ruletree::create();
/// root.file("avatar").unwrap()
///     .image()
///     .dimensions().max_width(100).max_height(100).end();
///
/// let rules = root.build().unwrap();
/// assert_eq!(
///     rules.tokens("avatar").unwrap(),
///     ["image", "dimensions:max_width=100,max_height=100"]
/// );
/// ```
pub struct Dimensions<P> {
    file: FileNode<P>,
    slot: usize,
}

impl<P: Clone> Dimensions<P> {
    pub(crate) fn new(file: FileNode<P>, slot: usize) -> Self {
        Self { file, slot }
    }

    fn set(self, key: &'static str, value: String) -> Self {
        self.file.edit_rule(self.slot, |entry| {
            if let RuleEntry::Dimensions(set) = entry {
                set.set(key, value);
            }
        });
        self
    }

    pub fn width(self, px: u32) -> Self {
        self.set("width", px.to_string())
    }

    pub fn height(self, px: u32) -> Self {
        self.set("height", px.to_string())
    }

    pub fn min_width(self, px: u32) -> Self {
        self.set("min_width", px.to_string())
    }

    pub fn min_height(self, px: u32) -> Self {
        self.set("min_height", px.to_string())
    }

    pub fn max_width(self, px: u32) -> Self {
        self.set("max_width", px.to_string())
    }

    pub fn max_height(self, px: u32) -> Self {
        self.set("max_height", px.to_string())
    }

    /// Width divided by height, as a number (`1.5`) or a fraction (`"3/2"`)
    pub fn ratio(self, ratio: impl fmt::Display) -> Self {
        self.set("ratio", ratio.to_string())
    }

    pub fn end(self) -> FileNode<P> {
        self.file
    }
}
