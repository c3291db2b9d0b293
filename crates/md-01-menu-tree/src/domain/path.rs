//! Positions inside a menu forest.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Indices from the forest root down to a node. The first index selects the
/// top-level node, each following one a child of the previous node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The forest itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Depth of the addressed node, top-level nodes being depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// Renders as `$` for the forest and `[0].items[2]` for nested nodes, which
/// reads the same way as the JSON it points into.
impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.0.split_first() else {
            return f.write_str("$");
        };
        write!(f, "[{}]", first)?;
        for index in rest {
            write!(f, ".items[{}]", index)?;
        }
        Ok(())
    }
}
