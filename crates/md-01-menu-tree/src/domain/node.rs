//! The menu tree itself.
//!
//! A node is either a leaf or an internal node with at least one child. The
//! JSON form (`{ key?, name, items? }`) treats absent, `null` and empty
//! `items` alike, so all three parse to [`MenuNode::Leaf`] and a leaf never
//! serializes an `items` field.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::domain::FlattenedPair;
use crate::error::MalformedMenuTree;
use crate::{flatten, parser};

/// One named category in a menu tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode {
    Leaf {
        key: Option<String>,
        name: String,
    },
    Internal {
        key: Option<String>,
        name: String,
        /// Never empty.
        children: Vec<MenuNode>,
    },
}

impl MenuNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        MenuNode::Leaf {
            key: None,
            name: name.into(),
        }
    }

    /// Build a node from its children. An empty child list yields a leaf.
    pub fn branch(name: impl Into<String>, children: Vec<MenuNode>) -> Self {
        if children.is_empty() {
            MenuNode::leaf(name)
        } else {
            MenuNode::Internal {
                key: None,
                name: name.into(),
                children,
            }
        }
    }

    pub fn with_key(mut self, new_key: impl Into<String>) -> Self {
        match &mut self {
            MenuNode::Leaf { key, .. } | MenuNode::Internal { key, .. } => {
                *key = Some(new_key.into())
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            MenuNode::Leaf { name, .. } | MenuNode::Internal { name, .. } => name,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            MenuNode::Leaf { key, .. } | MenuNode::Internal { key, .. } => key.as_deref(),
        }
    }

    /// Children in listed order; empty for a leaf.
    pub fn children(&self) -> &[MenuNode] {
        match self {
            MenuNode::Leaf { .. } => &[],
            MenuNode::Internal { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, MenuNode::Leaf { .. })
    }

    /// Levels in this subtree, a lone leaf being 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        self.walk(|_, level| deepest = deepest.max(level));
        deepest
    }

    pub fn leaf_count(&self) -> usize {
        let mut leaves = 0;
        self.walk(|node, _| {
            if node.is_leaf() {
                leaves += 1;
            }
        });
        leaves
    }

    /// Pre-order visit of this subtree with each node's level (this node is
    /// level 1). Uses an explicit stack, so trees built in code may be
    /// arbitrarily deep.
    pub(crate) fn walk<'a>(&'a self, mut visit: impl FnMut(&'a MenuNode, usize)) {
        visit(self, 1);
        let mut stack = vec![self.children().iter()];
        while let Some(level) = stack.last_mut() {
            match level.next() {
                Some(node) => {
                    visit(node, stack.len() + 1);
                    stack.push(node.children().iter());
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        if let Some(key) = self.key() {
            object.insert("key".into(), json!(key));
        }
        object.insert("name".into(), json!(self.name()));
        if let MenuNode::Internal { children, .. } = self {
            object.insert(
                "items".into(),
                Value::Array(children.iter().map(MenuNode::to_json).collect()),
            );
        }
        Value::Object(object)
    }
}

impl Drop for MenuNode {
    // Detach descendants onto a heap stack; the derived glue would recurse
    // once per level.
    fn drop(&mut self) {
        if let MenuNode::Internal { children, .. } = self {
            let mut pending = std::mem::take(children);
            while let Some(mut node) = pending.pop() {
                if let MenuNode::Internal { children, .. } = &mut node {
                    pending.append(children);
                }
            }
        }
    }
}

impl Serialize for MenuNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(key) = self.key() {
            map.serialize_entry("key", key)?;
        }
        map.serialize_entry("name", self.name())?;
        if let MenuNode::Internal { children, .. } = self {
            map.serialize_entry("items", children)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MenuNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        parser::parse_node(&value).map_err(serde::de::Error::custom)
    }
}

/// An ordered list of top-level menu nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuForest {
    roots: Vec<MenuNode>,
}

impl MenuForest {
    pub fn new(roots: Vec<MenuNode>) -> Self {
        Self { roots }
    }

    /// Validate a JSON array of nodes.
    pub fn parse(value: &Value) -> Result<Self, MalformedMenuTree> {
        parser::parse_forest(value).map(Self::new)
    }

    /// Validate a stored `menu_structure` column, which holds either the
    /// array itself or a JSON string containing it.
    pub fn from_stored(value: &Value) -> Result<Self, MalformedMenuTree> {
        parser::parse_stored(value).map(Self::new)
    }

    pub fn roots(&self) -> &[MenuNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<MenuNode> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.roots.iter().map(MenuNode::depth).max().unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        self.roots.iter().map(MenuNode::leaf_count).sum()
    }

    pub fn flatten(&self) -> Vec<FlattenedPair> {
        flatten::flatten(&self.roots)
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.roots.iter().map(MenuNode::to_json).collect())
    }
}

impl Serialize for MenuForest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.roots.len()))?;
        for root in &self.roots {
            seq.serialize_element(root)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for MenuForest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        MenuForest::parse(&value).map_err(serde::de::Error::custom)
    }
}

impl From<Vec<MenuNode>> for MenuForest {
    fn from(roots: Vec<MenuNode>) -> Self {
        Self::new(roots)
    }
}
