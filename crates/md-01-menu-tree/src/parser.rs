//! Validating conversion from JSON to [`MenuNode`].
//!
//! Every node is checked before its children are visited, so the reported
//! path is the first malformed node in pre-order. Unknown fields are ignored.

use serde_json::{Map, Value};

use crate::domain::{MenuNode, NodePath};
use crate::error::{MalformedMenuTree, MalformedReason};

/// Deepest nesting accepted, counting top-level nodes as depth 1.
pub const MAX_DEPTH: usize = 64;

/// Parse a JSON array of top-level nodes.
pub fn parse_forest(value: &Value) -> Result<Vec<MenuNode>, MalformedMenuTree> {
    let items = value
        .as_array()
        .ok_or_else(|| MalformedMenuTree::at_root(MalformedReason::ForestNotArray))?;
    parse_children(items, &NodePath::root())
}

/// Parse JSON text holding an array of top-level nodes.
pub fn parse_forest_str(text: &str) -> Result<Vec<MenuNode>, MalformedMenuTree> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| MalformedMenuTree::at_root(MalformedReason::InvalidJson(e.to_string())))?;
    parse_forest(&value)
}

/// Parse a stored column: either the array or a string containing it.
pub fn parse_stored(value: &Value) -> Result<Vec<MenuNode>, MalformedMenuTree> {
    match value {
        Value::String(text) => parse_forest_str(text),
        other => parse_forest(other),
    }
}

/// Parse a single node; errors are reported relative to that node.
pub fn parse_node(value: &Value) -> Result<MenuNode, MalformedMenuTree> {
    node_at(value, NodePath::root().child(0))
}

fn parse_children(items: &[Value], parent: &NodePath) -> Result<Vec<MenuNode>, MalformedMenuTree> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| node_at(item, parent.child(index)))
        .collect()
}

fn node_at(value: &Value, path: NodePath) -> Result<MenuNode, MalformedMenuTree> {
    if path.depth() > MAX_DEPTH {
        return Err(MalformedMenuTree::new(
            path,
            MalformedReason::TooDeep { max: MAX_DEPTH },
        ));
    }

    let Some(object) = value.as_object() else {
        return Err(MalformedMenuTree::new(path, MalformedReason::NotAnObject));
    };

    let name = match read_name(object) {
        Ok(name) => name,
        Err(reason) => return Err(MalformedMenuTree::new(path, reason)),
    };
    let key = match read_key(object) {
        Ok(key) => key,
        Err(reason) => return Err(MalformedMenuTree::new(path, reason)),
    };

    let children = match object.get("items") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => parse_children(items, &path)?,
        Some(_) => return Err(MalformedMenuTree::new(path, MalformedReason::ItemsNotArray)),
    };

    Ok(if children.is_empty() {
        MenuNode::Leaf { key, name }
    } else {
        MenuNode::Internal {
            key,
            name,
            children,
        }
    })
}

fn read_name(object: &Map<String, Value>) -> Result<String, MalformedReason> {
    match object.get("name") {
        None | Some(Value::Null) => Err(MalformedReason::MissingName),
        Some(Value::String(name)) if name.trim().is_empty() => Err(MalformedReason::BlankName),
        Some(Value::String(name)) => Ok(name.clone()),
        Some(_) => Err(MalformedReason::NameNotString),
    }
}

fn read_key(object: &Map<String, Value>) -> Result<Option<String>, MalformedReason> {
    match object.get("key") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(key)) => Ok(Some(key.clone())),
        Some(_) => Err(MalformedReason::KeyNotString),
    }
}
