//! Error types for the menu tree parser

use crate::domain::NodePath;
use thiserror::Error;

/// What is wrong with the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("menu structure must be a JSON array of nodes")]
    ForestNotArray,

    #[error("node is not a JSON object")]
    NotAnObject,

    #[error("node has no `name`")]
    MissingName,

    #[error("`name` is not a string")]
    NameNotString,

    #[error("`name` is blank")]
    BlankName,

    #[error("`key` is not a string")]
    KeyNotString,

    #[error("`items` is present but not an array")]
    ItemsNotArray,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("nesting deeper than {max} levels")]
    TooDeep { max: usize },
}

impl MalformedReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            MalformedReason::ForestNotArray => "forest_not_array",
            MalformedReason::NotAnObject => "not_an_object",
            MalformedReason::MissingName => "missing_name",
            MalformedReason::NameNotString => "name_not_string",
            MalformedReason::BlankName => "blank_name",
            MalformedReason::KeyNotString => "key_not_string",
            MalformedReason::ItemsNotArray => "items_not_array",
            MalformedReason::InvalidJson(_) => "invalid_json",
            MalformedReason::TooDeep { .. } => "too_deep",
        }
    }
}

/// A menu tree failed validation. `path` locates the first offending node in
/// pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed menu tree at {path}: {reason}")]
pub struct MalformedMenuTree {
    pub path: NodePath,
    pub reason: MalformedReason,
}

impl MalformedMenuTree {
    pub fn new(path: NodePath, reason: MalformedReason) -> Self {
        Self { path, reason }
    }

    pub(crate) fn at_root(reason: MalformedReason) -> Self {
        Self::new(NodePath::root(), reason)
    }
}
