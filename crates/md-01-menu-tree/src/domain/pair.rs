//! Flattened menu rows.

use serde::{Deserialize, Serialize};

/// A (top-level category, leaf category) pair produced by flattening.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlattenedPair {
    pub first_menu: String,
    pub second_menu: String,
}

impl FlattenedPair {
    pub fn new(first_menu: impl Into<String>, second_menu: impl Into<String>) -> Self {
        Self {
            first_menu: first_menu.into(),
            second_menu: second_menu.into(),
        }
    }
}

/// A run of consecutive rows sharing one first-menu name, as rendered with a
/// spanning first column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup<T> {
    pub first_menu: Option<String>,
    pub rowspan: usize,
    pub items: Vec<T>,
}
