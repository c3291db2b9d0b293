//! Tree to row conversion.
//!
//! Every leaf below a top-level node becomes one [`FlattenedPair`] named
//! after that top-level node; intermediate levels are dropped. A top-level
//! node without children emits nothing. Output follows pre-order, so the
//! rows of one top-level node stay contiguous.

use crate::domain::{FlattenedPair, MenuGroup, MenuNode};

pub fn flatten(forest: &[MenuNode]) -> Vec<FlattenedPair> {
    let mut pairs = Vec::new();
    for root in forest {
        root.walk(|node, level| {
            if level > 1 && node.is_leaf() {
                pairs.push(FlattenedPair::new(root.name(), node.name()));
            }
        });
    }
    pairs
}

/// Group consecutive items with the same first-menu name. Equal names that
/// are not adjacent start a new group, matching a table whose first column
/// spans each run.
pub fn group_consecutive<T, F>(items: Vec<T>, first_menu: F) -> Vec<MenuGroup<T>>
where
    F: Fn(&T) -> Option<&str>,
{
    let mut groups: Vec<MenuGroup<T>> = Vec::new();
    for item in items {
        let name = first_menu(&item).map(str::to_owned);
        match groups.last_mut() {
            Some(group) if group.first_menu == name => {
                group.items.push(item);
                group.rowspan += 1;
            }
            _ => groups.push(MenuGroup {
                first_menu: name,
                rowspan: 1,
                items: vec![item],
            }),
        }
    }
    groups
}
