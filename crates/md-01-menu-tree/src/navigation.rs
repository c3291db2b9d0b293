//! Breadcrumbs: resolving a route of node keys into display names.

use serde::{Deserialize, Serialize};

use crate::domain::MenuNode;

/// One resolved step of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub key: String,
    pub name: String,
    /// Route up to and including this step, e.g. `/todo/dashboard/`.
    pub path: String,
}

/// Walk `segments` down the forest by node key. Resolution stops at the
/// first segment that matches no child, so the result is the longest known
/// prefix of the route.
pub fn breadcrumbs<S: AsRef<str>>(forest: &[MenuNode], segments: &[S]) -> Vec<Crumb> {
    let mut crumbs = Vec::new();
    let mut level = forest;
    let mut path = String::from("/");

    for segment in segments {
        let segment = segment.as_ref();
        let Some(node) = level.iter().find(|node| node.key() == Some(segment)) else {
            break;
        };
        path.push_str(segment);
        path.push('/');
        crumbs.push(Crumb {
            key: segment.to_string(),
            name: node.name().to_string(),
            path: path.clone(),
        });
        level = node.children();
    }
    crumbs
}

/// Split a route like `/todo/dashboard` into its non-empty segments.
pub fn route_segments(route: &str) -> Vec<&str> {
    route.split('/').filter(|s| !s.is_empty()).collect()
}
