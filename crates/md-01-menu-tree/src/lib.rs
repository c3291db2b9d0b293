//! # MD-01 Menu Tree
//!
//! Hierarchical menu structures and their conversion into flat
//! (first menu, second menu) rows used to seed todos.
//!
//! ## Architecture
//!
//! ```text
//!  stored JSON ──► parser ──► MenuForest ──► flatten ──► Vec<FlattenedPair>
//!  (array or        │             │
//!   JSON string)    ▼             └──► navigation::breadcrumbs
//!           MalformedMenuTree
//!           { path, reason }
//! ```
//!
//! - **Domain** (`domain/`): `MenuNode` (leaf or internal, never an internal
//!   node without children), `MenuForest`, `NodePath`, `FlattenedPair`.
//! - **Parser** (`parser`): validates each node before its children and
//!   reports the first offending node by path.
//! - **Flatten** (`flatten`): pure pre-order traversal, plus grouping of
//!   consecutive rows by first menu.
//!
//! ## Flattening Policy
//!
//! - `first_menu` is always the name of the top-level node the leaf sits
//!   under, however deep the leaf is.
//! - `second_menu` is the leaf's own name.
//! - A top-level node with no children produces no row.
//!
//! ## Usage
//!
//! ```
//! use md_01_menu_tree::MenuForest;
//! use serde_json::json;
//!
//! let forest = MenuForest::parse(&json!([
//!     {"name": "A", "items": [{"name": "B", "items": [{"name": "leaf"}]}]}
//! ])).unwrap();
//! let pairs = forest.flatten();
//! assert_eq!(pairs[0].first_menu, "A");
//! assert_eq!(pairs[0].second_menu, "leaf");
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod error;
pub mod flatten;
pub mod navigation;
pub mod parser;

pub use domain::{FlattenedPair, MenuForest, MenuGroup, MenuNode, NodePath};
pub use error::{MalformedMenuTree, MalformedReason};
pub use flatten::{flatten, group_consecutive};
pub use navigation::{breadcrumbs, route_segments, Crumb};
pub use parser::{parse_forest, parse_forest_str, parse_stored, MAX_DEPTH};
