//! Domain types for the menu tree.

pub mod node;
pub mod pair;
pub mod path;

pub use node::{MenuForest, MenuNode};
pub use pair::{FlattenedPair, MenuGroup};
pub use path::NodePath;
