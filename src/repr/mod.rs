//! Expression representation: node kinds, node records, and postfix trees.
//!
//! This module provides:
//! - [`NodeType`]: bit-flag node kinds
//! - [`Node`]: the flat tagged node record
//! - [`Tree`]: postfix node array with subtree-length child navigation

mod hash;
mod node;
mod tree;

pub use node::{Node, NodeType};
pub use tree::{Tree, TreeValidationError};
