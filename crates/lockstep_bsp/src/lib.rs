//! # LOCKSTEP BSP
//!
//! Point location against a level's binary space partition.
//!
//! The renderer calls [`BspTree::locate_leaf`] with the camera position
//! every frame and [`BspTree::walk_front_to_back`] to order the visible
//! set. Both are O(depth) descents over an immutable node array.
//!
//! ## Safety of Queries
//!
//! Corrupt level data is rejected when the tree is built. Queries on a
//! constructed tree cannot fail or index out of bounds.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod node;
pub mod tree;

pub use error::{BspError, BspResult};
pub use node::{classify_point_side, Node, Side, Subsector, NF_SUBSECTOR};
pub use tree::BspTree;
