//! # BSP Error Types
//!
//! Every variant means the level data is corrupt. None of them is
//! recoverable at runtime.

use thiserror::Error;

/// Errors raised while building or decoding a [`crate::BspTree`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BspError {
    /// The level has no subsectors at all.
    #[error("corrupt level data: no subsectors")]
    NoSubsectors,

    /// More nodes than a child index can address.
    #[error("corrupt level data: {0} nodes exceeds the addressable limit")]
    TooManyNodes(usize),

    /// A child points at a node that does not exist.
    #[error("corrupt level data: node {node} references missing node {child}")]
    NodeOutOfRange {
        /// The node holding the bad reference.
        node: usize,
        /// The referenced node index.
        child: u16,
    },

    /// A child points at a subsector that does not exist.
    #[error("corrupt level data: node {node} references subsector {leaf} of {count}")]
    LeafOutOfRange {
        /// The node holding the bad reference.
        node: usize,
        /// The referenced subsector index.
        leaf: u16,
        /// Number of subsectors in the level.
        count: usize,
    },

    /// Descending from the root can revisit a node.
    #[error("corrupt level data: cycle through node {node}")]
    Cycle {
        /// First node found on the cycle.
        node: u16,
    },

    /// A lump is not a whole number of records.
    #[error("corrupt level data: {lump} lump is {len} bytes, not a multiple of {record}")]
    LumpSize {
        /// Lump name.
        lump: &'static str,
        /// Byte length found.
        len: usize,
        /// Size of one record.
        record: usize,
    },
}

/// Result type for BSP construction.
pub type BspResult<T> = Result<T, BspError>;
