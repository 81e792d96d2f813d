//! # Partition Records
//!
//! Raw node and subsector records plus the point-side test.
//!
//! The side test is the hottest function in the renderer: it runs once per
//! node on every descent, several descents per frame. It must stay exactly
//! as written. Points on the line go to the back side, and level geometry
//! is built assuming that.

use bytemuck::{Pod, Zeroable};
use lockstep_math::Fixed;

/// Child flag marking a subsector index instead of a node index.
pub const NF_SUBSECTOR: u16 = 0x8000;

/// Which side of a partition line a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Right of the line direction. Child slot 0.
    Front = 0,
    /// Left of the line direction, or on it. Child slot 1.
    Back = 1,
}

impl Side {
    /// Child slot for this side.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Side for a boolean "is back" result.
    #[inline]
    #[must_use]
    pub const fn from_back(back: bool) -> Self {
        if back {
            Self::Back
        } else {
            Self::Front
        }
    }

    /// The other side.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// One partition line and its two children.
///
/// Layout matches the node lump record: four 16.16 values and two child
/// codes, little-endian, 20 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Node {
    /// Line origin x.
    pub x: Fixed,
    /// Line origin y.
    pub y: Fixed,
    /// Line direction x.
    pub dx: Fixed,
    /// Line direction y.
    pub dy: Fixed,
    /// Front and back child codes. `NF_SUBSECTOR` marks a leaf.
    pub children: [u16; 2],
}

impl Node {
    /// Size of one lump record.
    pub const RECORD_SIZE: usize = std::mem::size_of::<Self>();

    /// Creates a node from a line and its front/back child codes.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed, dx: Fixed, dy: Fixed, front: u16, back: u16) -> Self {
        Self {
            x,
            y,
            dx,
            dy,
            children: [front, back],
        }
    }

    /// Child code for a subsector.
    #[inline]
    #[must_use]
    pub const fn leaf(subsector: u16) -> u16 {
        subsector | NF_SUBSECTOR
    }

    /// Returns the subsector index if `child` is a leaf code.
    #[inline]
    #[must_use]
    pub const fn as_leaf(child: u16) -> Option<u16> {
        if child & NF_SUBSECTOR != 0 {
            Some(child & !NF_SUBSECTOR)
        } else {
            None
        }
    }

    /// Child code on the given side.
    #[inline]
    #[must_use]
    pub const fn child(&self, side: Side) -> u16 {
        self.children[side.index()]
    }

    /// Classifies `(x, y)` against this node's line.
    #[inline]
    #[must_use]
    pub fn point_side(&self, x: Fixed, y: Fixed) -> Side {
        classify_point_side(x, y, self)
    }

    pub(crate) fn into_native(self) -> Self {
        let fix = |v: Fixed| Fixed::from_raw(i32::from_le(v.raw()));
        Self {
            x: fix(self.x),
            y: fix(self.y),
            dx: fix(self.dx),
            dy: fix(self.dy),
            children: [u16::from_le(self.children[0]), u16::from_le(self.children[1])],
        }
    }
}

/// A leaf region of the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Subsector {
    /// Sector this region belongs to.
    pub sector: u16,
    /// Number of line segments bounding the region.
    pub num_lines: u16,
    /// Index of the first bounding segment.
    pub first_line: u16,
}

impl Subsector {
    /// Size of one lump record.
    pub const RECORD_SIZE: usize = std::mem::size_of::<Self>();

    pub(crate) fn into_native(self) -> Self {
        Self {
            sector: u16::from_le(self.sector),
            num_lines: u16::from_le(self.num_lines),
            first_line: u16::from_le(self.first_line),
        }
    }
}

/// Which side of `node`'s line the point `(x, y)` is on.
///
/// Axis-aligned lines are decided by comparison alone. Otherwise both cross
/// product terms are de-fractionalized before multiplying so they fit an
/// `i32`; when the terms are equal the point is on the back side.
#[must_use]
pub fn classify_point_side(x: Fixed, y: Fixed, node: &Node) -> Side {
    if node.dx.is_zero() {
        if x <= node.x {
            return Side::from_back(node.dy.is_positive());
        }
        return Side::from_back(node.dy.is_negative());
    }
    if node.dy.is_zero() {
        if y <= node.y {
            return Side::from_back(node.dx.is_negative());
        }
        return Side::from_back(node.dx.is_positive());
    }

    let dx = x - node.x;
    let dy = y - node.y;

    let left = node.dy.to_int().wrapping_mul(dx.to_int());
    let right = dy.to_int().wrapping_mul(node.dx.to_int());

    if right < left {
        Side::Front
    } else {
        Side::Back
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(v: i32) -> Fixed {
        Fixed::from_int(v)
    }

    fn line(x: i32, y: i32, dx: i32, dy: i32) -> Node {
        Node::new(f(x), f(y), f(dx), f(dy), 0, 0)
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(Node::RECORD_SIZE, 20);
        assert_eq!(Subsector::RECORD_SIZE, 6);
    }

    #[test]
    fn test_vertical_line_north() {
        let node = line(0, 0, 0, 64);
        assert_eq!(classify_point_side(f(-8), f(3), &node), Side::Back);
        assert_eq!(classify_point_side(f(0), f(3), &node), Side::Back);
        assert_eq!(classify_point_side(f(8), f(3), &node), Side::Front);
    }

    #[test]
    fn test_vertical_line_south() {
        let node = line(0, 0, 0, -64);
        assert_eq!(classify_point_side(f(-8), f(3), &node), Side::Front);
        assert_eq!(classify_point_side(f(0), f(3), &node), Side::Front);
        assert_eq!(classify_point_side(f(8), f(3), &node), Side::Back);
    }

    #[test]
    fn test_horizontal_line() {
        let east = line(0, 0, 64, 0);
        assert_eq!(classify_point_side(f(5), f(-1), &east), Side::Front);
        assert_eq!(classify_point_side(f(5), f(0), &east), Side::Front);
        assert_eq!(classify_point_side(f(5), f(1), &east), Side::Back);

        let west = line(0, 0, -64, 0);
        assert_eq!(classify_point_side(f(5), f(-1), &west), Side::Back);
        assert_eq!(classify_point_side(f(5), f(1), &west), Side::Front);
    }

    #[test]
    fn test_diagonal_line() {
        let node = line(0, 0, 1, 1);
        assert_eq!(classify_point_side(f(5), f(0), &node), Side::Front);
        assert_eq!(classify_point_side(f(0), f(5), &node), Side::Back);
    }

    #[test]
    fn test_point_on_line_is_back() {
        let node = line(16, 16, 32, 64);
        // (16 + 32, 16 + 64) lies exactly on the line.
        assert_eq!(classify_point_side(f(48), f(80), &node), Side::Back);
        assert_eq!(classify_point_side(f(16), f(16), &node), Side::Back);
    }

    #[test]
    fn test_fraction_is_ignored_in_general_case() {
        let node = line(0, 0, 1, 1);
        // 0.5 right of the line truncates onto it.
        let x = Fixed::from_raw(Fixed::ONE.raw() / 2);
        assert_eq!(classify_point_side(x, Fixed::ZERO, &node), Side::Back);
    }

    #[test]
    fn test_leaf_codes() {
        assert_eq!(Node::leaf(3), 0x8003);
        assert_eq!(Node::as_leaf(0x8003), Some(3));
        assert_eq!(Node::as_leaf(3), None);
        assert_eq!(Side::Front.opposite(), Side::Back);
    }
}
