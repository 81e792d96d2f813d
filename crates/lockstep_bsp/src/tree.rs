//! # BSP Tree
//!
//! A validated node array plus its subsectors.
//!
//! The root is always the last node: the offline builder emits children
//! before parents. A level with no nodes is a single implicit region,
//! subsector 0.
//!
//! Validation happens once, in [`BspTree::new`]. After that every query is
//! infallible and every index it touches is in range.

use bytemuck::pod_read_unaligned;
use lockstep_math::Fixed;

use crate::error::{BspError, BspResult};
use crate::node::{Node, Subsector, NF_SUBSECTOR};

/// Node visit state during cycle detection.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    OnPath,
    Done,
}

/// Immutable partition of one level.
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<Node>,
    subsectors: Vec<Subsector>,
}

impl BspTree {
    /// Builds a tree, rejecting corrupt data.
    ///
    /// # Errors
    ///
    /// Returns a [`BspError`] if there are no subsectors, a child index is
    /// out of range, or a node can be reached from itself.
    pub fn new(nodes: Vec<Node>, subsectors: Vec<Subsector>) -> BspResult<Self> {
        validate(&nodes, &subsectors)?;
        tracing::debug!(
            nodes = nodes.len(),
            subsectors = subsectors.len(),
            "bsp tree loaded"
        );
        Ok(Self { nodes, subsectors })
    }

    /// Decodes little-endian node and subsector lumps.
    ///
    /// # Errors
    ///
    /// Returns [`BspError::LumpSize`] if a lump is not a whole number of
    /// records, or any validation error from [`BspTree::new`].
    pub fn from_lumps(node_bytes: &[u8], subsector_bytes: &[u8]) -> BspResult<Self> {
        let nodes = decode::<Node>("NODES", node_bytes)?
            .into_iter()
            .map(Node::into_native)
            .collect();
        let subsectors = decode::<Subsector>("SSECTORS", subsector_bytes)?
            .into_iter()
            .map(Subsector::into_native)
            .collect();
        Self::new(nodes, subsectors)
    }

    /// Number of partition nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of subsectors.
    #[inline]
    #[must_use]
    pub fn subsector_count(&self) -> usize {
        self.subsectors.len()
    }

    /// All nodes, root last.
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All subsectors.
    #[inline]
    #[must_use]
    pub fn subsectors(&self) -> &[Subsector] {
        &self.subsectors
    }

    /// Looks up a subsector by index.
    #[inline]
    #[must_use]
    pub fn subsector(&self, index: u16) -> Option<&Subsector> {
        self.subsectors.get(usize::from(index))
    }

    /// Index of the subsector containing `(x, y)`.
    #[must_use]
    pub fn locate_leaf(&self, x: Fixed, y: Fixed) -> u16 {
        let Some(root) = self.root() else {
            return 0;
        };

        let mut index = root;
        loop {
            let node = &self.nodes[usize::from(index)];
            let child = node.child(node.point_side(x, y));
            if let Some(leaf) = Node::as_leaf(child) {
                return leaf;
            }
            index = child;
        }
    }

    /// The subsector containing `(x, y)`.
    #[must_use]
    pub fn point_in_subsector(&self, x: Fixed, y: Fixed) -> &Subsector {
        &self.subsectors[usize::from(self.locate_leaf(x, y))]
    }

    /// Visits every reachable subsector, nearest to `(x, y)` first.
    pub fn walk_front_to_back(&self, x: Fixed, y: Fixed, visit: impl FnMut(u16)) {
        let mut stack = Vec::with_capacity(64);
        self.walk_front_to_back_with(x, y, &mut stack, visit);
    }

    /// [`BspTree::walk_front_to_back`] with a caller-provided stack, so a
    /// frame can reuse scratch storage.
    pub fn walk_front_to_back_with(
        &self,
        x: Fixed,
        y: Fixed,
        stack: &mut Vec<u16>,
        mut visit: impl FnMut(u16),
    ) {
        stack.clear();
        let Some(root) = self.root() else {
            visit(0);
            return;
        };

        stack.push(root);
        while let Some(child) = stack.pop() {
            if let Some(leaf) = Node::as_leaf(child) {
                visit(leaf);
                continue;
            }
            let node = &self.nodes[usize::from(child)];
            let near = node.point_side(x, y);
            // Far side goes on first so the near side pops first.
            stack.push(node.child(near.opposite()));
            stack.push(node.child(near));
        }
    }

    /// Longest root-to-leaf path, counted in nodes.
    #[must_use]
    pub fn depth(&self) -> usize {
        let Some(root) = self.root() else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1_usize)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for child in self.nodes[usize::from(index)].children {
                if Node::as_leaf(child).is_none() {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    fn root(&self) -> Option<u16> {
        // Validation caps the node count below NF_SUBSECTOR.
        self.nodes.len().checked_sub(1).map(|last| last as u16)
    }
}

fn decode<T: bytemuck::Pod>(lump: &'static str, bytes: &[u8]) -> BspResult<Vec<T>> {
    let record = std::mem::size_of::<T>();
    if bytes.len() % record != 0 {
        return Err(BspError::LumpSize {
            lump,
            len: bytes.len(),
            record,
        });
    }
    Ok(bytes.chunks_exact(record).map(pod_read_unaligned).collect())
}

fn validate(nodes: &[Node], subsectors: &[Subsector]) -> BspResult<()> {
    if subsectors.is_empty() {
        return Err(BspError::NoSubsectors);
    }
    if nodes.len() > usize::from(NF_SUBSECTOR) {
        return Err(BspError::TooManyNodes(nodes.len()));
    }

    for (index, node) in nodes.iter().enumerate() {
        for child in node.children {
            match Node::as_leaf(child) {
                Some(leaf) if usize::from(leaf) >= subsectors.len() => {
                    return Err(BspError::LeafOutOfRange {
                        node: index,
                        leaf,
                        count: subsectors.len(),
                    });
                }
                None if usize::from(child) >= nodes.len() => {
                    return Err(BspError::NodeOutOfRange { node: index, child });
                }
                _ => {}
            }
        }
    }

    let Some(root) = nodes.len().checked_sub(1) else {
        return Ok(());
    };

    // Iterative three-colour DFS from the root; a child already on the
    // current path closes a cycle.
    let mut marks = vec![Mark::Unseen; nodes.len()];
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    marks[root] = Mark::OnPath;

    while let Some(top) = stack.last_mut() {
        let (index, next) = *top;
        if next == 2 {
            marks[index] = Mark::Done;
            stack.pop();
            continue;
        }
        top.1 += 1;

        let child = nodes[index].children[next];
        if Node::as_leaf(child).is_some() {
            continue;
        }
        let child_index = usize::from(child);
        match marks[child_index] {
            Mark::OnPath => return Err(BspError::Cycle { node: child }),
            Mark::Done => {}
            Mark::Unseen => {
                marks[child_index] = Mark::OnPath;
                stack.push((child_index, 0));
            }
        }
    }

    Ok(())
}
