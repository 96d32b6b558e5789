/*

    Flat BVH node. Nodes live in a single Vec and refer to each other
    by index: an internal node's left child is always stored right
    after it, the right child index is stored explicitly.

    @date: 14 Nov, 2025
    @author: bartu
*/

use crate::bbox::BBox;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    Internal {
        bbox: BBox,
        left: usize,
        right: usize,
    },
    Leaf {
        bbox: BBox,
        start: usize, // first primitive in the reordered primitive array
        count: usize,
    },
}

impl Node {

    pub fn leaf(bbox: BBox, start: usize, count: usize) -> Self {
        Node::Leaf { bbox, start, count }
    }

    /// Right index is usually patched once the right subtree is emitted
    pub fn internal(bbox: BBox, index: usize, right: usize) -> Self {
        Node::Internal { bbox, left: index + 1, right }
    }

    #[inline]
    pub fn bbox(&self) -> &BBox {
        match self {
            Node::Internal { bbox, .. } => bbox,
            Node::Leaf { bbox, .. } => bbox,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Primitive range of a leaf, empty for internal nodes
    #[inline]
    pub fn primitive_range(&self) -> std::ops::Range<usize> {
        match *self {
            Node::Leaf { start, count, .. } => start..start + count,
            Node::Internal { .. } => 0..0,
        }
    }

    pub(crate) fn set_right(&mut self, child: usize) {
        if let Node::Internal { right, .. } = self {
            *right = child;
        }
    }

    /// Shift every index stored in this node, used when splicing
    /// a separately built subtree into a larger node array.
    pub(crate) fn offset(&mut self, node_offset: usize) {
        if let Node::Internal { left, right, .. } = self {
            *left += node_offset;
            *right += node_offset;
        }
    }
}
