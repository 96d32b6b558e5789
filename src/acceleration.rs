/*

    Bounding Volume Hierarchy over an opaque primitive type.

    The BVH owns the flat node array and the primitives, which are
    moved in and reordered during build so that every leaf refers
    to a contiguous range. Queries go through traverser::Traverser.

    @author: bartu
    @date: 9 Nov, 2025
*/

use crate::bbox::{BBox, BoxConverter};
use crate::builder::{self, BuildConfig};
use crate::node::Node;
use crate::prelude::*;


#[derive(Debug, Clone, Default, PartialEq)]
pub struct BVHStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub max_depth: usize,
    pub max_leaf_size: usize,
    pub empty_leaf_count: usize,
}

impl BVHStats {
    pub fn internal_count(&self) -> usize {
        self.node_count - self.leaf_count
    }
}

#[derive(Debug, Clone)]
pub struct BVH<P> {
    nodes: Vec<Node>,
    primitives: Vec<P>,
}

impl<P> Default for BVH<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> BVH<P> {

    /// An unbuilt BVH, every query against it misses
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            primitives: Vec::new(),
        }
    }

    /// Convenience for `BVH::new()` followed by `build_with`
    pub fn from_primitives<C>(primitives: Vec<P>, converter: &C, config: &BuildConfig) -> Self
    where
        C: BoxConverter<P> + ?Sized,
    {
        let mut bvh = Self::new();
        bvh.build_with(primitives, converter, config);
        bvh
    }

    /// Build with the default configuration. Any previous tree is discarded.
    pub fn build<C>(&mut self, primitives: Vec<P>, converter: &C)
    where
        C: BoxConverter<P> + ?Sized,
    {
        self.build_with(primitives, converter, &BuildConfig::default());
    }

    pub fn build_with<C>(&mut self, primitives: Vec<P>, converter: &C, config: &BuildConfig)
    where
        C: BoxConverter<P> + ?Sized,
    {
        let mut primitives = primitives;
        let (nodes, order) = builder::build_nodes(&primitives, converter, config);
        apply_order(&mut primitives, &order);

        self.nodes = nodes;
        self.primitives = primitives;
        debug!("BVH has {} nodes and {} leaves", self.node_count(), self.leaf_count());
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn internal_count(&self) -> usize {
        self.node_count() - self.leaf_count()
    }

    /// True before the first build
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Primitives in leaf order
    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    /// Bounding box of all primitives, empty if nothing was built
    pub fn bounds(&self) -> BBox {
        self.nodes.first().map(|root| *root.bbox()).unwrap_or(BBox::EMPTY)
    }

    /// Number of edges on the longest root to leaf path
    pub fn depth(&self) -> usize {
        self.stats().max_depth
    }

    pub fn stats(&self) -> BVHStats {
        let mut stats = BVHStats { node_count: self.nodes.len(), ..Default::default() };
        if self.nodes.is_empty() {
            return stats;
        }

        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            stats.max_depth = stats.max_depth.max(depth);
            match self.nodes[index] {
                Node::Internal { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
                Node::Leaf { count, .. } => {
                    stats.leaf_count += 1;
                    stats.max_leaf_size = stats.max_leaf_size.max(count);
                    if count == 0 {
                        stats.empty_leaf_count += 1;
                    }
                }
            }
        }
        stats
    }
}

/// Reorder in place so that `primitives[i]` becomes the old `primitives[order[i]]`.
/// Walks each permutation cycle once, no clones and no extra allocation for P.
fn apply_order<P>(primitives: &mut [P], order: &[usize]) {
    debug_assert_eq!(primitives.len(), order.len());
    let mut placed = vec![false; order.len()];
    for start in 0..order.len() {
        if placed[start] {
            continue;
        }
        let mut current = start;
        loop {
            placed[current] = true;
            let source = order[current];
            if source == start {
                break;
            }
            primitives.swap(current, source);
            current = source;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Vec<Vector3> {
        let mut points = Vec::with_capacity(n * n * n);
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    points.push(Vector3::new(x as Float, y as Float, z as Float));
                }
            }
        }
        points
    }

    fn to_box(p: &Vector3) -> BBox {
        BBox::new(*p - Vector3::splat(0.25), *p + Vector3::splat(0.25))
    }

    #[test]
    fn test_new_bvh_is_empty() {
        let bvh: BVH<Vector3> = BVH::new();
        assert!(bvh.is_empty());
        assert_eq!(bvh.node_count(), 0);
        assert_eq!(bvh.leaf_count(), 0);
        assert!(bvh.bounds().is_empty());
    }

    #[test]
    fn test_zero_primitives() {
        let mut bvh = BVH::new();
        bvh.build(Vec::<Vector3>::new(), &to_box);
        assert_eq!(bvh.node_count(), 1);
        assert_eq!(bvh.leaf_count(), 1);
        assert_eq!(bvh.stats().empty_leaf_count, 1);
    }

    #[test]
    fn test_counts_add_up() {
        let points = grid(6);
        let total = points.len();
        let mut bvh = BVH::new();
        bvh.build(points, &to_box);

        assert_eq!(bvh.leaf_count() + bvh.internal_count(), bvh.node_count());
        let in_leaves: usize = bvh.nodes().iter().map(|n| n.primitive_range().len()).sum();
        assert_eq!(in_leaves, total);
        assert_eq!(bvh.primitives().len(), total);

        let stats = bvh.stats();
        assert_eq!(stats.leaf_count, bvh.leaf_count());
        assert_eq!(stats.internal_count(), bvh.internal_count());
        assert!(stats.max_leaf_size <= 4);
        assert!(bvh.depth() >= 5);
    }

    #[test]
    fn test_leaf_boxes_enclose_their_primitives() {
        let mut bvh = BVH::new();
        bvh.build(grid(5), &to_box);
        for node in bvh.nodes() {
            for p in &bvh.primitives()[node.primitive_range()] {
                assert_eq!(node.bbox().union(&to_box(p)), *node.bbox());
            }
        }
        assert_eq!(bvh.bounds(), BBox::new(Vector3::splat(-0.25), Vector3::splat(4.25)));
    }

    #[test]
    fn test_rebuild_replaces_tree() {
        let mut bvh = BVH::new();
        bvh.build(grid(4), &to_box);
        assert_eq!(bvh.primitives().len(), 64);
        bvh.build(vec![Vector3::ZERO], &to_box);
        assert_eq!(bvh.node_count(), 1);
        assert_eq!(bvh.primitives(), &[Vector3::ZERO]);
    }

    #[test]
    fn test_apply_order() {
        let mut values = vec!['a', 'b', 'c', 'd', 'e'];
        apply_order(&mut values, &[3, 0, 4, 1, 2]);
        assert_eq!(values, vec!['d', 'a', 'e', 'b', 'c']);

        let mut values = vec![10, 20, 30];
        apply_order(&mut values, &[0, 1, 2]);
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn test_primitives_are_moved_not_cloned() {
        // String is not Copy, build must still work by moving values around
        let names: Vec<String> = (0..20).map(|i| format!("p{i}")).collect();
        let conv = |s: &String| {
            let x: Float = s[1..].parse().unwrap_or(0.0);
            BBox::from_point(Vector3::new(x, 0.0, 0.0))
        };
        let bvh = BVH::from_primitives(names, &conv, &BuildConfig::default());
        let mut seen: Vec<&String> = bvh.primitives().iter().collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 20);
    }
}
