/*

    BVH construction.

    Primitives are reduced to (index, bbox, centroid) items, the items
    are partitioned in place and every partition step emits one node
    into a flat array in depth-first order. The build uses an explicit
    work stack so adversarial inputs (e.g. collinear centroids) cannot
    overflow the call stack.

    Large subranges can optionally be built with rayon fork-join,
    see BuildConfig::parallel_threshold. The resulting node array is
    identical to the sequential one.

    @date: 14 Nov, 2025
    @author: bartu
*/

use std::cmp::Ordering;

use crate::bbox::{BBox, BoxConverter};
use crate::node::Node;
use crate::prelude::*;

const SAH_BINS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Split at the median centroid along the longest axis
    #[default]
    Median,
    /// Binned surface area heuristic
    Sah,
}

#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct BuildConfig {
    /// Ranges with at most this many primitives become leaves
    #[default = 4]
    pub leaf_size: usize,

    #[default = 64]
    pub max_depth: usize,

    pub split_method: SplitMethod,

    /// Subranges at least this large are built in parallel, 0 disables it
    #[default = 0]
    pub parallel_threshold: usize,
}

#[derive(Debug, Clone, Copy)]
struct BuildItem {
    index: usize, // position in the caller's primitive collection
    bbox: BBox,
    centroid: Vector3,
}

enum Split {
    Leaf(BBox),
    Internal(BBox, usize), // bbox, number of items going left
}

struct Task {
    start: usize,
    end: usize,
    depth: usize,
    parent: Option<usize>, // set for right children, whose index the parent has to learn
}

/// Build the node array for the given primitives.
///
/// Returns the nodes and the order in which the primitives have to be
/// stored so that leaf ranges index into them, i.e. `order[i]` is the
/// original index of the primitive that ends up at position i.
pub(crate) fn build_nodes<P, C>(primitives: &[P], converter: &C, config: &BuildConfig) -> (Vec<Node>, Vec<usize>)
where
    C: BoxConverter<P> + ?Sized,
{
    let span = tracing::span!(tracing::Level::DEBUG, "bvh_build", primitives = primitives.len());
    let _enter = span.enter();

    let mut items: Vec<BuildItem> = primitives
        .iter()
        .enumerate()
        .map(|(index, primitive)| {
            let bbox = converter.convert(primitive);
            BuildItem { index, bbox, centroid: bbox.centroid() }
        })
        .collect();

    let nodes = build_subtree(&mut items, 0, 0, config);
    let order = items.iter().map(|item| item.index).collect();

    debug!("Built {} nodes over {} primitives ({:?} split)", nodes.len(), primitives.len(), config.split_method);
    (nodes, order)
}

fn build_subtree(items: &mut [BuildItem], first: usize, depth: usize, config: &BuildConfig) -> Vec<Node> {

    let threshold = config.parallel_threshold;
    if threshold == 0 || items.len() < threshold {
        return build_sequential(items, first, depth, config);
    }

    match split_range(items, depth, config) {
        Split::Leaf(bbox) => vec![Node::leaf(bbox, first, items.len())],
        Split::Internal(bbox, mid) => {
            let (left_items, right_items) = items.split_at_mut(mid);

            // --- Rayon fork-join ---
            let (left, right) = rayon::join(
                || build_subtree(left_items, first, depth + 1, config),
                || build_subtree(right_items, first + mid, depth + 1, config),
            );
            // -----------------------

            // Splice as [parent, left subtree..., right subtree...], same layout as sequential
            let right_index = 1 + left.len();
            let mut nodes = Vec::with_capacity(right_index + right.len());
            nodes.push(Node::internal(bbox, 0, right_index));
            nodes.extend(left.into_iter().map(|mut node| { node.offset(1); node }));
            nodes.extend(right.into_iter().map(|mut node| { node.offset(right_index); node }));
            nodes
        }
    }
}

/// Depth-first build of a subrange, `first` is the global position of items[0]
fn build_sequential(items: &mut [BuildItem], first: usize, depth: usize, config: &BuildConfig) -> Vec<Node> {

    let mut nodes: Vec<Node> = Vec::with_capacity(2 * items.len() / config.leaf_size.max(1) + 1);
    let mut stack = vec![Task { start: 0, end: items.len(), depth, parent: None }];

    while let Some(task) = stack.pop() {
        let index = nodes.len();
        if let Some(parent) = task.parent {
            nodes[parent].set_right(index);
        }

        let range = &mut items[task.start..task.end];
        match split_range(range, task.depth, config) {
            Split::Leaf(bbox) => {
                nodes.push(Node::leaf(bbox, first + task.start, task.end - task.start));
            }
            Split::Internal(bbox, mid) => {
                nodes.push(Node::internal(bbox, index, 0));
                // Right first so that left is popped next and lands at index + 1
                stack.push(Task { start: task.start + mid, end: task.end, depth: task.depth + 1, parent: Some(index) });
                stack.push(Task { start: task.start, end: task.start + mid, depth: task.depth + 1, parent: None });
            }
        }
    }

    nodes
}

/// Decide whether a range becomes a leaf, otherwise partition it in place
fn split_range(items: &mut [BuildItem], depth: usize, config: &BuildConfig) -> Split {

    let mut bbox = BBox::EMPTY;
    let mut centroid_bounds = BBox::EMPTY;
    for item in items.iter() {
        bbox.expand(&item.bbox);
        centroid_bounds.expand_point(item.centroid);
    }

    if items.len() <= config.leaf_size.max(1) || depth >= config.max_depth {
        return Split::Leaf(bbox);
    }

    let mut axis = bbox.longest_axis();
    if axis_extent(&centroid_bounds, axis) <= 0.0 {
        // Boxes spread on this axis but their centers do not
        axis = centroid_bounds.longest_axis();
        if axis_extent(&centroid_bounds, axis) <= 0.0 {
            trace!("All {} centroids coincide, forcing a leaf at depth {}", items.len(), depth);
            return Split::Leaf(bbox);
        }
    }

    let mid = match config.split_method {
        SplitMethod::Median => partition_median(items, axis),
        SplitMethod::Sah => partition_sah(items, axis, &centroid_bounds)
            .unwrap_or_else(|| partition_median(items, axis)),
    };
    Split::Internal(bbox, mid)
}

fn axis_extent(bbox: &BBox, axis: usize) -> Float {
    axis_value(&bbox.extent(), axis)
}

/// Centroid order along an axis, ties broken by original index
fn compare_on_axis(a: &BuildItem, b: &BuildItem, axis: usize) -> Ordering {
    axis_value(&a.centroid, axis)
        .total_cmp(&axis_value(&b.centroid, axis))
        .then(a.index.cmp(&b.index))
}

/// O(n) selection, everything left of the returned position orders before the rest
fn partition_median(items: &mut [BuildItem], axis: usize) -> usize {
    debug_assert!(items.len() >= 2);
    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |a, b| compare_on_axis(a, b, axis));
    mid
}

/// Binned SAH over centroid bounds, None if no bin boundary separates the items
fn partition_sah(items: &mut [BuildItem], axis: usize, centroid_bounds: &BBox) -> Option<usize> {

    let cmin = axis_value(&centroid_bounds.min, axis);
    let scale = SAH_BINS as Float / axis_extent(centroid_bounds, axis);
    let bin_of = |item: &BuildItem| {
        let bin = ((axis_value(&item.centroid, axis) - cmin) * scale) as usize;
        bin.min(SAH_BINS - 1)
    };

    let mut counts = [0usize; SAH_BINS];
    let mut bounds = [BBox::EMPTY; SAH_BINS];
    for item in items.iter() {
        let bin = bin_of(item);
        counts[bin] += 1;
        bounds[bin].expand(&item.bbox);
    }

    // Sweep from the right, right_*[i] describes bins i..SAH_BINS
    let mut right_area = [0.0 as Float; SAH_BINS];
    let mut right_count = [0usize; SAH_BINS];
    let mut acc = BBox::EMPTY;
    let mut n = 0;
    for bin in (1..SAH_BINS).rev() {
        acc.expand(&bounds[bin]);
        n += counts[bin];
        right_area[bin] = acc.surface_area();
        right_count[bin] = n;
    }

    let mut best: Option<(Float, usize)> = None;
    let mut acc = BBox::EMPTY;
    let mut n = 0;
    for split in 1..SAH_BINS {
        acc.expand(&bounds[split - 1]);
        n += counts[split - 1];
        if n == 0 || right_count[split] == 0 {
            continue;
        }
        let cost = n as Float * acc.surface_area() + right_count[split] as Float * right_area[split];
        if best.is_none_or(|(best_cost, _)| cost < best_cost) {
            best = Some((cost, split));
        }
    }

    // Sides are decided by bin alone, no centroid comparison so no ties to break.
    // Order within a side follows the swaps, deterministic for identical input.
    let (_, split) = best?;
    let mid = partition_in_place(items, |item| bin_of(item) < split);
    if mid == 0 || mid == items.len() { None } else { Some(mid) }
}

/// Two-way partition, returns the number of items satisfying `pred`
fn partition_in_place<F>(items: &mut [BuildItem], pred: F) -> usize
where
    F: Fn(&BuildItem) -> bool,
{
    let mut mid = 0;
    for i in 0..items.len() {
        if pred(&items[i]) {
            items.swap(i, mid);
            mid += 1;
        }
    }
    mid
}
