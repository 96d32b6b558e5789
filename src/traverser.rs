/*

    Ray queries against a built BVH.

    Traversal follows Slides 03_acceleration_structures p.64 but
    is iterative: an explicit stack of (node, entry distance) pairs,
    nearer child visited first, and subtrees whose boxes start past
    the best hit so far are skipped.

    @author: bartu
    @date: 15 Nov, 2025
*/

use crate::acceleration::BVH;
use crate::node::Node;
use crate::ray::{Intersection, Ray};
use crate::prelude::*;

const STACK_CAPACITY: usize = 64;

/// Intersects a ray with a single primitive. Any result that is not
/// a hit (e.g. a negative discriminant) is treated as a miss.
pub trait Intersector<P> {
    fn intersect<'a>(&self, primitive: &'a P, ray: &Ray) -> Intersection<'a, P>;
}

impl<P, F> Intersector<P> for F
where
    F: for<'a> Fn(&'a P, &Ray) -> Intersection<'a, P>,
{
    fn intersect<'a>(&self, primitive: &'a P, ray: &Ray) -> Intersection<'a, P> {
        self(primitive, ray)
    }
}

/// Pins a closure to the higher-ranked signature the blanket impl needs.
///
/// Closures passed straight to `Traverser::new` get their lifetimes inferred
/// for one call site only and do not implement `Intersector`, e.g.
/// `Traverser::new(&bvh, intersector_fn(|s: &Sphere, r: &Ray| ...))`.
pub fn intersector_fn<P, F>(f: F) -> F
where
    F: for<'a> Fn(&'a P, &Ray) -> Intersection<'a, P>,
{
    f
}

/// Non-owning query view over a BVH. Cheap to create, one per thread is fine.
pub struct Traverser<'b, P, I> {
    bvh: &'b BVH<P>,
    intersector: I,
}

impl<'b, P, I> Traverser<'b, P, I>
where
    I: Intersector<P>,
{
    pub fn new(bvh: &'b BVH<P>, intersector: I) -> Self {
        Self { bvh, intersector }
    }

    pub fn bvh(&self) -> &'b BVH<P> {
        self.bvh
    }

    /// Closest hit along the ray, or in `any_hit` mode the first hit found.
    ///
    /// Node indices are trusted to be valid, they are produced by the builder only.
    pub fn traverse(&self, ray: &Ray, any_hit: bool) -> Intersection<'b, P> {
        let nodes = self.bvh.nodes();
        let primitives = self.bvh.primitives();
        let mut best = Intersection::none();

        let Some(root) = nodes.first() else {
            return best;
        };
        let Some(root_range) = root.bbox().intersect(ray) else {
            return best;
        };

        let mut stack: Vec<(usize, Float)> = Vec::with_capacity(STACK_CAPACITY);
        stack.push((0, root_range.min));

        while let Some((index, entry)) = stack.pop() {
            // Best may have improved since this node was pushed
            if entry > best.t {
                continue;
            }

            match nodes[index] {
                Node::Leaf { start, count, .. } => {
                    for primitive in &primitives[start..start + count] {
                        let isect = self.intersector.intersect(primitive, ray);
                        if isect.is_hit() && isect.t >= 0.0 && isect.t < best.t {
                            best = isect;
                            if any_hit {
                                return best;
                            }
                        }
                    }
                }
                Node::Internal { left, right, .. } => {
                    let left_hit = nodes[left].bbox().intersect(ray).map(|r| r.min).filter(|&t| t <= best.t);
                    let right_hit = nodes[right].bbox().intersect(ray).map(|r| r.min).filter(|&t| t <= best.t);

                    match (left_hit, right_hit) {
                        (Some(tl), Some(tr)) => {
                            // Farther one goes first so the nearer is popped next
                            if tl <= tr {
                                stack.push((right, tr));
                                stack.push((left, tl));
                            } else {
                                stack.push((left, tl));
                                stack.push((right, tr));
                            }
                        }
                        (Some(tl), None) => stack.push((left, tl)),
                        (None, Some(tr)) => stack.push((right, tr)),
                        (None, None) => {}
                    }
                }
            }
        }

        best
    }
}


/// Iterate over all primitives to find the closest hit.
/// Same acceptance rule as the traverser, used to validate it.
pub fn linear_scan<'a, P, I>(primitives: &'a [P], intersector: &I, ray: &Ray, any_hit: bool) -> Intersection<'a, P>
where
    I: Intersector<P> + ?Sized,
{
    let mut best = Intersection::none();
    for primitive in primitives.iter() {
        let isect = intersector.intersect(primitive, ray);
        if isect.is_hit() && isect.t >= 0.0 && isect.t < best.t {
            if any_hit {
                return isect;
            }
            best = isect;
        }
    }
    best
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::builder::BuildConfig;

    /// Axis aligned unit cubes centered at given points, hit at the entry face
    struct CubeIntersector;

    fn cube_box(c: &Vector3) -> BBox {
        BBox::new(*c - Vector3::splat(0.5), *c + Vector3::splat(0.5))
    }

    impl Intersector<Vector3> for CubeIntersector {
        fn intersect<'a>(&self, center: &'a Vector3, ray: &Ray) -> Intersection<'a, Vector3> {
            match cube_box(center).intersect(ray) {
                Some(range) => Intersection::new(range.min, center, Vector3::ZERO),
                None => Intersection::none(),
            }
        }
    }

    fn row_of_cubes(n: usize) -> BVH<Vector3> {
        let centers: Vec<Vector3> = (0..n).map(|i| Vector3::new(2.0 * i as Float, 0.0, 0.0)).collect();
        let config = BuildConfig { leaf_size: 1, ..Default::default() };
        BVH::from_primitives(centers, &cube_box, &config)
    }

    #[test]
    fn test_unbuilt_bvh_misses() {
        let bvh: BVH<Vector3> = BVH::new();
        let traverser = Traverser::new(&bvh, CubeIntersector);
        let ray = Ray::new(Vector3::ZERO, Vector3::X);
        assert!(!traverser.traverse(&ray, false).is_hit());
    }

    #[test]
    fn test_nearest_hit_along_row() {
        let bvh = row_of_cubes(32);
        let traverser = Traverser::new(&bvh, CubeIntersector);

        // From the left, first cube is at x = 0
        let ray = Ray::new(Vector3::new(-10.0, 0.0, 0.0), Vector3::X);
        let hit = traverser.traverse(&ray, false);
        assert!(hit.is_hit());
        assert_eq!(*hit.object.unwrap(), Vector3::ZERO);
        assert!(approx_eq(hit.t, 9.5, 1e-12));

        // From the right, last cube is at x = 62
        let ray = Ray::new(Vector3::new(100.0, 0.0, 0.0), -Vector3::X);
        let hit = traverser.traverse(&ray, false);
        assert_eq!(*hit.object.unwrap(), Vector3::new(62.0, 0.0, 0.0));
        assert!(approx_eq(hit.t, 37.5, 1e-12));
    }

    #[test]
    fn test_any_hit_agrees_on_hit_or_miss() {
        let bvh = row_of_cubes(32);
        let traverser = Traverser::new(&bvh, CubeIntersector);
        let hitting = Ray::new(Vector3::new(-10.0, 0.1, 0.0), Vector3::X);
        let missing = Ray::new(Vector3::new(-10.0, 3.0, 0.0), Vector3::X);
        assert!(traverser.traverse(&hitting, true).is_hit());
        assert!(!traverser.traverse(&missing, true).is_hit());
        assert!(!traverser.traverse(&missing, false).is_hit());
    }

    #[test]
    fn test_hits_behind_origin_are_rejected() {
        let bvh = row_of_cubes(4);
        // Intersector that always reports a hit behind the origin
        fn behind<'a>(c: &'a Vector3, _ray: &Ray) -> Intersection<'a, Vector3> {
            Intersection::new(-1.0, c, Vector3::ZERO)
        }
        let traverser = Traverser::new(&bvh, behind);
        let ray = Ray::new(Vector3::new(-10.0, 0.0, 0.0), Vector3::X);
        assert!(!traverser.traverse(&ray, false).is_hit());
    }

    #[test]
    fn test_closure_as_intersector() {
        let bvh = row_of_cubes(8);
        // Captures state, only cubes right of x = 5 are solid
        let min_x = 5.0;
        let traverser = Traverser::new(&bvh, intersector_fn(|c: &Vector3, ray: &Ray| {
            if c.x < min_x {
                return Intersection::none();
            }
            CubeIntersector.intersect(c, ray)
        }));
        let ray = Ray::new(Vector3::new(-10.0, 0.0, 0.0), Vector3::X);
        let hit = traverser.traverse(&ray, false);
        assert_eq!(*hit.object.unwrap(), Vector3::new(6.0, 0.0, 0.0));
        assert!(approx_eq(hit.t, 15.5, 1e-12));

        let any = linear_scan(bvh.primitives(), &intersector_fn(|c: &Vector3, ray: &Ray| CubeIntersector.intersect(c, ray)), &ray, true);
        assert!(any.is_hit());
    }

    #[test]
    fn test_matches_linear_scan() {
        let bvh = row_of_cubes(50);
        let traverser = Traverser::new(&bvh, CubeIntersector);
        for i in 0..40 {
            let y = -0.6 + 0.03 * i as Float;
            let ray = Ray::new(Vector3::new(37.0, y, 5.0), Vector3::new(-1.0, 0.0, -0.2).normalize());
            let fast = traverser.traverse(&ray, false);
            let slow = linear_scan(bvh.primitives(), &CubeIntersector, &ray, false);
            assert_eq!(fast.is_hit(), slow.is_hit());
            if fast.is_hit() {
                assert_eq!(fast.object.unwrap(), slow.object.unwrap());
                assert!(approx_eq(fast.t, slow.t, 1e-9));
            }
        }
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let bvh = row_of_cubes(20);
        let traverser = Traverser::new(&bvh, CubeIntersector);
        let ray = Ray::new(Vector3::new(5.0, 5.0, 0.0), Vector3::new(0.3, -1.0, 0.0));
        let first = traverser.traverse(&ray, false);
        for _ in 0..5 {
            let again = traverser.traverse(&ray, false);
            assert_eq!(first.t, again.t);
            assert!(std::ptr::eq(first.object.unwrap(), again.object.unwrap()));
        }
    }

    #[test]
    fn test_linear_scan_empty() {
        let ray = Ray::new(Vector3::ZERO, Vector3::X);
        assert!(!linear_scan(&[] as &[Vector3], &CubeIntersector, &ray, false).is_hit());
    }
}
