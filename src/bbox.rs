/*

    Axis Aligned Bounding Box and the capability that
    turns an opaque primitive into one.

    @author: bartu
    @date: 9 Nov, 2025
*/


use crate::prelude::*;

use crate::interval::Interval;
use crate::ray::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl Default for BBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BBox {

    /// Identity of union, contains nothing and is hit by nothing
    pub const EMPTY: Self = Self {
        min: Vector3::splat(Float::INFINITY),
        max: Vector3::splat(Float::NEG_INFINITY),
    };

    pub fn new(min: Vector3, max: Vector3) -> Self {
        debug_assert!(min.cmple(max).all(), "Invalid bbox, found max < min");
        Self { min, max }
    }

    pub fn new_from(xint: &Interval, yint: &Interval, zint: &Interval) -> Self {
        debug_assert!(xint.is_valid() && yint.is_valid() && zint.is_valid(), "Invalid interval, found max < min");
        Self {
            min: Vector3::new(xint.min, yint.min, zint.min),
            max: Vector3::new(xint.max, yint.max, zint.max),
        }
    }

    pub fn from_point(p: Vector3) -> Self {
        Self { min: p, max: p }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn expand(&mut self, other: &BBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[inline]
    pub fn expand_point(&mut self, p: Vector3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline]
    pub fn centroid(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    /// Width, height, depth. Zero for an empty box.
    pub fn extent(&self) -> Vector3 {
        if self.is_empty() {
            return Vector3::ZERO;
        }
        self.max - self.min
    }

    /// Axis of greatest extent, ties prefer x then y
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }

    pub fn surface_area(&self) -> Float {
        let e = self.extent();
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }

    pub fn contains_point(&self, p: Vector3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    /// Slab test. Returns the parametric [entry, exit] range of the ray
    /// inside the box, restricted to t >= 0, or None on a miss.
    /// Entry is 0 when the ray starts inside the box.
    pub fn intersect(&self, ray: &Ray) -> Option<Interval> {
        // See slides 03, p.5-6
        if self.is_empty() {
            return None;
        }

        let mut range = Interval::NONNEGATIVE;
        for axis in 0..3 {
            let min = axis_value(&self.min, axis);
            let max = axis_value(&self.max, axis);
            let o = axis_value(&ray.origin, axis);
            let d = axis_value(&ray.direction, axis);

            if d == 0.0 {
                // Parallel to the slab: either always within it or never
                if o < min || o > max {
                    return None;
                }
                continue;
            }

            let inv = axis_value(&ray.inv_direction, axis);
            let mut t1 = (min - o) * inv;
            let mut t2 = (max - o) * inv;
            if t2 < t1 {
                std::mem::swap(&mut t1, &mut t2);
            }
            range = range.clip(&Interval::new(t1, t2))?;
        }
        Some(range)
    }
}


/// Computes the bounding box of a primitive. Called once per primitive
/// while building, never retained afterwards.
pub trait BoxConverter<P> {
    fn convert(&self, primitive: &P) -> BBox;
}

impl<P, F> BoxConverter<P> for F
where
    F: Fn(&P) -> BBox,
{
    fn convert(&self, primitive: &P) -> BBox {
        self(primitive)
    }
}
