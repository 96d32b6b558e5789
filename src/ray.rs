use std::fmt;

use crate::interval::FloatConst;
use crate::prelude::*;


/// A ray r(t) = o + dt for t >= 0.
///
/// Direction is not required to be normalized, hit distances
/// are expressed in units of the given direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
    pub(crate) inv_direction: Vector3, // cached for slab tests, inf where direction is zero
}

impl Ray {

    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    #[inline]
    pub fn at(&self, t: Float) -> Vector3 {
        self.origin + self.direction * t // r(t) = o + dt
    }

    #[inline]
    pub fn is_front_face(&self, normal: Vector3) -> bool {
         self.direction.dot(normal) <= 0.0
    }
}


/// Result of intersecting a ray with a primitive.
///
/// A default constructed Intersection means "no hit". A hit borrows the
/// primitive it hit, so it cannot outlive the collection (or BVH) that owns it.
pub struct Intersection<'a, P> {
    pub t: Float,
    pub object: Option<&'a P>,
    pub normal: Vector3,
}

impl<'a, P> Intersection<'a, P> {

    pub fn new(t: Float, object: &'a P, normal: Vector3) -> Self {
        Self {
            t,
            object: Some(object),
            normal,
        }
    }

    pub fn none() -> Self {
        Self {
            t: FloatConst::INF,
            object: None,
            normal: Vector3::ZERO,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.object.is_some()
    }

    /// Hit point for the ray this intersection was computed with
    pub fn point(&self, ray: &Ray) -> Vector3 {
        ray.at(self.t)
    }
}

impl<P> Default for Intersection<'_, P> {
    fn default() -> Self {
        Self::none()
    }
}

// Manual impls so P itself does not need to be Clone/Copy/Debug
impl<P> Clone for Intersection<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Intersection<'_, P> {}

impl<P> fmt::Debug for Intersection<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intersection")
            .field("t", &self.t)
            .field("hit", &self.is_hit())
            .field("normal", &self.normal)
            .finish()
    }
}

impl<P> From<&Intersection<'_, P>> for bool {
    fn from(isect: &Intersection<'_, P>) -> bool {
        isect.is_hit()
    }
}

impl<P> From<Intersection<'_, P>> for bool {
    fn from(isect: Intersection<'_, P>) -> bool {
        isect.is_hit()
    }
}
