/*

    Sphere primitive and the two capabilities the BVH needs
    for it: a box converter and a ray intersector.

    @date: Oct, 2025
    @author: bartu
*/

use crate::bbox::{BBox, BoxConverter};
use crate::interval::Interval;
use crate::ray::{Intersection, Ray};
use crate::traverser::Intersector;
use crate::prelude::*;


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: Float,
    pub radius_squared: Float,
}

impl Sphere {
    pub fn new(center: Vector3, radius: Float) -> Self {
        debug_assert!(radius >= 0.0);
        Self {
            center,
            radius,
            radius_squared: radius * radius,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SphereBoxConverter;

impl BoxConverter<Sphere> for SphereBoxConverter {
    fn convert(&self, sphere: &Sphere) -> BBox {
        let c = sphere.center;
        let r = sphere.radius.abs(); // intersection only sees radius^2

        let xint = Interval::new(c.x - r, c.x + r);
        let yint = Interval::new(c.y - r, c.y + r);
        let zint = Interval::new(c.z - r, c.z + r);

        if !(xint.is_valid() && yint.is_valid() && zint.is_valid()) {
            // NaN somewhere, such a sphere can never be hit
            return BBox::EMPTY;
        }
        BBox::new_from(&xint, &yint, &zint)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SphereIntersector;

impl Intersector<Sphere> for SphereIntersector {

    fn intersect<'a>(&self, sphere: &'a Sphere, ray: &Ray) -> Intersection<'a, Sphere> {
        // Based on Slides 01_B, p.11, Ray-Sphere Intersection
        let o_minus_c = ray.origin - sphere.center;
        let d_dot_d: Float = ray.direction.dot(ray.direction);
        let oc_dot_oc: Float = o_minus_c.dot(o_minus_c);
        let d_dot_oc: Float = ray.direction.dot(o_minus_c);
        let discriminant: Float = d_dot_oc * d_dot_oc - d_dot_d * (oc_dot_oc - sphere.radius_squared);
        if discriminant < 0. || d_dot_d == 0. { // Negative square root
            return Intersection::none();
        }

        let discriminant = discriminant.sqrt();
        let t1 = (-d_dot_oc + discriminant) / d_dot_d;
        let t2 = (-d_dot_oc - discriminant) / d_dot_d; // t2 <= t1

        // Pick smaller first, the far root only matters when starting inside
        let t = if t2 >= 0.0 { t2 } else { t1 };
        if t < 0.0 {
            return Intersection::none(); // Sphere is behind the ray
        }

        let point = ray.at(t);
        let normal = (point - sphere.center).normalize_or_zero();
        Intersection::new(t, sphere, normal)
    }
}
