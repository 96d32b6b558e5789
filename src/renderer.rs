/*

    Given a sphere BVH and a Camera, render an image
    colored by the surface normal at the nearest hit.

    @date: Oct 11, 2025
    @author: Bartu
*/

use rayon::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

use crate::acceleration::BVH;
use crate::camera::Camera;
use crate::image::ImageData;
use crate::ray::Ray;
use crate::shapes::{Sphere, SphereIntersector};
use crate::traverser::{linear_scan, Traverser};
use crate::prelude::*;

const BACKGROUND_COLOR: Vector3 = Vector3::ZERO;

/// Just for fun, the color is based on the normal
pub fn get_color(traverser: &Traverser<'_, Sphere, SphereIntersector>, ray: &Ray) -> Vector3 {
    let hit = traverser.traverse(ray, false);
    if hit.is_hit() {
        hit.normal.abs() * 255.0
    }
    else {
        BACKGROUND_COLOR // no hit
    }
}

pub fn render(bvh: &BVH<Sphere>, cam: &Camera, image_name: &str) -> ImageData {

    let start = Instant::now();
    let eye_rays = cam.generate_primary_rays();
    let traverser = Traverser::new(bvh, SphereIntersector);

    // --- Rayon Multithreading ---
    let pixel_colors: Vec<Vector3> = eye_rays
        .par_iter()
        .map(|ray| get_color(&traverser, ray))
        .collect();
    // -----------------------------

    let (width, height) = cam.get_resolution();
    info!("Rendering of {} ({}x{}) took: {:?}", image_name, width, height, start.elapsed());
    ImageData::new_from_colors([width, height], image_name.to_string(), pixel_colors)
}

/// Shoot random rays from outside `bounds_half_extent` towards random points
/// inside it and compare nearest hits with a linear scan over all spheres.
/// Returns the number of mismatching rays.
pub fn validate(bvh: &BVH<Sphere>, num_rays: usize, bounds_half_extent: Float, seed: u64) -> usize {

    let mut rng = StdRng::seed_from_u64(seed);
    let h = bounds_half_extent;
    let rays: Vec<Ray> = (0..num_rays)
        .map(|_| {
            let origin = Vector3::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
                .normalize_or(Vector3::X) * (3.0 * h);
            let target = Vector3::new(rng.random_range(-h..=h), rng.random_range(-h..=h), rng.random_range(-h..=h));
            Ray::new(origin, (target - origin).normalize())
        })
        .collect();

    let traverser = Traverser::new(bvh, SphereIntersector);
    let mismatches = rays
        .par_iter()
        .filter(|ray| {
            let fast = traverser.traverse(ray, false);
            let slow = linear_scan(bvh.primitives(), &SphereIntersector, ray, false);
            match (fast.object, slow.object) {
                (None, None) => false,
                // Coincident spheres may tie, only the distance has to agree
                (Some(_), Some(_)) => !approx_eq(fast.t, slow.t, 1e-9),
                _ => true,
            }
        })
        .count();

    if mismatches > 0 {
        warn!("{} out of {} validation rays disagree with the linear scan", mismatches, num_rays);
    } else {
        info!("All {} validation rays agree with the linear scan", num_rays);
    }
    mismatches
}
