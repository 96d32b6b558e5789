/*

    Declare the demo scene: a large number of small spheres packed
    inside a cube, seen by a single camera.

    Every field has a default so an empty JSON object (or no file
    at all) reproduces the classic million-sphere scene.

    @date: 2 Oct, 2025
    @author: Bartu
*/

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::builder::BuildConfig;
use crate::json_parser::{deser_float, deser_pair, deser_u64, deser_usize, deser_vec3};
use crate::shapes::Sphere;
use crate::prelude::*;


#[derive(Debug, Deserialize, Clone, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)] // If any of the fields below is missing in the JSON, use default
pub struct SceneConfig {
    #[default = 1_000_000]
    #[serde(deserialize_with = "deser_usize")]
    pub sphere_count: usize,

    #[default = 0.005]
    #[serde(deserialize_with = "deser_float")]
    pub sphere_radius: Float,

    /// Sphere centers are uniform in [-half_extent, half_extent]^3
    #[default = 1.0]
    #[serde(deserialize_with = "deser_float")]
    pub half_extent: Float,

    #[default = 42]
    #[serde(deserialize_with = "deser_u64")]
    pub seed: u64,

    #[default([800, 800])]
    #[serde(deserialize_with = "deser_pair")]
    pub image_resolution: [usize; 2],

    #[default(Vector3::new(1.6, 1.3, 1.6))]
    #[serde(rename = "CameraPosition", deserialize_with = "deser_vec3")]
    pub camera_position: Vector3,

    #[default(Vector3::ZERO)]
    #[serde(rename = "CameraFocus", deserialize_with = "deser_vec3")]
    pub camera_focus: Vector3,

    #[default(Vector3::Y)]
    #[serde(rename = "CameraUp", deserialize_with = "deser_vec3")]
    pub camera_up: Vector3,

    #[default = 70.0]
    #[serde(rename = "FovY", deserialize_with = "deser_float")]
    pub fovy: Float,

    #[default = "render.png"]
    pub image_name: String,

    /// Random rays cross-checked against a brute force scan after rendering
    #[default = 0]
    #[serde(deserialize_with = "deser_usize")]
    pub validation_rays: usize,

    #[serde(rename = "BVH")]
    pub bvh: BuildConfig,
}

impl SceneConfig {

    /// Reject values the demo cannot build or render
    pub fn validate(&self) -> Result<(), String> {
        if !self.sphere_radius.is_finite() || self.sphere_radius < 0.0 {
            return Err(format!("SphereRadius must be finite and >= 0, found {}", self.sphere_radius));
        }
        if !self.half_extent.is_finite() || self.half_extent <= 0.0 {
            return Err(format!("HalfExtent must be finite and > 0, found {}", self.half_extent));
        }
        if self.image_resolution.contains(&0) {
            return Err(format!("ImageResolution must be non-zero, found {:?}", self.image_resolution));
        }
        if !(self.fovy > 0.0 && self.fovy < 180.0) {
            return Err(format!("FovY must be in (0, 180), found {}", self.fovy));
        }
        if !self.camera_position.is_finite() || self.camera_position == self.camera_focus {
            return Err("CameraPosition must be finite and differ from CameraFocus".to_string());
        }
        Ok(())
    }
}

/// Spheres with centers uniform in the configured cube, same seed gives same scene
pub fn generate_spheres(config: &SceneConfig) -> Vec<Sphere> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let h = config.half_extent;
    (0..config.sphere_count)
        .map(|_| {
            let center = Vector3::new(
                rng.random_range(-h..=h),
                rng.random_range(-h..=h),
                rng.random_range(-h..=h),
            );
            Sphere::new(center, config.sphere_radius)
        })
        .collect()
}
