/*

    Declare a look-at pinhole Camera and its NearPlane, used
    by the demo to shoot one primary ray per pixel.

    @date: Oct, 2025
    @author: bartu
*/


use crate::prelude::*;
use crate::ray::Ray;
use crate::scene::SceneConfig;

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector3,
    image_resolution: [usize; 2],
    nearplane: NearPlane,
    near_distance: Float,

    w : Vector3,
    v : Vector3,
    u : Vector3,
}

impl Camera {

    /// FovY is in degrees and covers the vertical direction, aspect ratio
    /// follows from the resolution.
    pub fn look_at(position: Vector3, gaze_point: Vector3, up: Vector3, fovy: Float, image_resolution: [usize; 2]) -> Self {

        let near_distance = 1.0;
        let fovy_rad = fovy.to_radians();
        let aspect = image_resolution[0] as Float / image_resolution[1].max(1) as Float;
        let top = near_distance * (fovy_rad / 2.0).tan();
        let right = top * aspect;
        let nearplane = NearPlane::new(-right, right, -top, top);

        let gaze_dir = gaze_point - position;
        let w = -gaze_dir.normalize();
        let u = up.cross(w).normalize();
        let v = w.cross(u).normalize(); // directly use corrected up

        debug_assert!(approx_zero(u.dot(w)));
        debug_assert!(approx_zero(v.dot(w)));
        debug_assert!(approx_zero(v.dot(u)));
        debug!("Camera position {:?}, gaze {:?}", position, -w);

        Self {
            position,
            image_resolution,
            nearplane,
            near_distance,
            w,
            v,
            u,
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::look_at(
            config.camera_position,
            config.camera_focus,
            config.camera_up,
            config.fovy,
            config.image_resolution,
        )
    }

    pub fn get_resolution(&self) -> (usize, usize) {
        (self.image_resolution[0], self.image_resolution[1])
    }

    pub fn get_position(&self) -> Vector3 {
        self.position
    }

    pub fn get_nearplane_corners(&self) -> [Vector3; 4] {
        self.nearplane.corners(self.position, self.u, self.v, self.w, self.near_distance)
    }

    /// Row major, top row first
    pub fn generate_primary_rays(&self) -> Vec<Ray> {
        let (width, height) = self.get_resolution();
        let pixel_centers = get_pixel_centers(width, height, &self.get_nearplane_corners());
        let ray_origin = self.position;
        let mut rays = Vec::<Ray>::with_capacity(pixel_centers.len());
        for pixel_center in pixel_centers.iter() {
            let direction = (pixel_center - ray_origin).normalize();
            rays.push(Ray::new(ray_origin, direction));
        }
        rays
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NearPlane {
    pub(crate) left: Float,
    pub(crate) right: Float,
    pub(crate) bottom: Float,
    pub(crate) top: Float,
}

impl NearPlane {
    pub fn new(left: Float, right: Float, bottom: Float, top: Float) -> Self {
        NearPlane {
            left,
            right,
            bottom,
            top,
        }
    }

    /// Returns the four corners in world space using camera basis vectors
    /// Order: [top-left, top-right, bottom-left, bottom-right]
    pub fn corners(
        &self,
        camera_position: Vector3,
        u: Vector3,  // camera's right vector
        v: Vector3,  // camera's up vector
        w: Vector3,  // camera's backward vector (-gaze)
        near_distance: Float
    ) -> [Vector3; 4] {
        // Center of near plane in world space
        let plane_center = camera_position - w * near_distance; // subtract because w points backward

        [
            plane_center + u * self.left + v * self.top,      // top-left
            plane_center + u * self.right + v * self.top,     // top-right
            plane_center + u * self.left + v * self.bottom,   // bottom-left
            plane_center + u * self.right + v * self.bottom,  // bottom-right
        ]
    }
}

pub fn get_pixel_centers(width: usize, height: usize, near_plane_corners: &[Vector3; 4]) -> Vec<Vector3> {
    // Assuming nearplane corners are:
    // [0]=top-left, [1]=top-right, [2]=bottom-left, [3]=bottom-right
    let mut pixel_centers = Vec::with_capacity(width * height);

    for row in 0..height {
        for col in 0..width {
            let u = (col as Float + 0.5) / width as Float; // pixel width
            let v = (row as Float + 0.5) / height as Float; // pixel height

            let top = near_plane_corners[0] * (1.0 - u) + near_plane_corners[1] * u;
            let bottom = near_plane_corners[2] * (1.0 - u) + near_plane_corners[3] * u;
            let center = top * (1.0 - v) + bottom * v;

            pixel_centers.push(center);
        }
    }

    pixel_centers
}


#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        Camera::look_at(Vector3::new(0.0, 0.0, 5.0), Vector3::ZERO, Vector3::Y, 90.0, [3, 3])
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let cam = Camera::look_at(Vector3::new(1.6, 1.3, 1.6), Vector3::ZERO, Vector3::Y, 70.0, [8, 8]);
        assert!(approx_zero(cam.u.dot(cam.v)));
        assert!(approx_zero(cam.v.dot(cam.w)));
        assert!(approx_zero(cam.w.dot(cam.u)));
        assert!(cam.u.is_normalized() && cam.v.is_normalized() && cam.w.is_normalized());
    }

    #[test]
    fn test_center_pixel_looks_at_focus() {
        let rays = test_camera().generate_primary_rays();
        assert_eq!(rays.len(), 9);
        let center = rays[4];
        assert!((center.direction - Vector3::new(0.0, 0.0, -1.0)).length() < 1e-12);
        assert_eq!(center.origin, Vector3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_first_row_is_top() {
        let rays = test_camera().generate_primary_rays();
        // Top-left pixel points up and to the left
        assert!(rays[0].direction.y > 0.0);
        assert!(rays[0].direction.x < 0.0);
        // Bottom-right pixel points down and to the right
        assert!(rays[8].direction.y < 0.0);
        assert!(rays[8].direction.x > 0.0);
    }

    #[test]
    fn test_pixel_centers_span_nearplane() {
        let corners = [
            Vector3::new(-1.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
        ];
        let centers = get_pixel_centers(2, 1, &corners);
        assert_eq!(centers, vec![Vector3::new(-0.5, 0.0, 0.0), Vector3::new(0.5, 0.0, 0.0)]);
    }
}
