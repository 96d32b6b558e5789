/*

    Declare numeric types used throughout this repo.

    WARNING: If you like to use f32 instead of f64
    during computations, you need to change both of these:
    pub type Float = f32;
    pub type Vector3 = Vec3;

    @date: 2 Oct, 2025
    @author: Bartu
*/

use bevy_math::DVec3;
pub type Float = f64; // WARNING: If you want to change it to f32, don't forget to update Vector3
pub type Vector3 = DVec3;

pub fn approx_zero(x: Float) -> bool {
    x.abs() < 1e-8
}

pub fn approx_eq(a: Float, b: Float, tolerance: Float) -> bool {
    (a - b).abs() <= tolerance
}

/// Component of `v` along `axis` (0 = x, 1 = y, 2 = z)
#[inline]
pub fn axis_value(v: &Vector3, axis: usize) -> Float {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}
