//! Physics utilities shared by both game modes.
//!
//! Everything lives on the XZ ground plane with Y up. No external physics
//! engine; the interaction rules are simple enough that range tests, AABB
//! overlap and exponential smoothing cover all of them.

use glam::Vec3;

/// Square stage boundary centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct StageBounds {
    pub half_extent: f32,
}

impl StageBounds {
    pub const fn new(half_extent: f32) -> Self {
        Self { half_extent }
    }

    /// Clamp a point's X/Z to the boundary. Y is untouched.
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(-self.half_extent, self.half_extent),
            point.y,
            point.z.clamp(-self.half_extent, self.half_extent),
        )
    }
}

impl Default for StageBounds {
    fn default() -> Self {
        Self::new(50.0)
    }
}

/// Strict range test between two points. Exactly-at-range does not count,
/// which matters for the net capture boundary.
#[inline]
pub fn within_range(a: Vec3, b: Vec3, range: f32) -> bool {
    a.distance_squared(b) < range * range
}

/// Linear interpolation.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Exponentially approach a target value. `factor` is the fraction to
/// close this tick (typically `rate * delta`), clamped to 1 so oversized
/// deltas cannot overshoot.
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    lerp(current, target, factor.min(1.0))
}

/// Vector form of [`approach`].
#[inline]
pub fn approach_vec3(current: Vec3, target: Vec3, factor: f32) -> Vec3 {
    current + (target - current) * factor.min(1.0)
}

/// Clamp a point to a maximum distance from the origin on the ground
/// plane. Returns the clamped point and whether clamping occurred.
#[inline]
pub fn clamp_to_radius(point: Vec3, max_radius: f32) -> (Vec3, bool) {
    let flat = Vec3::new(point.x, 0.0, point.z);
    let dist = flat.length();
    if dist > max_radius {
        let scaled = flat * (max_radius / dist);
        (Vec3::new(scaled.x, point.y, scaled.z), true)
    } else {
        (point, false)
    }
}
