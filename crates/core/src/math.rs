//! Deterministic math for cross-platform consistency.
//!
//! Hardware trig intrinsics can differ between architectures (x86 vs ARM
//! vs WASM), so anything the simulation feeds back into state goes through
//! the software approximations here. IEEE-754 add/mul/div/sqrt are exact,
//! so plain `glam` vector math stays deterministic without help.

use glam::Vec3;
use std::f32::consts::PI;

/// Deterministic atan for a single value.
/// Polynomial from Abramowitz & Stegun, accurate to ~0.0005 rad.
#[inline]
fn atan_det(x: f32) -> f32 {
    let sign = x.signum();
    let x = x.abs();

    // For |x| > 1, use identity: atan(x) = PI/2 - atan(1/x)
    let (z, base) = if x > 1.0 { (1.0 / x, PI / 2.0) } else { (x, 0.0) };

    let z2 = z * z;
    let a1 = -0.333331346;
    let a2 = 0.199900893;
    let a3 = -0.142006844;
    let a4 = 0.106347479;
    let a5 = -0.074890330;
    let a6 = 0.042972115;
    let a7 = -0.016045005;

    let result =
        z * (1.0 + z2 * (a1 + z2 * (a2 + z2 * (a3 + z2 * (a4 + z2 * (a5 + z2 * (a6 + z2 * a7)))))));

    let angle = if x > 1.0 { base - result } else { result };
    sign * angle
}

/// Deterministic atan2, range [-PI, PI].
#[inline]
pub fn atan2_det(y: f32, x: f32) -> f32 {
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    if x == 0.0 {
        return if y > 0.0 { PI / 2.0 } else { -PI / 2.0 };
    }
    if y == 0.0 {
        return if x > 0.0 { 0.0 } else { PI };
    }

    let atan_val = atan_det(y / x);
    if x > 0.0 {
        atan_val
    } else if y >= 0.0 {
        atan_val + PI
    } else {
        atan_val - PI
    }
}

/// Deterministic sine via Bhaskara I's approximation, accurate to ~0.001.
#[inline]
pub fn sin_det(x: f32) -> f32 {
    let x = wrap_angle(x);
    let (x, sign) = if x > PI { (x - PI, -1.0) } else { (x, 1.0) };

    // sin(x) ~ 16x(pi-x) / (5pi^2 - 4x(pi-x)) on [0, pi]
    let numerator = 16.0 * x * (PI - x);
    let denominator = 5.0 * PI * PI - 4.0 * x * (PI - x);
    sign * numerator / denominator
}

/// Deterministic cosine.
#[inline]
pub fn cos_det(x: f32) -> f32 {
    sin_det(x + PI / 2.0)
}

/// Wrap angle to [0, 2*PI).
#[inline]
pub fn wrap_angle(mut x: f32) -> f32 {
    const TWO_PI: f32 = 2.0 * PI;
    while x < 0.0 {
        x += TWO_PI;
    }
    while x >= TWO_PI {
        x -= TWO_PI;
    }
    x
}

/// Normalize an angle difference to [-PI, PI] (shortest path).
#[inline]
pub fn normalize_angle_diff(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Smooth an angle toward a target along the shortest path.
/// `factor` is the fraction to close this tick, clamped to 1.
#[inline]
pub fn damp_angle(current: f32, target: f32, factor: f32) -> f32 {
    current + normalize_angle_diff(target - current) * factor.min(1.0)
}

/// Unit forward vector on the ground plane for a yaw angle.
/// Yaw convention: `atan2(x, z)`, so yaw 0 faces +Z.
#[inline]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(sin_det(yaw), 0.0, cos_det(yaw))
}

/// Yaw angle of a direction vector on the ground plane.
#[inline]
pub fn heading_yaw(dir: Vec3) -> f32 {
    atan2_det(dir.x, dir.z)
}
