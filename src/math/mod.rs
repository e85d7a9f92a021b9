mod aabb;

pub use aabb::{Aabb, Face};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Distance below which a point is treated as lying on a surface.
pub const ON_SURFACE_THRESH: f64 = 1e-10;

/// Step taken along a direction to decide which side of a surface a boundary point belongs to.
pub const TINY_MOVE: f64 = 1e-8;

/// Tolerance when comparing traced and declared track lengths.
pub const LENGTH_TOLERANCE: f64 = 1e-6;

/// Unit direction for an azimuthal angle in the x-y plane and a polar angle from +z.
///
/// A polar angle of exactly `π/2` yields a direction with a zero z component so
/// that planar tracks never drift out of their z-level.
#[must_use]
pub fn direction(azimuthal: f64, polar: f64) -> Vector3 {
    let (sin_polar, cos_polar) = if (polar - std::f64::consts::FRAC_PI_2).abs() < TOLERANCE {
        (1.0, 0.0)
    } else {
        polar.sin_cos()
    };
    Vector3::new(
        sin_polar * azimuthal.cos(),
        sin_polar * azimuthal.sin(),
        cos_polar,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn planar_direction_has_no_z() {
        let d = direction(PI / 3.0, FRAC_PI_2);
        assert!(d.z.abs() < f64::EPSILON);
        assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn polar_zero_points_up() {
        let d = direction(1.234, 0.0);
        assert_relative_eq!(d.z, 1.0, epsilon = 1e-12);
    }
}
