//! Free functions on plane vectors that glam does not provide in the
//! conventions the tracer expects.

use std::f64::consts::PI;

use crate::{DVec2, DVec3};

/// Point at `angle` radians on a circle of `radius` around the origin.
#[inline]
pub fn polar(angle: f64, radius: f64) -> DVec2 {
    DVec2::new(radius * angle.cos(), radius * angle.sin())
}

/// Unit vector pointing from `from` to `to`.
#[inline]
pub fn direction(from: DVec2, to: DVec2) -> DVec2 {
    (to - from).normalize()
}

/// Mirror `w` (pointing away from the surface) about the normal `n`.
#[inline]
pub fn reflect(n: DVec2, w: DVec2) -> DVec2 {
    2.0 * w.dot(n) * n - w
}

/// Refract `w` through a surface with normal `n` and relative index `eta`.
///
/// Returns the zero vector on total internal reflection.
pub fn refract(n: DVec2, w: DVec2, eta: f64) -> DVec2 {
    let n_dot_w = n.dot(w);
    let k = 1.0 - eta * eta * (1.0 - n_dot_w * n_dot_w);
    if k < 0.0 {
        return DVec2::ZERO;
    }

    w * eta - n * (eta * n_dot_w + k.sqrt())
}

/// Divide by the homogeneous coordinate.
#[inline]
pub fn homogeneous_project(v: DVec3) -> DVec2 {
    DVec2::new(v.x / v.z, v.y / v.z)
}

/// Map `u ∈ [0,1)` to a direction in the half-plane around `n`.
///
/// `u = 0` and `u = 1` graze the surface on either side, `u = 0.5`
/// leaves along the normal.
pub fn sample_hemicircle(n: DVec2, u: f64) -> DVec2 {
    let uv = polar(PI * u, 1.0);
    n * uv.y + n.perp() * uv.x
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_polar() {
        assert!((polar(0.0, 2.0) - DVec2::new(2.0, 0.0)).length() < EPS);
        assert!((polar(PI / 2.0, 1.0) - DVec2::Y).length() < EPS);
    }

    #[test]
    fn test_reflect() {
        // Incoming from the upper left, leaving to the upper right
        let n = DVec2::Y;
        let w = DVec2::new(-1.0, 1.0);
        assert!((reflect(n, w) - DVec2::new(1.0, 1.0)).length() < EPS);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        let n = DVec2::Y;
        let w = DVec2::new(0.9, 0.1).normalize();
        assert_eq!(refract(n, w, 1.5), DVec2::ZERO);
    }

    #[test]
    fn test_refract_straight_through() {
        let n = DVec2::Y;
        let w = DVec2::Y;
        assert!((refract(n, w, 1.0) - -DVec2::Y).length() < EPS);
    }

    #[test]
    fn test_sample_hemicircle_stays_above_surface() {
        let n = DVec2::new(1.0, 1.0).normalize();
        for i in 1..100 {
            let d = sample_hemicircle(n, i as f64 / 100.0);
            assert!(d.dot(n) > 0.0);
            assert!((d.length() - 1.0).abs() < EPS);
        }

        assert!((sample_hemicircle(n, 0.5) - n).length() < EPS);
    }

    #[test]
    fn test_homogeneous_project() {
        let p = homogeneous_project(DVec3::new(4.0, 6.0, 2.0));
        assert_eq!(p, DVec2::new(2.0, 3.0));
    }
}
