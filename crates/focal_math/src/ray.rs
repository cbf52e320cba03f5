use serde::{Deserialize, Serialize};

use crate::{direction, homogeneous_project, DMat3, DVec2};

/// A ray in the plane with origin and direction.
///
/// The direction is not required to be normalized; ray parameters are
/// measured in multiples of `d`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ray2 {
    pub o: DVec2,
    pub d: DVec2,
}

impl Ray2 {
    /// Create a new ray.
    pub fn new(o: DVec2, d: DVec2) -> Self {
        Self { o, d }
    }

    /// A ray starting at `from` with unit direction towards `to`.
    pub fn targeting(from: DVec2, to: DVec2) -> Self {
        Self::new(from, direction(from, to))
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: o + t * d
    #[inline]
    pub fn at(&self, t: f64) -> DVec2 {
        self.o + self.d * t
    }

    /// Apply a projective 2D transform.
    ///
    /// The origin is transformed as a point (w = 1) and projected back,
    /// the direction as a vector (w = 0).
    pub fn transform(&self, m: &DMat3) -> Self {
        let o = homogeneous_project(*m * self.o.extend(1.0));
        let d = (*m * self.d.extend(0.0)).truncate();
        Self { o, d }
    }
}
