use serde::{Deserialize, Serialize};

use crate::{DVec2, Ray2};

/// A finite line segment from `from` to `to`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line2 {
    pub from: DVec2,
    pub to: DVec2,
}

impl Line2 {
    pub fn new(from: DVec2, to: DVec2) -> Self {
        Self { from, to }
    }

    /// The vector from `from` to `to`.
    pub fn span(&self) -> DVec2 {
        self.to - self.from
    }

    pub fn length(&self) -> f64 {
        self.span().length()
    }

    /// Angle of the span against the x axis, in radians.
    pub fn angle(&self) -> f64 {
        let d = self.span();
        d.y.atan2(d.x)
    }

    /// Point at segment parameter `t` (0 = `from`, 1 = `to`).
    pub fn evaluate(&self, t: f64) -> DVec2 {
        self.from.lerp(self.to, t)
    }

    /// Unit normal, the span rotated a quarter turn counter-clockwise.
    pub fn normal(&self) -> DVec2 {
        self.span().perp().normalize()
    }

    /// Ray parameter at which the ray crosses the segment.
    ///
    /// Solves `o + t·d = from + u·(to - from)`. Returns `f64::INFINITY` when
    /// the ray is parallel to the segment, passes beside it (`u ∉ [0,1]`), or
    /// crosses it behind the origin (`t < 0`). Callers leaving a surface
    /// apply their own stricter lower bound on `t`.
    pub fn intersect(&self, ray: &Ray2) -> f64 {
        let d = self.span();
        let r = ray.o - self.from;

        let denom = ray.d.x * d.y - ray.d.y * d.x;
        if denom == 0.0 {
            return f64::INFINITY;
        }

        let u = (ray.d.x * r.y - ray.d.y * r.x) / denom;
        let t = (d.x * r.y - d.y * r.x) / denom;
        if !(0.0..=1.0).contains(&u) {
            return f64::INFINITY;
        }

        if t < 0.0 {
            return f64::INFINITY;
        }
        t
    }
}
