use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::{direction, polar, DVec2, Ray2};

/// A disc used for the light source and the camera aperture.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle2 {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle2 {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Nearest positive ray parameter at which the ray crosses the circle.
    ///
    /// Returns `f64::INFINITY` if the ray misses or both crossings lie
    /// at or behind the origin.
    pub fn intersect(&self, ray: &Ray2) -> f64 {
        let omc = ray.o - self.center;
        let ph = omc.dot(ray.d);
        let q = omc.length_squared() - self.radius * self.radius;

        let rad = ph * ph - q;
        if rad < 0.0 {
            return f64::INFINITY;
        }

        let s = rad.sqrt();
        let t1 = -ph - s;
        if t1 > 0.0 {
            return t1;
        }
        let t2 = -ph + s;
        if t2 > 0.0 {
            return t2;
        }

        f64::INFINITY
    }

    /// Outward unit normal at a point on the circle.
    pub fn normal(&self, p: DVec2) -> DVec2 {
        direction(self.center, p)
    }

    /// Point on the circle facing `target`.
    pub fn towards(&self, target: DVec2) -> DVec2 {
        self.center + direction(self.center, target) * self.radius
    }

    /// Point on the circle at angle `2πt`.
    pub fn evaluate(&self, t: f64) -> DVec2 {
        self.center + polar(TAU * t, self.radius)
    }
}
