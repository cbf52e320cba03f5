use serde::{Deserialize, Serialize};

use crate::{DVec2, Interval};

/// Axis-aligned rectangle in the plane.
///
/// Quadrants are addressed by a two-bit index: bit 0 selects the upper
/// half along x, bit 1 the upper half along y.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds2 {
    /// Create a new rectangle from its corners.
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from two arbitrary corner points.
    pub fn from_points(a: DVec2, b: DVec2) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    /// Get the interval for a specific axis (0=X, 1=Y).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => Interval::new(self.min.x, self.max.x),
            _ => Interval::new(self.min.y, self.max.y),
        }
    }

    /// Returns the center point of the rectangle.
    pub fn center(&self) -> DVec2 {
        self.min.lerp(self.max, 0.5)
    }

    /// The vector from `min` to `max`.
    pub fn diagonal(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn area(&self) -> f64 {
        let d = self.diagonal();
        d.x * d.y
    }

    /// Returns true if `p` lies inside or on the border.
    pub fn contains(&self, p: DVec2) -> bool {
        self.axis_interval(0).contains(p.x) && self.axis_interval(1).contains(p.y)
    }

    /// Map relative coordinates in `[0,1]²` to absolute coordinates.
    pub fn evaluate(&self, uv: DVec2) -> DVec2 {
        self.min + uv * self.diagonal()
    }

    /// Inverse of [`Bounds2::evaluate`].
    pub fn relative(&self, p: DVec2) -> DVec2 {
        (p - self.min) / self.diagonal()
    }

    /// The quadrant with index `i` (see the type docs for the bit layout).
    pub fn child(&self, i: usize) -> Bounds2 {
        let mid = self.center();
        let mut b = *self;
        if i & 1 != 0 {
            b.min.x = mid.x;
        } else {
            b.max.x = mid.x;
        }
        if i & 2 != 0 {
            b.min.y = mid.y;
        } else {
            b.max.y = mid.y;
        }
        b
    }

    /// Index of the quadrant containing `p`.
    pub fn child_index(&self, p: DVec2) -> usize {
        let mid = self.center();
        (p.x > mid.x) as usize | (((p.y > mid.y) as usize) << 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Bounds2 {
        Bounds2::new(DVec2::ZERO, DVec2::ONE)
    }

    #[test]
    fn test_bounds_from_points() {
        let b = Bounds2::from_points(DVec2::new(10.0, -2.0), DVec2::new(-4.0, 6.0));
        assert_eq!(b.min, DVec2::new(-4.0, -2.0));
        assert_eq!(b.max, DVec2::new(10.0, 6.0));
    }

    #[test]
    fn test_bounds_center_and_area() {
        let b = Bounds2::new(DVec2::new(-400.0, -400.0), DVec2::new(400.0, 400.0));
        assert_eq!(b.center(), DVec2::ZERO);
        assert_eq!(b.area(), 640_000.0);
    }

    #[test]
    fn test_bounds_evaluate_relative() {
        let b = Bounds2::new(DVec2::new(-2.0, 0.0), DVec2::new(2.0, 8.0));
        let p = b.evaluate(DVec2::new(0.25, 0.5));
        assert_eq!(p, DVec2::new(-1.0, 4.0));
        assert_eq!(b.relative(p), DVec2::new(0.25, 0.5));
    }

    #[test]
    fn test_bounds_children_tile_parent() {
        let b = unit();
        let total: f64 = (0..4).map(|i| b.child(i).area()).sum();
        assert!((total - b.area()).abs() < 1e-12);

        assert_eq!(b.child(0), Bounds2::new(DVec2::ZERO, DVec2::splat(0.5)));
        assert_eq!(b.child(1).min, DVec2::new(0.5, 0.0));
        assert_eq!(b.child(2).min, DVec2::new(0.0, 0.5));
        assert_eq!(b.child(3), Bounds2::new(DVec2::splat(0.5), DVec2::ONE));
    }

    #[test]
    fn test_bounds_child_index() {
        let b = unit();
        for i in 0..4 {
            let c = b.child(i).center();
            assert_eq!(b.child_index(c), i);
        }
    }

    #[test]
    fn test_bounds_contains() {
        let b = unit();
        assert!(b.contains(DVec2::splat(0.5)));
        assert!(b.contains(DVec2::ONE));
        assert!(!b.contains(DVec2::new(1.5, 0.5)));
    }
}
