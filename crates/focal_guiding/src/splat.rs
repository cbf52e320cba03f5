//! Depositing path segments into the quadtree and evaluating pdfs along rays.

use focal_math::{DVec2, Interval, Ray2};

use crate::quadtree::QuadTree;
use crate::traversal::QuadTreeTraversal;

/// Measure of the annulus sector between `t_near` and `t_far` along a ray,
/// up to the constant angular factor.
///
/// Used to convert a leaf density into the probability of a ray from the
/// origin ending inside that leaf.
pub fn radial_measure(t_far: f64, t_near: f64) -> f64 {
    t_far * t_far - t_near * t_near
}

impl QuadTree {
    /// Add `contribution(hit)` to every leaf crossed by `ray`.
    pub fn splat_ray<F>(&mut self, ray: &Ray2, mut contribution: F)
    where
        F: FnMut(&QuadTreeTraversal) -> f64,
    {
        let hits: Vec<_> = self.traverse(ray).collect();
        for hit in &hits {
            let weight = contribution(hit);
            self.accumulate(hit.patch.node, weight);
        }
    }

    /// Deposit `weight` times the length of the segment `from`-`to` that
    /// falls into each leaf.
    ///
    /// Degenerate segments deposit nothing.
    pub fn splat_segment(&mut self, from: DVec2, to: DVec2, weight: f64) {
        let length = from.distance(to);
        if length <= 0.0 {
            return;
        }

        let segment = Interval::new(0.0, length);
        self.splat_ray(&Ray2::targeting(from, to), |hit| {
            let overlap = hit.interval().intersect(&segment);
            if overlap.is_empty() {
                0.0
            } else {
                weight * overlap.size()
            }
        });
    }

    /// Probability density of the ray origin's sampling distribution along
    /// `ray`, integrated over its forward part with the radial measure.
    pub fn segment_pdf(&self, ray: &Ray2) -> f64 {
        self.traverse(ray)
            .filter(|hit| hit.t1 > 0.0)
            .map(|hit| hit.patch.density * radial_measure(hit.t1, hit.t0.max(0.0)))
            .sum()
    }
}
