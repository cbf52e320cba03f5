//! Sampling points proportional to the learned density.

use focal_math::{Bounds2, DVec2};

use crate::quadtree::{NodeKey, QuadTree};

/// Iterator over the refinement steps of a warped sample, see
/// [`QuadTree::warp`].
#[derive(Debug, Clone)]
pub struct Warp<'a> {
    tree: &'a QuadTree,
    uv: DVec2,
    next: Option<(NodeKey, Bounds2)>,
}

impl QuadTree {
    /// Warp a uniform sample `uv` in `[0,1]²` into a point distributed
    /// according to the leaf densities.
    ///
    /// At each inner node the x half is chosen from the marginal density
    /// and the y half from the density conditional on that column; `uv` is
    /// rescaled to stay uniform inside the chosen child. Yields the point
    /// `uv` maps to in every node on the way down, root first; the last
    /// item is the sample.
    pub fn warp(&self, uv: DVec2) -> Warp<'_> {
        Warp {
            tree: self,
            uv,
            next: Some((self.root(), self.bounds())),
        }
    }
}

impl Iterator for Warp<'_> {
    type Item = DVec2;

    fn next(&mut self) -> Option<DVec2> {
        let (key, bounds) = self.next.take()?;
        let point = bounds.evaluate(self.uv);

        if let Some(children) = self.tree.nodes[key].children {
            let d = children.map(|c| self.tree.nodes[c].density);

            let x = choose(&mut self.uv.x, probability(d[0] + d[2], d[1] + d[3]));
            let y = choose(&mut self.uv.y, probability(d[x], d[x | 2]));
            let i = x | (y << 1);
            self.next = Some((children[i], bounds.child(i)));
        }

        Some(point)
    }
}

/// Probability of the lower half; uniform when both halves are empty.
fn probability(low: f64, high: f64) -> f64 {
    let total = low + high;
    if total > 0.0 {
        low / total
    } else {
        0.5
    }
}

/// Pick the lower (0) or upper (1) half and rescale `u` into it.
fn choose(u: &mut f64, p_low: f64) -> usize {
    if *u < p_low || p_low >= 1.0 {
        *u /= p_low;
        0
    } else {
        *u = (*u - p_low) / (1.0 - p_low);
        1
    }
}
