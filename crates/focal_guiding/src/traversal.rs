//! Front-to-back ray traversal of the quadtree leaves.
//!
//! Parametric traversal after Revelles et al., "An efficient parametric
//! algorithm for octree traversal", reduced to two dimensions. Rays with a
//! negative direction component are mirrored about the tree center and the
//! child indices are flipped back with the mask `a`.

use focal_math::{Bounds2, DVec2, Interval, Ray2};

use crate::quadtree::{NodeKey, QuadTree, QuadTreePatch};

/// Replaces exactly zero direction components so the slab distances stay
/// finite in sign.
const AXIS_NUDGE: f64 = 1e-10;

/// Sentinel returned by [`next_node`] once the ray leaves the parent.
const EXIT: usize = 4;

/// A leaf crossed by a ray and the parametric range spent inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTreeTraversal {
    pub patch: QuadTreePatch,
    pub t0: f64,
    pub t1: f64,
}

impl QuadTreeTraversal {
    pub fn interval(&self) -> Interval {
        Interval::new(self.t0, self.t1)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    key: NodeKey,
    bounds: Bounds2,
    /// Slab entry distances in `min`, exit distances in `max`
    t: Bounds2,
}

/// Iterator over the leaves crossed by a ray, see [`QuadTree::traverse`].
#[derive(Debug, Clone)]
pub struct Traverse<'a> {
    tree: &'a QuadTree,
    a: usize,
    stack: Vec<Frame>,
}

impl QuadTree {
    /// Visit the leaves crossed by `ray` in order of increasing `t`.
    ///
    /// The ray is treated as a line: leaves behind the origin are visited
    /// too, with negative distances. Callers that need only the forward
    /// part filter on `t1`.
    pub fn traverse(&self, ray: &Ray2) -> Traverse<'_> {
        let bounds = self.bounds();
        let mut o = ray.o;
        let mut d = ray.d;
        if d.x == 0.0 {
            d.x = AXIS_NUDGE;
        }
        if d.y == 0.0 {
            d.y = AXIS_NUDGE;
        }

        let mut a = 0;
        if d.x < 0.0 {
            o.x = bounds.min.x + bounds.max.x - o.x;
            d.x = -d.x;
            a |= 1;
        }
        if d.y < 0.0 {
            o.y = bounds.min.y + bounds.max.y - o.y;
            d.y = -d.y;
            a |= 2;
        }

        let t_near = (bounds.min - o) / d;
        let t_far = (bounds.max - o) / d;

        let mut stack = Vec::new();
        if t_near.max_element() < t_far.min_element() {
            stack.push(Frame {
                key: self.root(),
                bounds,
                t: Bounds2::new(t_near, t_far),
            });
        }

        Traverse {
            tree: self,
            a,
            stack,
        }
    }
}

impl Iterator for Traverse<'_> {
    type Item = QuadTreeTraversal;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            let Some(children) = self.tree.nodes[frame.key].children else {
                return Some(QuadTreeTraversal {
                    patch: self.tree.patch(frame.key, frame.bounds),
                    t0: frame.t.min.max_element(),
                    t1: frame.t.max.min_element(),
                });
            };

            let t_mid = frame.t.center();
            let mut crossed = [None; 3];
            let mut curr = first_node(frame.t.min, t_mid);
            for slot in &mut crossed {
                let mut t = frame.t;
                if curr & 1 != 0 {
                    t.min.x = t_mid.x;
                } else {
                    t.max.x = t_mid.x;
                }
                if curr & 2 != 0 {
                    t.min.y = t_mid.y;
                } else {
                    t.max.y = t_mid.y;
                }

                let child = self.a ^ curr;
                *slot = Some(Frame {
                    key: children[child],
                    bounds: frame.bounds.child(child),
                    t,
                });

                curr = next_node(curr, t.max);
                if curr == EXIT {
                    break;
                }
            }

            self.stack.extend(crossed.into_iter().rev().flatten());
        }
        None
    }
}

/// The (mirrored) child the ray enters first.
fn first_node(t_near: DVec2, t_mid: DVec2) -> usize {
    let mut node = 0;
    if t_near.x < t_near.y {
        // Entered through the y slab
        if t_mid.x < t_near.y {
            node |= 1;
        }
    } else if t_mid.y < t_near.x {
        node |= 2;
    }
    node
}

/// The (mirrored) sibling the ray enters after leaving `curr`.
fn next_node(curr: usize, t_far: DVec2) -> usize {
    let exit = if t_far.x < t_far.y { 1 } else { 2 };
    if curr & exit != 0 {
        EXIT
    } else {
        curr | exit
    }
}
