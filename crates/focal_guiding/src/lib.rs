//! Focal Guiding - adaptive quadtree densities for path guiding
//!
//! A [`QuadTree`] learns a piecewise-constant density over the plane from
//! splatted path segments, adapts its resolution to where the mass is, and
//! serves as a sampling distribution ([`QuadTree::warp`]) and a pdf along
//! rays ([`QuadTree::traverse`]).
//!
//! A training pass splats every segment and then either adapts the tree
//! with `refine` or only updates densities with `rebuild`. Both consume
//! the accumulated mass, so a pass ends with exactly one of them:
//!
//! ```ignore
//! for path in paths {
//!     for (a, b) in path_segments(&path) {
//!         tree.splat_segment(a.p, b.p, 1.0);
//!     }
//! }
//! tree.refine();
//! ```

mod guide;
mod quadtree;
mod splat;
mod traversal;
mod warp;

pub use guide::{
    find_guide_paths, linear_lookup, linspace, polar_plot, sample, saturate, theta_linspace,
    GuidePathConfig,
};
pub use quadtree::{NodeKey, QuadTree, QuadTreeConfig, QuadTreeNode, QuadTreePatch};
pub use splat::radial_measure;
pub use traversal::{QuadTreeTraversal, Traverse};
pub use warp::Warp;
