//! Focal Core - 2D scene description and light path types.
//!
//! This crate provides:
//!
//! - **Scene types**: `CBox` with its walls, disc light and disc camera
//! - **Path types**: `PathVertex`, `PathVertexType`, `Path`
//! - **Scene loading**: JSON scene files via serde
//!
//! # Example
//!
//! ```ignore
//! use focal_core::{load_scene, Ray2};
//!
//! let scene = load_scene("cbox.json")?;
//! let hit = scene.intersect(&ray, true);
//! println!("hit {:?} at {}", hit.kind, hit.p);
//! ```

pub mod loader;
pub mod path;
pub mod scene;

// Re-export commonly used types
pub use loader::{load_scene, load_scene_from_str, SceneError};
pub use path::{path_segments, Path, PathVertex, PathVertexType};
pub use scene::{CBox, Wall, MISS_DISTANCE};

/// Re-export the math types scenes are built from
pub use focal_math::{Bounds2, Circle2, DVec2, Line2, Ray2};
