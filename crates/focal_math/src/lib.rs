// Re-export glam for convenience
pub use glam::*;

// Focal math types
mod bounds;
mod circle;
mod interval;
mod line;
mod ray;
mod vector;

pub use bounds::Bounds2;
pub use circle::Circle2;
pub use interval::Interval;
pub use line::Line2;
pub use ray::Ray2;
pub use vector::{
    direction, homogeneous_project, polar, reflect, refract, sample_hemicircle,
};
