//! Light path vertices.

use focal_math::DVec2;
use serde::{Deserialize, Serialize};

/// How a ray terminated or interacted at a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathVertexType {
    Camera,
    Diffuse,
    Specular,
    Light,
    Miss,
}

/// A single vertex of a traced light path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathVertex {
    /// Position of the vertex
    pub p: DVec2,
    /// Surface normal, facing against the incoming ray (meaningless for misses)
    pub n: DVec2,
    pub kind: PathVertexType,
    /// True if the vertex was reached by a next-event-estimation connection
    #[serde(default)]
    pub nee: bool,
}

impl PathVertex {
    pub fn new(p: DVec2, n: DVec2, kind: PathVertexType) -> Self {
        Self {
            p,
            n,
            kind,
            nee: false,
        }
    }

    /// The same vertex, tagged as a next-event-estimation connection.
    pub fn into_nee(self) -> Self {
        Self { nee: true, ..self }
    }
}

/// Ordered vertices from the sampled origin to the terminating vertex.
pub type Path = Vec<PathVertex>;

/// Consecutive vertex pairs of a path, i.e. its segments.
pub fn path_segments(path: &[PathVertex]) -> impl Iterator<Item = (&PathVertex, &PathVertex)> {
    path.windows(2).map(|w| (&w[0], &w[1]))
}
