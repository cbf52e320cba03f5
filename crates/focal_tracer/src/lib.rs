//! Focal Tracer - 2D path tracing and light tracing
//!
//! Unidirectional samplers over a [`CBox`] scene with next-event
//! estimation, plus the random number sources that drive them:
//! plain PRNGs, stratified and replayed sequences, and a primary sample
//! space Metropolis sampler.
//!
//! Entropy is threaded explicitly through the [`NextFloat`] trait; nothing
//! here touches global random state.

mod pssmlt;
mod random;
mod transport;

pub use pssmlt::{Pssmlt, PrimarySample, DEFAULT_STEP_SIZE};
pub use random::{FakeRandom, NextFloat, StratifiedRandom};
pub use transport::{lighttrace, pathtrace, TraceConfig};

/// Re-export the scene and path types the samplers produce
pub use focal_core::{CBox, Path, PathVertex, PathVertexType};
