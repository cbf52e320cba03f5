//! Training run configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use focal_guiding::{GuidePathConfig, QuadTreeConfig};
use focal_math::{Bounds2, DVec2};
use focal_tracer::TraceConfig;
use serde::{Deserialize, Serialize};

/// Everything a training run needs. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Scene JSON; the default Cornell box when absent
    pub scene: Option<PathBuf>,
    pub trace: TraceConfig,
    /// Region covered by the quadtree
    pub bounds: Bounds2,
    pub quadtree: QuadTreeConfig,
    /// Sampling passes; every pass but the last ends with a refine
    pub iterations: usize,
    pub samples_per_iteration: usize,
    pub seed: u64,
    /// Warped samples are drawn on a `warp_resolution²` grid
    pub warp_resolution: usize,
    /// Report JSON; only a summary is logged when absent
    pub output: Option<PathBuf>,
    /// Proposals of the Metropolis demonstration chain
    pub mlt_chain_length: usize,
    pub guide_paths: GuidePathConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            scene: None,
            trace: TraceConfig::default(),
            bounds: Bounds2::new(DVec2::splat(-600.0), DVec2::splat(600.0)),
            quadtree: QuadTreeConfig::default(),
            iterations: 8,
            samples_per_iteration: 4096,
            seed: 0,
            warp_resolution: 32,
            output: None,
            mlt_chain_length: 1000,
            guide_paths: GuidePathConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}
