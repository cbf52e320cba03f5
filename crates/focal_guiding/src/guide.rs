//! Helpers for building and plotting guiding distributions, and the search
//! for example paths that reach the light.

use std::f64::consts::TAU;

use focal_core::{CBox, Path, PathVertex, PathVertexType};
use focal_math::{direction, polar, DVec2};
use focal_tracer::{pathtrace, StratifiedRandom, TraceConfig};
use serde::{Deserialize, Serialize};

/// Minimum cosine between the final segment and the light normal for a
/// path to count as a head-on hit.
const MIN_COS_LIGHT: f64 = 0.9;

/// First bounces below this height are considered degenerate.
const MAX_FIRST_BOUNCE_Y: f64 = 100.0;

pub fn saturate(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Center angle of bin `i` out of `n` equal bins around the circle.
pub fn theta_linspace(i: usize, n: usize) -> f64 {
    TAU * ((i as f64 + 0.5) / n as f64)
}

/// Centers of `n` equal bins of `[0, 1]`.
pub fn linspace(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect()
}

/// Linearly interpolate `v` at fractional index `i`, wrapping around.
pub fn linear_lookup(v: &[f64], i: f64) -> f64 {
    if v.is_empty() || !i.is_finite() {
        return f64::NAN;
    }
    let base = i.floor();
    let frac = i - base;
    let n = v.len() as i64;
    let lo = (base as i64).rem_euclid(n) as usize;
    let hi = (base as i64 + 1).rem_euclid(n) as usize;
    (1.0 - frac) * v[lo] + frac * v[hi]
}

/// Draw fractional bin indices from the categorical distribution `weights`.
///
/// Each uniform picks a bin by inverse CDF; the fractional part is the
/// position of the uniform inside the chosen bin. Uniforms the scan cannot
/// place (rounding at the top end, or an all-zero weight vector) map to 0.
pub fn sample(weights: &[f64], uniforms: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    let pmf: Vec<f64> = weights.iter().map(|w| w / sum).collect();

    uniforms
        .iter()
        .map(|&u| {
            let mut u = u;
            for (i, &p) in pmf.iter().enumerate() {
                if u < p {
                    return i as f64 + u / p;
                }
                u -= p;
            }
            0.0
        })
        .collect()
}

/// Closed polyline of a polar histogram.
///
/// Bin `i` is drawn at its center angle with radius `scale * sqrt(radii[i])`
/// so that the enclosed area is proportional to the bin value. The first
/// point is repeated at the end.
pub fn polar_plot(radii: &[f64], scale: f64) -> Vec<DVec2> {
    let n = radii.len();
    if n == 0 {
        return Vec::new();
    }
    (0..=n)
        .map(|i| polar(theta_linspace(i, n), scale * radii[i % n].sqrt()))
        .collect()
}

/// Search parameters of [`find_guide_paths`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidePathConfig {
    /// Camera direction in degrees
    pub dir: f64,
    /// Camera cone opening in degrees
    pub spread: f64,
    pub candidates: usize,
    pub seed: u64,
    pub max_depth: u32,
    /// Reject paths whose first bounce is the light or lies at floor level
    /// (`y > 100`)
    pub y_block: bool,
}

impl Default for GuidePathConfig {
    fn default() -> Self {
        Self {
            dir: -4.5,
            spread: 0.0,
            candidates: 1000,
            seed: 1234,
            max_depth: 3,
            y_block: true,
        }
    }
}

/// Trace `config.candidates` camera paths without NEE and keep those that
/// hit the light nearly head-on.
///
/// The emission angle is stratified over the candidates; the bounces are
/// pseudo-random from `config.seed`. The scene itself is not modified.
pub fn find_guide_paths(scene: &CBox, config: &GuidePathConfig) -> Vec<Path> {
    let scene = scene.with_camera_aim(config.dir, config.spread);
    let trace_config = TraceConfig {
        use_nee: false,
        max_depth: config.max_depth,
    };

    let mut rng = StratifiedRandom::seeded(config.seed, config.candidates);
    let mut paths = Vec::new();
    for _ in 0..config.candidates {
        rng.start();
        let Some(path) = pathtrace(&scene, &mut rng, &trace_config).pop() else {
            continue;
        };
        if is_guide_path(&path, config.y_block) {
            paths.push(path);
        }
    }

    log::info!(
        "Found {} guide paths among {} candidates",
        paths.len(),
        config.candidates
    );
    paths
}

fn is_guide_path(path: &[PathVertex], y_block: bool) -> bool {
    let [.., before, last] = path else {
        return false;
    };
    if last.kind != PathVertexType::Light {
        return false;
    }

    let cos_light = -direction(before.p, last.p).dot(last.n);
    if cos_light < MIN_COS_LIGHT {
        return false;
    }

    if y_block {
        let first = &path[1];
        if first.kind == PathVertexType::Light || first.p.y > MAX_FIRST_BOUNCE_Y {
            return false;
        }
    }
    true
}
