//! Guiding distribution training and the Metropolis demonstration chain.

use focal_core::{path_segments, CBox, Path, PathVertexType};
use focal_guiding::QuadTree;
use focal_math::DVec2;
use focal_tracer::{pathtrace, Pssmlt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::TrainingConfig;

/// Per-pass statistics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PassStats {
    pub iteration: usize,
    pub paths: usize,
    pub light_paths: usize,
    pub leaves: usize,
    pub depth: u32,
}

/// Outcome of the Metropolis chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainStats {
    pub proposals: usize,
    pub accepted: usize,
    /// Vertices of every accepted state, in chain order
    pub states: Vec<Path>,
}

fn reaches_light(path: &Path) -> bool {
    path.last().is_some_and(|v| v.kind == PathVertexType::Light)
}

/// Trace one sampling pass in parallel.
///
/// Sample `i` of pass `iteration` draws from its own generator seeded with
/// `seed + iteration * samples + i` (wrapping), so the result does not
/// depend on scheduling. Paths come back in sample order.
fn trace_pass(scene: &CBox, config: &TrainingConfig, iteration: usize) -> Vec<Path> {
    let samples = config.samples_per_iteration;
    let base = config
        .seed
        .wrapping_add((iteration as u64).wrapping_mul(samples as u64));

    (0..samples)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(base.wrapping_add(i as u64));
            pathtrace(scene, &mut rng, &config.trace)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Train a quadtree on the light-carrying segments of camera paths.
///
/// Splatting happens on the calling thread after each pass has been
/// traced; every pass but the last ends in a refine, the last in a
/// rebuild so the final topology carries densities from its own samples.
pub fn train(scene: &CBox, config: &TrainingConfig) -> (QuadTree, Vec<PassStats>) {
    let mut tree = QuadTree::new(config.bounds, config.quadtree);
    let mut stats = Vec::with_capacity(config.iterations);

    for iteration in 0..config.iterations {
        let paths = trace_pass(scene, config, iteration);

        let mut light_paths = 0;
        for path in paths.iter().filter(|p| reaches_light(p)) {
            light_paths += 1;
            for (a, b) in path_segments(path) {
                tree.splat_segment(a.p, b.p, 1.0);
            }
        }

        if iteration + 1 < config.iterations {
            tree.refine();
        } else {
            tree.rebuild();
        }

        let pass = PassStats {
            iteration,
            paths: paths.len(),
            light_paths,
            leaves: tree.leaf_count(),
            depth: tree.depth(),
        };
        log::info!(
            "Pass {}: {} paths, {} reach the light, {} leaves, depth {}",
            pass.iteration,
            pass.paths,
            pass.light_paths,
            pass.leaves,
            pass.depth
        );
        stats.push(pass);
    }

    (tree, stats)
}

/// Warp the centers of a `resolution²` grid through the tree.
pub fn warp_grid(tree: &QuadTree, resolution: usize) -> Vec<DVec2> {
    let n = resolution as f64;
    (0..resolution)
        .flat_map(|j| (0..resolution).map(move |i| (i, j)))
        .filter_map(|(i, j)| {
            let uv = DVec2::new((i as f64 + 0.5) / n, (j as f64 + 0.5) / n);
            tree.warp(uv).last()
        })
        .collect()
}

/// Run a primary sample space Metropolis chain over camera paths.
///
/// A proposal is a success when its scattering path reaches the light;
/// successful proposals are accepted with the sampler's coin flip. The
/// chain starts from the first successful fresh sample.
pub fn run_chain(scene: &CBox, config: &TrainingConfig) -> ChainStats {
    let mut sampler = Pssmlt::with_seed(config.seed);
    let mut chain = ChainStats {
        proposals: 0,
        accepted: 0,
        states: Vec::new(),
    };

    let mut bootstrapped = false;
    for _ in 0..config.mlt_chain_length {
        if bootstrapped {
            sampler.start_iteration();
        }
        chain.proposals += 1;

        let paths = pathtrace(scene, &mut sampler, &config.trace);
        let success = paths.last().is_some_and(reaches_light);

        if success && (!bootstrapped || sampler.random_accept()) {
            sampler.accept();
            bootstrapped = true;
            chain.accepted += 1;
            chain.states.extend(paths.last().cloned());
        } else {
            sampler.reject();
        }
    }

    log::info!(
        "Metropolis chain accepted {} of {} proposals",
        chain.accepted,
        chain.proposals
    );
    chain
}
