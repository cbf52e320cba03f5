//! Focal - trains a path guiding quadtree on the Cornell box and writes
//! the learned distribution, warped samples, guide paths and a Metropolis
//! chain to JSON.
//!
//! Usage: `focal [config.json]`

mod config;
mod training;

use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use focal_core::{load_scene, CBox, Path};
use focal_guiding::{find_guide_paths, QuadTreePatch};
use focal_math::DVec2;
use serde::Serialize;

use crate::config::TrainingConfig;
use crate::training::{run_chain, train, warp_grid, ChainStats, PassStats};

#[derive(Serialize)]
struct Report {
    config: TrainingConfig,
    passes: Vec<PassStats>,
    leaves: Vec<QuadTreePatch>,
    warped: Vec<DVec2>,
    guide_paths: Vec<Path>,
    chain: ChainStats,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => TrainingConfig::load(&path)?,
        None => TrainingConfig::default(),
    };

    let scene = match &config.scene {
        Some(path) => load_scene(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => CBox::default(),
    };

    log::info!(
        "Training on {} walls: {} passes of {} samples",
        scene.walls.len(),
        config.iterations,
        config.samples_per_iteration
    );

    let (tree, passes) = train(&scene, &config);
    let warped = warp_grid(&tree, config.warp_resolution);
    let guide_paths = find_guide_paths(&scene, &config.guide_paths);
    let chain = run_chain(&scene, &config);

    log::info!(
        "Trained quadtree: {} leaves, depth {}",
        tree.leaf_count(),
        tree.depth()
    );

    let Some(output) = config.output.clone() else {
        return Ok(());
    };

    let report = Report {
        config,
        passes,
        leaves: tree.visualize(),
        warped,
        guide_paths,
        chain,
    };

    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Wrote report to {}", output.display());

    Ok(())
}
