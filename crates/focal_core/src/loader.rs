//! JSON scene loading.
//!
//! Scene files describe a [`CBox`]. Every field is optional and falls
//! back to the default box:
//!
//! ```json
//! {
//!     "walls": [
//!         { "from": [-300, 300], "to": [300, 300] },
//!         { "from": [300, -300], "to": [-300, -300], "mirror": true }
//!     ],
//!     "light": { "center": [0, -200], "radius": 25 },
//!     "camera_spread": 45
//! }
//! ```

use std::path::Path;

use thiserror::Error;

use crate::scene::CBox;

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for loading operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Load a scene from a JSON file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> SceneResult<CBox> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let scene = load_scene_from_str(&contents)?;
    log::info!(
        "Loaded scene {} with {} walls",
        path.display(),
        scene.walls.len()
    );
    Ok(scene)
}

/// Parse a scene from a JSON string.
pub fn load_scene_from_str(json: &str) -> SceneResult<CBox> {
    let scene: CBox = serde_json::from_str(json)?;
    if scene.walls.is_empty() {
        log::warn!("Scene has no walls, every path will miss");
    }
    Ok(scene)
}
