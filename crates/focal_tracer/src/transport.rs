//! Unidirectional transport: path tracing from the camera and light
//! tracing from the light.
//!
//! Both samplers walk a single chain of bounces but may complete several
//! paths per call: every non-specular bounce can add a next-event
//! estimation (NEE) side path that connects straight to the opposite end,
//! while the chain itself keeps going. The scattering path is always the
//! last element of the returned list.

use std::f64::consts::TAU;

use focal_core::{CBox, Path, PathVertex, PathVertexType};
use focal_math::{direction, polar, reflect, sample_hemicircle, Circle2, DVec2, Ray2};
use serde::{Deserialize, Serialize};

use crate::NextFloat;

/// NEE connections count as unoccluded if they land this close to the
/// expected point on the target disc.
const NEE_TOLERANCE: f64 = 1.0;

/// Sampler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Connect every non-specular bounce to the opposite end of the path
    pub use_nee: bool,
    /// Number of traced segments after which the path is cut off as a miss
    pub max_depth: u32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            use_nee: true,
            max_depth: 10,
        }
    }
}

/// The end of the path a walk is trying to reach.
struct Target<'a> {
    disc: &'a Circle2,
    terminal: PathVertexType,
    ignore_camera: bool,
}

/// Trace a path starting on the camera aperture.
///
/// The first random number picks the emission angle inside the camera
/// cone `camera_dir ± camera_spread / 2`, every diffuse bounce consumes one
/// more. Paths end on `Light` or `Miss`.
pub fn pathtrace(scene: &CBox, rng: &mut dyn NextFloat, config: &TraceConfig) -> Vec<Path> {
    let angle = (scene.camera_dir + scene.camera_spread * (rng.next_float() - 0.5)).to_radians();
    let d = polar(angle, 1.0);
    let o = Ray2::new(scene.camera.center, d).at(scene.camera.radius);

    let target = Target {
        disc: &scene.light,
        terminal: PathVertexType::Light,
        ignore_camera: true,
    };
    let origin = PathVertex::new(o, d, PathVertexType::Camera);
    walk(scene, Ray2::new(o, d), origin, &target, rng, config)
}

/// Trace a path starting on the light.
///
/// The first random number picks the emission angle over the full circle.
/// Paths end on `Camera` or `Miss`.
pub fn lighttrace(scene: &CBox, rng: &mut dyn NextFloat, config: &TraceConfig) -> Vec<Path> {
    let d = polar(TAU * rng.next_float(), 1.0);
    let o = Ray2::new(scene.light.center, d).at(scene.light.radius);

    let target = Target {
        disc: &scene.camera,
        terminal: PathVertexType::Camera,
        ignore_camera: false,
    };
    let origin = PathVertex::new(o, d, PathVertexType::Light);
    walk(scene, Ray2::new(o, d), origin, &target, rng, config)
}

fn walk(
    scene: &CBox,
    mut ray: Ray2,
    origin: PathVertex,
    target: &Target,
    rng: &mut dyn NextFloat,
    config: &TraceConfig,
) -> Vec<Path> {
    let mut path: Path = vec![origin];
    let mut paths = Vec::new();

    for depth in 1.. {
        let mut isect = scene.intersect(&ray, target.ignore_camera);
        let mut is_done = isect.kind == PathVertexType::Miss || isect.kind == target.terminal;
        if depth >= config.max_depth && !is_done {
            log::trace!("Path cut off at depth {}", depth);
            isect.kind = PathVertexType::Miss;
            is_done = true;
        }
        path.push(isect);
        if is_done {
            break;
        }

        if config.use_nee && isect.kind != PathVertexType::Specular {
            if let Some(connection) = connect(scene, isect.p, target) {
                let mut nee_path = path.clone();
                nee_path.push(connection);
                paths.push(nee_path);
            }
        }

        ray.o = isect.p;
        ray.d = if isect.kind == PathVertexType::Specular {
            reflect(isect.n, -ray.d)
        } else {
            sample_hemicircle(isect.n, rng.next_float())
        };
    }

    paths.push(path);
    paths
}

/// Shadow ray from `p` towards the center of the target disc.
///
/// Returns the NEE vertex if the ray reaches the near side of the disc.
fn connect(scene: &CBox, p: DVec2, target: &Target) -> Option<PathVertex> {
    let d = direction(p, target.disc.center);
    let expected = target.disc.center - d * target.disc.radius;

    let isect = scene.intersect(&Ray2::new(p, d), target.ignore_camera);
    (isect.p.distance(expected) < NEE_TOLERANCE).then(|| isect.into_nee())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FakeRandom;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pathtrace_reproduces_example_path() {
        let scene = CBox::default();
        let mut rng = FakeRandom::new(vec![0.9, 0.2, 0.05]);
        let config = TraceConfig {
            use_nee: false,
            max_depth: 2,
        };

        let paths = pathtrace(&scene, &mut rng, &config);
        assert_eq!(paths.len(), 1);

        let path = &paths[0];
        let kinds: Vec<_> = path.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PathVertexType::Camera,
                PathVertexType::Diffuse,
                PathVertexType::Miss
            ]
        );

        // Leaves the aperture at 36 degrees
        assert!((path[0].p - DVec2::new(-483.819660, 11.755705)).length() < 1e-5);
        // Bounces off the floor
        assert!((path[1].p - DVec2::new(-87.085424, 300.0)).length() < 1e-5);
        assert!((path[1].n - -DVec2::Y).length() < 1e-12);
        // Cut off on the left side of the small box
        assert!((path[2].p - DVec2::new(60.0, 193.136184)).length() < 1e-5);
    }

    #[test]
    fn test_pathtrace_is_deterministic() {
        let scene = CBox::default();
        let config = TraceConfig::default();

        let a = pathtrace(&scene, &mut StdRng::seed_from_u64(3), &config);
        let b = pathtrace(&scene, &mut StdRng::seed_from_u64(3), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_pathtrace_terminates_within_max_depth() {
        let scene = CBox::default();
        let config = TraceConfig {
            use_nee: true,
            max_depth: 4,
        };
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let paths = pathtrace(&scene, &mut rng, &config);
            let primary = paths.last().unwrap();

            assert!(primary.len() <= config.max_depth as usize + 1);
            assert_eq!(primary[0].kind, PathVertexType::Camera);
            let last = primary.last().unwrap().kind;
            assert!(last == PathVertexType::Miss || last == PathVertexType::Light);
            assert!(primary.iter().all(|v| !v.nee));
        }
    }

    #[test]
    fn test_pathtrace_without_nee_returns_single_path() {
        let scene = CBox::default();
        let config = TraceConfig {
            use_nee: false,
            max_depth: 10,
        };
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..200 {
            assert_eq!(pathtrace(&scene, &mut rng, &config).len(), 1);
        }
    }

    #[test]
    fn test_nee_connections_are_unoccluded() {
        let scene = CBox::default();
        let config = TraceConfig::default();
        let mut rng = StdRng::seed_from_u64(1234);
        let mut connections = 0;

        for _ in 0..2000 {
            for path in pathtrace(&scene, &mut rng, &config) {
                let last = path[path.len() - 1];
                if !last.nee {
                    continue;
                }
                connections += 1;
                assert_eq!(last.kind, PathVertexType::Light);

                let from = path[path.len() - 2];
                assert_ne!(from.kind, PathVertexType::Specular);

                let ray = Ray2::targeting(from.p, scene.light.center);
                let t_light = scene.light.intersect(&ray);
                for wall in &scene.walls {
                    let t = wall.line.intersect(&ray);
                    assert!(!(t > 1.0 && t < t_light), "wall occludes NEE connection");
                }

                // Only the final vertex is tagged
                assert!(path[..path.len() - 1].iter().all(|v| !v.nee));
            }
        }

        assert!(connections > 0);
    }

    #[test]
    fn test_lighttrace_paths() {
        let scene = CBox::default();
        let config = TraceConfig::default();
        let mut rng = StdRng::seed_from_u64(99);
        let mut reached_camera = 0;

        for _ in 0..2000 {
            let paths = lighttrace(&scene, &mut rng, &config);
            let primary = paths.last().unwrap();
            assert_eq!(primary[0].kind, PathVertexType::Light);
            assert!((primary[0].p.distance(scene.light.center) - scene.light.radius).abs() < 1e-9);

            for path in &paths {
                let last = path.last().unwrap();
                if last.nee {
                    assert_eq!(last.kind, PathVertexType::Camera);
                    reached_camera += 1;
                }
            }

            let end = primary.last().unwrap().kind;
            assert!(end == PathVertexType::Miss || end == PathVertexType::Camera);
        }

        assert!(reached_camera > 0);
    }

    #[test]
    fn test_max_depth_forces_miss() {
        let scene = CBox::default();
        let config = TraceConfig {
            use_nee: false,
            max_depth: 1,
        };

        // Straight into the floor
        let mut rng = FakeRandom::new(vec![1.0]);
        let paths = pathtrace(&scene, &mut rng, &config);

        let path = &paths[0];
        assert_eq!(path.len(), 2);
        assert_eq!(path[1].kind, PathVertexType::Miss);
        assert!((path[1].p.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_trace_config_from_json() {
        let config: TraceConfig = serde_json::from_str(r#"{ "max_depth": 3 }"#).unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(config.use_nee);
    }
}
