//! The 2D box scene: walls, a disc light and a disc camera aperture.
//!
//! Mirrors the classic Cornell box in the plane. Walls are finite
//! segments that reflect either diffusely or as a perfect mirror.

use focal_math::{Circle2, DVec2, Interval, Line2, Ray2};
use serde::{Deserialize, Serialize};

use crate::path::{PathVertex, PathVertexType};

/// Ray parameter of the synthetic vertex recorded for rays that leave the scene.
pub const MISS_DISTANCE: f64 = 2000.0;

/// Hits at or below this ray parameter are ignored.
///
/// Rays leave surfaces without an offset, so the surface they start on
/// would otherwise be hit again at `t ≈ 0`.
const MIN_HIT_T: f64 = 1.0;

/// A wall segment of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    #[serde(flatten)]
    pub line: Line2,
    /// Perfect mirror instead of a diffuse reflector
    #[serde(default)]
    pub mirror: bool,
}

impl Wall {
    /// Create a diffuse wall.
    pub fn new(from: DVec2, to: DVec2) -> Self {
        Self {
            line: Line2::new(from, to),
            mirror: false,
        }
    }

    /// Create a mirror wall.
    pub fn mirror(from: DVec2, to: DVec2) -> Self {
        Self {
            line: Line2::new(from, to),
            mirror: true,
        }
    }

    fn vertex_type(&self) -> PathVertexType {
        if self.mirror {
            PathVertexType::Specular
        } else {
            PathVertexType::Diffuse
        }
    }
}

/// What a candidate hit landed on, used to derive the normal afterwards.
#[derive(Clone, Copy)]
enum Surface<'a> {
    Wall(&'a Wall),
    Disc(&'a Circle2, PathVertexType),
}

impl Surface<'_> {
    fn normal(&self, p: DVec2) -> DVec2 {
        match self {
            Surface::Wall(wall) => wall.line.normal(),
            Surface::Disc(circle, _) => circle.normal(p),
        }
    }

    fn vertex_type(&self) -> PathVertexType {
        match self {
            Surface::Wall(wall) => wall.vertex_type(),
            Surface::Disc(_, kind) => *kind,
        }
    }
}

/// The box scene.
///
/// Angles (`camera_dir`, `camera_spread`) are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CBox {
    pub walls: Vec<Wall>,
    pub light: Circle2,
    pub camera: Circle2,
    /// Center of the emission cone of the camera
    pub camera_dir: f64,
    /// Full opening angle of the emission cone of the camera
    pub camera_spread: f64,
}

impl Default for CBox {
    fn default() -> Self {
        Self {
            walls: vec![
                // main box
                Wall::new(DVec2::new(-300.0, 300.0), DVec2::new(300.0, 300.0)),
                Wall::new(DVec2::new(300.0, 300.0), DVec2::new(300.0, -300.0)),
                Wall::mirror(DVec2::new(300.0, -300.0), DVec2::new(-300.0, -300.0)),
                // small box
                Wall::new(DVec2::new(60.0, 300.0), DVec2::new(60.0, 120.0)),
                Wall::new(DVec2::new(60.0, 120.0), DVec2::new(240.0, 120.0)),
                Wall::new(DVec2::new(240.0, 120.0), DVec2::new(240.0, 300.0)),
            ],
            light: Circle2::new(DVec2::new(0.0, -200.0), 25.0),
            camera: Circle2::new(DVec2::new(-500.0, 0.0), 20.0),
            camera_dir: 0.0,
            camera_spread: 90.0,
        }
    }
}

impl CBox {
    /// The default scene reduced to its floor.
    pub fn only_floor() -> Self {
        let mut scene = Self::default();
        scene.walls.truncate(1);
        scene
    }

    /// A copy of the scene with a different camera emission cone.
    pub fn with_camera_aim(&self, dir: f64, spread: f64) -> Self {
        Self {
            camera_dir: dir,
            camera_spread: spread,
            ..self.clone()
        }
    }

    /// Height of the ceiling, taken from the end of the second wall.
    ///
    /// Falls back to the camera height for scenes with fewer walls.
    pub fn ceiling_y(&self) -> f64 {
        self.walls
            .get(1)
            .map(|wall| wall.line.to.y)
            .unwrap_or(self.camera.center.y)
    }

    /// Mirror image of a point in the ceiling.
    pub fn mirror_at_ceiling(&self, p: DVec2) -> DVec2 {
        DVec2::new(p.x, 2.0 * self.ceiling_y() - p.y)
    }

    pub fn mirrored_camera(&self) -> Circle2 {
        Circle2::new(self.mirror_at_ceiling(self.camera.center), self.camera.radius)
    }

    pub fn mirrored_light(&self) -> Circle2 {
        Circle2::new(self.mirror_at_ceiling(self.light.center), self.light.radius)
    }

    /// Points where light paths concentrate: camera and light, and their
    /// images in the mirror ceiling.
    pub fn focal_points(&self) -> [DVec2; 4] {
        [
            self.camera.center,
            self.light.center,
            self.mirrored_camera().center,
            self.mirrored_light().center,
        ]
    }

    /// Find the closest surface along a ray.
    ///
    /// Considers all walls, the light and, unless `ignore_camera` is set,
    /// the camera. Only hits with ray parameter `t > 1` count. If nothing
    /// is hit a `Miss` vertex is placed at `t = MISS_DISTANCE` with normal
    /// `-d`. The returned normal always faces against the ray.
    pub fn intersect(&self, ray: &Ray2, ignore_camera: bool) -> PathVertex {
        let walls = self
            .walls
            .iter()
            .map(|wall| (wall.line.intersect(ray), Surface::Wall(wall)));
        let light = std::iter::once((
            self.light.intersect(ray),
            Surface::Disc(&self.light, PathVertexType::Light),
        ));
        let camera = (!ignore_camera).then(|| {
            (
                self.camera.intersect(ray),
                Surface::Disc(&self.camera, PathVertexType::Camera),
            )
        });

        let closest = walls
            .chain(light)
            .chain(camera)
            .fold(None::<(f64, Surface)>, |best, (t, surface)| {
                let closest_so_far = best.map_or(f64::INFINITY, |(best_t, _)| best_t);
                if Interval::new(MIN_HIT_T, closest_so_far).surrounds(t) {
                    Some((t, surface))
                } else {
                    best
                }
            });

        let mut vertex = match closest {
            Some((t, surface)) => {
                let p = ray.at(t);
                PathVertex::new(p, surface.normal(p), surface.vertex_type())
            }
            None => PathVertex::new(ray.at(MISS_DISTANCE), -ray.d, PathVertexType::Miss),
        };

        if vertex.n.dot(ray.d) > 0.0 {
            vertex.n = -vertex.n;
        }
        vertex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene() {
        let scene = CBox::default();
        assert_eq!(scene.walls.len(), 6);
        assert_eq!(scene.walls.iter().filter(|w| w.mirror).count(), 1);
        assert_eq!(scene.ceiling_y(), -300.0);
    }

    #[test]
    fn test_only_floor() {
        let scene = CBox::only_floor();
        assert_eq!(scene.walls.len(), 1);
        assert!(!scene.walls[0].mirror);
    }

    #[test]
    fn test_focal_points() {
        let scene = CBox::default();
        let points = scene.focal_points();
        assert_eq!(points[0], DVec2::new(-500.0, 0.0));
        assert_eq!(points[1], DVec2::new(0.0, -200.0));
        assert_eq!(points[2], DVec2::new(-500.0, -600.0));
        assert_eq!(points[3], DVec2::new(0.0, -400.0));
    }

    #[test]
    fn test_intersect_floor() {
        let scene = CBox::default();
        let ray = Ray2::new(DVec2::new(-100.0, 0.0), DVec2::Y);
        let hit = scene.intersect(&ray, true);

        assert_eq!(hit.kind, PathVertexType::Diffuse);
        assert!((hit.p - DVec2::new(-100.0, 300.0)).length() < 1e-9);
        // Normal faces back towards the ray origin
        assert!((hit.n - -DVec2::Y).length() < 1e-12);
    }

    #[test]
    fn test_intersect_mirror_ceiling() {
        let scene = CBox::default();
        let ray = Ray2::new(DVec2::new(-100.0, 0.0), -DVec2::Y);
        let hit = scene.intersect(&ray, true);

        assert_eq!(hit.kind, PathVertexType::Specular);
        assert!((hit.p.y - -300.0).abs() < 1e-9);
        assert!(hit.n.dot(ray.d) < 0.0);
    }

    #[test]
    fn test_intersect_light_before_ceiling() {
        let scene = CBox::default();
        let ray = Ray2::new(DVec2::ZERO, -DVec2::Y);
        let hit = scene.intersect(&ray, true);

        assert_eq!(hit.kind, PathVertexType::Light);
        assert!((hit.p - DVec2::new(0.0, -175.0)).length() < 1e-9);
        assert!((hit.n - DVec2::Y).length() < 1e-12);
    }

    #[test]
    fn test_intersect_ignores_camera_by_flag() {
        let scene = CBox::default();
        let ray = Ray2::new(DVec2::new(-200.0, 0.0), -DVec2::X);

        let ignored = scene.intersect(&ray, true);
        assert_eq!(ignored.kind, PathVertexType::Miss);

        let seen = scene.intersect(&ray, false);
        assert_eq!(seen.kind, PathVertexType::Camera);
        assert!((seen.p - DVec2::new(-480.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_intersect_miss() {
        let scene = CBox::default();
        let ray = Ray2::new(DVec2::new(-400.0, 0.0), DVec2::new(-1.0, 0.0));
        let hit = scene.intersect(&ray, true);

        assert_eq!(hit.kind, PathVertexType::Miss);
        assert_eq!(hit.p, DVec2::new(-2400.0, 0.0));
        assert_eq!(hit.n, DVec2::X);
    }

    #[test]
    fn test_intersect_skips_hits_within_unit_distance() {
        let scene = CBox::only_floor();
        // Leaving the floor must not hit the floor itself
        let ray = Ray2::new(DVec2::new(0.0, 300.0), DVec2::new(0.0, 0.5));
        let hit = scene.intersect(&ray, true);
        assert_eq!(hit.kind, PathVertexType::Miss);
    }

    #[test]
    fn test_mirrored_light() {
        let scene = CBox::default();
        let mirrored = scene.mirrored_light();
        assert_eq!(mirrored.center, DVec2::new(0.0, -400.0));
        assert_eq!(mirrored.radius, scene.light.radius);
    }
}
