//! Pointer tracking and ray casting.
//!
//! The probe keeps only the most recent pointer position (latest value wins,
//! no queuing) and turns raw button events into a single edge-triggered
//! primary-action signal per physical click. Ray casting against the scene
//! mesh uses Möller–Trumbore intersection, nearest hit by ray distance.

use crate::camera::{CameraPose, Projector, Ray, Viewport};
use crate::mesh::TriMesh;
use glam::Vec2;

const RAY_EPSILON: f32 = 1e-7;

/// Nearest intersection of a pointer ray with the scene mesh.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Distance from the ray origin.
    pub distance: f32,
    /// World-space intersection point.
    pub point: glam::Vec3,
    /// Index of the hit triangle.
    pub triangle: usize,
}

#[derive(Debug, Default)]
pub struct PointerProbe {
    cursor_px: Option<Vec2>,
    button_down: bool,
    click_armed: bool,
    scroll_fraction: f32,
}

impl PointerProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer-move event. Overwrites any previous position.
    pub fn on_cursor_moved(&mut self, px: Vec2) {
        self.cursor_px = Some(px);
    }

    /// Records a primary-button state change. A click is armed only on the
    /// released → pressed edge, so repeated raw press events for one physical
    /// click collapse into one signal.
    pub fn on_primary_button(&mut self, pressed: bool) {
        if pressed && !self.button_down {
            self.click_armed = true;
        }
        self.button_down = pressed;
    }

    /// Consumes the pending primary action, if any. At most one per click.
    pub fn take_click(&mut self) -> bool {
        std::mem::take(&mut self.click_armed)
    }

    /// Latest pointer position in viewport pixels, if the pointer has ever
    /// been seen.
    pub fn cursor_px(&self) -> Option<Vec2> {
        self.cursor_px
    }

    /// Records the page-scroll fraction in [0, 1]; latest value wins.
    pub fn set_scroll_fraction(&mut self, fraction: f32) {
        self.scroll_fraction = fraction.clamp(0.0, 1.0);
    }

    pub fn scroll_fraction(&self) -> f32 {
        self.scroll_fraction
    }

    /// Casts the pointer ray against the mesh, returning the nearest hit.
    pub fn cast_ray(
        &self,
        pose: &CameraPose,
        viewport: Viewport,
        mesh: &TriMesh,
    ) -> Option<RayHit> {
        let cursor = self.cursor_px?;
        let ray = Projector::pointer_ray(cursor, pose, viewport);
        intersect_mesh(&ray, mesh)
    }
}

/// Nearest ray/mesh intersection by distance along the ray.
pub fn intersect_mesh(ray: &Ray, mesh: &TriMesh) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;

    for i in 0..mesh.triangle_count() {
        let (a, b, c) = mesh.triangle(i);
        if let Some(t) = intersect_triangle(ray, a, b, c) {
            if best.map_or(true, |h| t < h.distance) {
                best = Some(RayHit {
                    distance: t,
                    point: ray.at(t),
                    triangle: i,
                });
            }
        }
    }

    best
}

/// Möller–Trumbore ray/triangle intersection. Returns the ray parameter of
/// the hit, or None for misses and rays parallel to the triangle plane.
fn intersect_triangle(ray: &Ray, a: glam::Vec3, b: glam::Vec3, c: glam::Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;

    let p = ray.dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > RAY_EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn z_plane_quad(z: f32) -> TriMesh {
        TriMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(1.0, 1.0, z),
                Vec3::new(-1.0, 1.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn click_fires_once_per_physical_press() {
        let mut probe = PointerProbe::new();

        probe.on_primary_button(true);
        // A duplicated raw press without an intervening release is ignored.
        probe.on_primary_button(true);
        assert!(probe.take_click());
        assert!(!probe.take_click());

        probe.on_primary_button(false);
        probe.on_primary_button(true);
        assert!(probe.take_click());
    }

    #[test]
    fn cursor_is_latest_wins() {
        let mut probe = PointerProbe::new();
        assert_eq!(probe.cursor_px(), None);
        probe.on_cursor_moved(Vec2::new(10.0, 10.0));
        probe.on_cursor_moved(Vec2::new(42.0, 7.0));
        assert_eq!(probe.cursor_px(), Some(Vec2::new(42.0, 7.0)));
    }

    #[test]
    fn ray_hits_facing_triangle() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        };
        let hit = intersect_mesh(&ray, &z_plane_quad(0.0)).unwrap();
        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert!(hit.point.distance(Vec3::ZERO) < 1e-5);
    }

    #[test]
    fn ray_misses_offset_geometry() {
        let ray = Ray {
            origin: Vec3::new(5.0, 5.0, 5.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(intersect_mesh(&ray, &z_plane_quad(0.0)).is_none());
    }

    #[test]
    fn nearest_of_two_surfaces_wins() {
        let mut mesh = z_plane_quad(0.0);
        let near = z_plane_quad(2.0);
        let base = mesh.positions.len() as u32;
        mesh.positions.extend(near.positions);
        mesh.indices
            .extend(near.indices.iter().map(|t| t.map(|i| i + base)));

        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        };
        let hit = intersect_mesh(&ray, &mesh).unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn geometry_behind_ray_is_ignored() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -5.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(intersect_mesh(&ray, &z_plane_quad(0.0)).is_none());
    }

    #[test]
    fn cast_ray_uses_latest_cursor() {
        let mut probe = PointerProbe::new();
        let pose = CameraPose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 50.0);
        let vp = Viewport::new(800.0, 600.0);
        let mesh = z_plane_quad(0.0);

        // No cursor seen yet: nothing to cast.
        assert!(probe.cast_ray(&pose, vp, &mesh).is_none());

        probe.on_cursor_moved(Vec2::new(400.0, 300.0));
        let hit = probe.cast_ray(&pose, vp, &mesh).unwrap();
        assert!((hit.distance - 10.0).abs() < 1e-3);
    }
}
