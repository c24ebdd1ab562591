//! The fixed set of points of interest and their per-frame screen cache.
//!
//! The registry is the only owner of [`PointOfInterest`] records. Every frame
//! the projector refreshes each cached screen position and visibility flag;
//! hover resolution then runs entirely in screen space against that cache.

use crate::camera::{CameraPose, Projector, Viewport, OFFSCREEN};
use crate::config::SceneConfig;
use glam::{Vec2, Vec3};

/// Margin (pixels) outside the viewport within which an anchor still counts
/// as visible, so markers don't pop at the exact edge.
const VISIBLE_MARGIN_PX: f32 = 16.0;

/// Stable identifier of a POI: its registration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoiId(pub u32);

impl std::fmt::Display for PoiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "poi#{}", self.0)
    }
}

/// A fixed 3D anchor with associated overlay content.
///
/// Created once at scene setup and never destroyed; `screen` and `visible`
/// are refreshed every frame.
#[derive(Debug, Clone)]
pub struct PointOfInterest {
    pub id: PoiId,
    pub name: String,
    pub anchor: Vec3,
    /// Camera offset from the anchor when focused.
    pub focus_offset: Vec3,
    /// Content fragment shown by "view more".
    pub content_path: String,
    /// Cached screen position, recomputed every frame.
    pub screen: Vec2,
    /// False when behind the camera or outside the viewport; an invisible
    /// anchor is never hit-testable.
    pub visible: bool,
}

pub struct PoiRegistry {
    pois: Vec<PointOfInterest>,
    focus_fov_deg: f32,
}

impl PoiRegistry {
    pub fn from_config(config: &SceneConfig) -> Self {
        let pois = config
            .pois
            .iter()
            .enumerate()
            .map(|(i, p)| PointOfInterest {
                id: PoiId(i as u32),
                name: p.name.clone(),
                anchor: Vec3::from(p.anchor),
                focus_offset: Vec3::from(p.focus_offset),
                content_path: p.content_path.clone(),
                screen: OFFSCREEN,
                visible: false,
            })
            .collect();

        Self {
            pois,
            focus_fov_deg: config.focus.fov_y_deg,
        }
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    pub fn get(&self, id: PoiId) -> &PointOfInterest {
        &self.pois[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.pois.iter()
    }

    /// Recomputes every cached screen position and visibility flag for the
    /// current camera pose. Called once per frame before hit testing.
    pub fn refresh(&mut self, pose: &CameraPose, viewport: Viewport) {
        for poi in &mut self.pois {
            let projected = Projector::project(poi.anchor, pose, viewport);
            poi.screen = projected.px;
            poi.visible = projected.in_front
                && projected.px.x >= -VISIBLE_MARGIN_PX
                && projected.px.x <= viewport.width + VISIBLE_MARGIN_PX
                && projected.px.y >= -VISIBLE_MARGIN_PX
                && projected.px.y <= viewport.height + VISIBLE_MARGIN_PX;
        }
    }

    /// Nearest visible anchor within `hit_radius_px` of the pointer, ties
    /// broken by registration order (lowest index wins).
    pub fn hit_test(&self, pointer_px: Vec2, hit_radius_px: f32) -> Option<PoiId> {
        let mut best: Option<(f32, PoiId)> = None;

        for poi in &self.pois {
            if !poi.visible {
                continue;
            }
            let dist = poi.screen.distance(pointer_px);
            if dist > hit_radius_px {
                continue;
            }
            // Strict comparison keeps the earliest-registered POI on ties.
            if best.map_or(true, |(d, _)| dist < d) {
                best = Some((dist, poi.id));
            }
        }

        best.map(|(_, id)| id)
    }

    /// The target camera pose when focusing on the given POI: position offset
    /// from the anchor, looking at the anchor.
    pub fn focus_pose(&self, id: PoiId) -> CameraPose {
        let poi = self.get(id);
        CameraPose::new(poi.anchor + poi.focus_offset, poi.anchor, self.focus_fov_deg)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::SceneConfig;

    pub(crate) fn three_poi_config() -> SceneConfig {
        SceneConfig::from_json(
            r#"{
                "model_path": "models/test.obj",
                "idle_pose": { "position": [0.0, 3.0, -15.0], "look_target": [0.0, 0.0, 0.0], "fov_y_deg": 50.0 },
                "orbit": { "radius": 15.0, "height": 3.0, "angular_speed": 0.05 },
                "hit_radius_px": 30.0,
                "pois": [
                    { "name": "North", "anchor": [0.0, 1.0, 0.0], "focus_offset": [3.0, 1.0, 0.0], "content_path": "content/north.html" },
                    { "name": "East", "anchor": [4.0, 0.5, 0.0], "focus_offset": [3.0, 1.0, 0.0], "content_path": "content/east.html" },
                    { "name": "West", "anchor": [-4.0, 0.5, 0.0], "focus_offset": [3.0, 1.0, 0.0], "content_path": "content/west.html" }
                ]
            }"#,
        )
        .unwrap()
    }

    fn refreshed_registry() -> (PoiRegistry, CameraPose, Viewport) {
        let config = three_poi_config();
        let mut registry = PoiRegistry::from_config(&config);
        let pose = config.idle_pose.to_pose();
        let viewport = Viewport::new(800.0, 600.0);
        registry.refresh(&pose, viewport);
        (registry, pose, viewport)
    }

    #[test]
    fn refresh_marks_forward_anchors_visible() {
        let (registry, _, _) = refreshed_registry();
        assert!(registry.iter().all(|p| p.visible));
    }

    #[test]
    fn hit_test_finds_anchor_within_radius() {
        let (registry, _, _) = refreshed_registry();
        let target = registry.get(PoiId(1)).screen;
        assert_eq!(registry.hit_test(target, 30.0), Some(PoiId(1)));
        assert_eq!(
            registry.hit_test(target + Vec2::new(10.0, 0.0), 30.0),
            Some(PoiId(1))
        );
    }

    #[test]
    fn hit_test_misses_outside_radius() {
        let (registry, _, _) = refreshed_registry();
        let far = Vec2::new(-200.0, -200.0);
        assert_eq!(registry.hit_test(far, 30.0), None);
    }

    #[test]
    fn invisible_anchor_is_never_hit() {
        let config = three_poi_config();
        let mut registry = PoiRegistry::from_config(&config);
        // Camera looking away from every anchor.
        let pose = CameraPose::new(
            Vec3::new(0.0, 3.0, -15.0),
            Vec3::new(0.0, 3.0, -30.0),
            50.0,
        );
        registry.refresh(&pose, Viewport::new(800.0, 600.0));

        for poi in registry.iter() {
            assert!(!poi.visible);
        }
        // Even a hit test centered on the cached coordinate finds nothing.
        assert_eq!(registry.hit_test(OFFSCREEN, 1.0e9), None);
    }

    #[test]
    fn tie_breaks_by_registration_order() {
        let (mut registry, _, _) = refreshed_registry();
        // Force two anchors onto the same screen coordinate.
        let shared = Vec2::new(100.0, 100.0);
        registry.pois[1].screen = shared;
        registry.pois[2].screen = shared;
        assert_eq!(registry.hit_test(shared, 30.0), Some(PoiId(1)));
    }

    #[test]
    fn focus_pose_looks_at_anchor() {
        let (registry, _, _) = refreshed_registry();
        let pose = registry.focus_pose(PoiId(0));
        let poi = registry.get(PoiId(0));
        assert_eq!(pose.look_target, poi.anchor);
        assert_eq!(pose.position, poi.anchor + poi.focus_offset);
    }
}
