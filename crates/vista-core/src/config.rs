//! Scene configuration.
//!
//! One JSON document parameterizes the whole viewer: the model to load, the
//! idle camera pose and auto-rotation, hit-test tolerances, transition tuning
//! and the POI list. The interaction core carries no per-scene constants of
//! its own.

use crate::camera::CameraPose;
use crate::error::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

fn default_hit_radius() -> f32 {
    28.0
}

fn default_scroll_fade() -> f32 {
    0.35
}

fn default_surface_hit_radius() -> f32 {
    1.5
}

fn default_focus_duration() -> f32 {
    2.0
}

fn default_restore_duration() -> f32 {
    1.0
}

fn default_back_overshoot() -> f32 {
    1.4
}

fn default_focus_fov() -> f32 {
    45.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseConfig {
    pub position: [f32; 3],
    pub look_target: [f32; 3],
    pub fov_y_deg: f32,
}

impl PoseConfig {
    pub fn to_pose(&self) -> CameraPose {
        CameraPose::new(
            Vec3::from(self.position),
            Vec3::from(self.look_target),
            self.fov_y_deg,
        )
    }
}

/// Idle auto-rotation: a slow orbit of the camera around the idle look
/// target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitConfig {
    /// Orbit radius in meters.
    pub radius: f32,
    /// Camera height above the orbit center, meters.
    pub height: f32,
    /// Angular speed in radians per second.
    pub angular_speed: f32,
}

/// Tuning for the focus zoom-in transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Field of view while focused on a POI, degrees.
    #[serde(default = "default_focus_fov")]
    pub fov_y_deg: f32,
    /// Zoom-in duration, seconds.
    #[serde(default = "default_focus_duration")]
    pub duration_s: f32,
    /// Overshoot parameter of the back-in ease.
    #[serde(default = "default_back_overshoot")]
    pub back_overshoot: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: default_focus_fov(),
            duration_s: default_focus_duration(),
            back_overshoot: default_back_overshoot(),
        }
    }
}

/// One point of interest anchored in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiConfig {
    pub name: String,
    /// Anchor position in world space.
    pub anchor: [f32; 3],
    /// Camera offset from the anchor when focused on it.
    pub focus_offset: [f32; 3],
    /// Path of the content fragment shown by "view more".
    pub content_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Path of the OBJ model to load.
    pub model_path: String,
    /// Camera pose when no POI is focused.
    pub idle_pose: PoseConfig,
    pub orbit: OrbitConfig,
    /// Screen-space hit radius for POI hover, pixels.
    #[serde(default = "default_hit_radius")]
    pub hit_radius_px: f32,
    /// World-space radius around an anchor within which a ray-cast surface
    /// hit also counts as hovering that POI, meters.
    #[serde(default = "default_surface_hit_radius")]
    pub surface_hit_radius: f32,
    /// Page-scroll fraction beyond which pointer interactivity is disabled.
    #[serde(default = "default_scroll_fade")]
    pub scroll_fade_threshold: f32,
    #[serde(default)]
    pub focus: FocusConfig,
    /// Duration of the restore-to-idle transition, seconds.
    #[serde(default = "default_restore_duration")]
    pub restore_duration_s: f32,
    pub pois: Vec<PoiConfig>,
}

impl SceneConfig {
    /// Parses and validates a scene description.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pois.is_empty() {
            return Err(ConfigError::Invalid("scene defines no POIs".into()));
        }
        if self.hit_radius_px <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "hit_radius_px must be positive, got {}",
                self.hit_radius_px
            )));
        }
        if self.focus.duration_s <= 0.0 || self.restore_duration_s <= 0.0 {
            return Err(ConfigError::Invalid(
                "transition durations must be positive".into(),
            ));
        }
        if self.orbit.radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "orbit radius must be positive, got {}",
                self.orbit.radius
            )));
        }
        if !(0.0..=1.0).contains(&self.scroll_fade_threshold) {
            return Err(ConfigError::Invalid(format!(
                "scroll_fade_threshold must be in [0, 1], got {}",
                self.scroll_fade_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "model_path": "models/massif.obj",
        "idle_pose": { "position": [0.0, 3.0, -15.0], "look_target": [0.0, 0.0, 0.0], "fov_y_deg": 50.0 },
        "orbit": { "radius": 15.0, "height": 3.0, "angular_speed": 0.05 },
        "pois": [
            { "name": "Summit", "anchor": [-6.0, 4.8, -4.7], "focus_offset": [3.0, 1.0, 0.0], "content_path": "content/summit.html" }
        ]
    }"#;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = SceneConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.pois.len(), 1);
        assert_eq!(config.hit_radius_px, default_hit_radius());
        assert_eq!(config.focus.duration_s, default_focus_duration());
        assert_eq!(config.restore_duration_s, default_restore_duration());
        assert_eq!(config.idle_pose.to_pose().fov_y_deg, 50.0);
    }

    #[test]
    fn rejects_empty_poi_list() {
        let json = MINIMAL.replace(
            r#""pois": [
            { "name": "Summit", "anchor": [-6.0, 4.8, -4.7], "focus_offset": [3.0, 1.0, 0.0], "content_path": "content/summit.html" }
        ]"#,
            r#""pois": []"#,
        );
        assert!(SceneConfig::from_json(&json).is_err());
    }

    #[test]
    fn rejects_nonpositive_hit_radius() {
        let json = MINIMAL.replace(
            r#""orbit":"#,
            r#""hit_radius_px": 0.0, "orbit":"#,
        );
        assert!(SceneConfig::from_json(&json).is_err());
    }
}
