//! Camera pose and the pure 3D → 2D projector.
//!
//! [`Projector`] is a thin, stateless wrapper over glam's projection math:
//! `project` maps a world-space point to viewport pixels once per anchor per
//! frame, and `pointer_ray` is its inverse, turning a pixel coordinate into a
//! world-space ray for geometry picking.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Near clip plane distance, meters.
pub const Z_NEAR: f32 = 0.1;
/// Far clip plane distance, meters.
pub const Z_FAR: f32 = 1000.0;

/// Sentinel pixel coordinate for points with no meaningful projection
/// (behind the camera). Far enough outside any viewport that a hit test
/// can never reach it.
pub const OFFSCREEN: Vec2 = Vec2::new(-1.0e6, -1.0e6);

/// The full camera state: where it is, what it looks at, and its vertical
/// field of view. Mutated exclusively by the transition director.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera position in world space.
    pub position: Vec3,
    /// The point the camera looks at.
    pub look_target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, look_target: Vec3, fov_y_deg: f32) -> Self {
        Self {
            position,
            look_target,
            fov_y_deg,
        }
    }

    /// Right-handed view matrix, Y-up.
    pub fn view_matrix(&self) -> Mat4 {
        // Guard against a degenerate pose where position and target coincide.
        let target = if self.position.distance_squared(self.look_target) < 1e-12 {
            self.look_target - Vec3::Z * 1e-3
        } else {
            self.look_target
        };
        Mat4::look_at_rh(self.position, target, Vec3::Y)
    }

    /// Componentwise tolerance comparison, used by tests and by the round-trip
    /// restore contract.
    pub fn approx_eq(&self, other: &CameraPose, tol: f32) -> bool {
        self.position.distance(other.position) <= tol
            && self.look_target.distance(other.look_target) <= tol
            && (self.fov_y_deg - other.fov_y_deg).abs() <= tol
    }
}

/// Viewport size in physical pixels. Resize events overwrite it wholesale
/// (latest value wins, no queue).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// A world-space point projected into the viewport.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedPoint {
    /// Pixel coordinate, origin top-left, Y down.
    pub px: Vec2,
    /// False when the point is behind the camera; `px` is then [`OFFSCREEN`].
    pub in_front: bool,
}

/// A world-space ray from the camera through a pixel.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized direction.
    pub dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Pure projection helpers; no state beyond its inputs.
pub struct Projector;

impl Projector {
    /// Combined view-projection matrix for the pose; the same matrix the
    /// projection and picking paths use, exposed for renderers.
    pub fn view_proj(pose: &CameraPose, viewport: Viewport) -> Mat4 {
        // glam's perspective_rh maps depth to [0, 1], matching wgpu.
        let proj = Mat4::perspective_rh(
            pose.fov_y_deg.to_radians(),
            viewport.aspect(),
            Z_NEAR,
            Z_FAR,
        );
        proj * pose.view_matrix()
    }

    /// Projects a world-space point to viewport pixels.
    ///
    /// Degenerate inputs (point behind the camera) come back with
    /// `in_front = false` and an [`OFFSCREEN`] coordinate; callers treat those
    /// as non-interactive.
    pub fn project(point: Vec3, pose: &CameraPose, viewport: Viewport) -> ProjectedPoint {
        let clip = Self::view_proj(pose, viewport) * point.extend(1.0);

        if clip.w <= 0.0 {
            return ProjectedPoint {
                px: OFFSCREEN,
                in_front: false,
            };
        }

        let ndc = clip.xyz() / clip.w;
        let px = Vec2::new(
            (ndc.x * 0.5 + 0.5) * viewport.width,
            (1.0 - (ndc.y * 0.5 + 0.5)) * viewport.height,
        );

        ProjectedPoint { px, in_front: true }
    }

    /// Builds the world-space ray from the camera through the given pixel.
    pub fn pointer_ray(px: Vec2, pose: &CameraPose, viewport: Viewport) -> Ray {
        let ndc = Vec2::new(
            px.x / viewport.width * 2.0 - 1.0,
            1.0 - px.y / viewport.height * 2.0,
        );

        let inv = Self::view_proj(pose, viewport).inverse();

        // Unproject two depths and take the direction between them.
        let near = inv * ndc.extend(0.0).extend(1.0);
        let far = inv * ndc.extend(0.5).extend(1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;

        Ray {
            origin: pose.position,
            dir: (far - near).normalize(),
        }
    }
}
