//! Cancellable camera transitions and idle auto-rotation.
//!
//! The [`TransitionDirector`] is the sole writer of the camera pose. A
//! transition interpolates position, look target and field of view as three
//! independently eased tracks sharing one timeline; starting a new transition
//! first cancels any in-flight one (its completion is delivered with
//! `cancelled = true`) and continues from the camera's current interpolated
//! pose, so redirection is smooth rather than a snap.

use crate::camera::CameraPose;
use crate::config::OrbitConfig;
use glam::Vec3;

/// Shortest duration a transition is allowed to run; requests below this are
/// clamped so a completion is still delivered from `tick`.
const MIN_DURATION_S: f32 = 1e-4;

/// Easing curves used by the camera transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// Accelerating ease that first pulls back past the start. `overshoot`
    /// controls how far.
    BackIn { overshoot: f32 },
    /// Cubic ease-in-out.
    Power3InOut,
    SineInOut,
}

impl Easing {
    /// Maps normalized time `t` in [0, 1] to an eased fraction.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::BackIn { overshoot } => t * t * ((overshoot + 1.0) * t - overshoot),
            Easing::Power3InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Per-track easing of one transition.
#[derive(Debug, Clone, Copy)]
pub struct Tracks {
    pub position: Easing,
    pub look: Easing,
    pub fov: Easing,
}

impl Tracks {
    /// The same ease on all three tracks.
    pub fn uniform(easing: Easing) -> Self {
        Self {
            position: easing,
            look: easing,
            fov: easing,
        }
    }
}

/// Identifies one requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionHandle(u64);

/// Delivered exactly once per transition: either the animation reached its
/// end pose, or it was superseded (`cancelled = true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionCompletion {
    pub handle: TransitionHandle,
    pub cancelled: bool,
}

#[derive(Debug)]
struct ActiveTransition {
    handle: TransitionHandle,
    start: CameraPose,
    end: CameraPose,
    duration_s: f32,
    elapsed_s: f32,
    tracks: Tracks,
}

impl ActiveTransition {
    fn sample(&self, t: f32) -> CameraPose {
        CameraPose {
            position: self
                .start
                .position
                .lerp(self.end.position, self.tracks.position.apply(t)),
            look_target: self
                .start
                .look_target
                .lerp(self.end.look_target, self.tracks.look.apply(t)),
            fov_y_deg: self.start.fov_y_deg
                + (self.end.fov_y_deg - self.start.fov_y_deg) * self.tracks.fov.apply(t),
        }
    }
}

/// Idle auto-rotation state: a perpetual slow orbit around the idle look
/// target. Any discrete transition cancels it; it is re-armed only when the
/// state machine returns to Idle. It never emits completions.
#[derive(Debug)]
struct Orbit {
    angle_rad: f32,
}

/// Owns the camera pose and every animation that mutates it.
pub struct TransitionDirector {
    pose: CameraPose,
    active: Option<ActiveTransition>,
    orbit: Option<Orbit>,
    orbit_config: OrbitConfig,
    orbit_center: Vec3,
    next_handle: u64,
    /// Completions produced outside `tick` (cancellations), drained on the
    /// next `tick` so the machine sees them in its per-frame event pass.
    pending: Vec<TransitionCompletion>,
}

impl TransitionDirector {
    /// Creates the director at the given idle pose with auto-rotation armed.
    pub fn new(idle_pose: CameraPose, orbit_config: OrbitConfig) -> Self {
        let mut director = Self {
            pose: idle_pose,
            active: None,
            orbit: None,
            orbit_config,
            orbit_center: idle_pose.look_target,
            next_handle: 0,
            pending: Vec::new(),
        };
        director.arm_auto_rotate();
        director
    }

    /// Current camera pose. Read-only outside the director.
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn auto_rotate_armed(&self) -> bool {
        self.orbit.is_some()
    }

    /// Starts a transition toward `target`. Cancels any in-flight transition
    /// first (delivering its completion with `cancelled = true`) and starts
    /// from the current interpolated pose. Implicitly disarms auto-rotation.
    pub fn animate_to(
        &mut self,
        target: CameraPose,
        duration_s: f32,
        tracks: Tracks,
    ) -> TransitionHandle {
        self.cancel_current();
        self.orbit = None;

        self.next_handle += 1;
        let handle = TransitionHandle(self.next_handle);

        log::debug!(
            "transition {:?}: {:?} -> {:?} over {:.2}s",
            handle,
            self.pose.position,
            target.position,
            duration_s
        );

        self.active = Some(ActiveTransition {
            handle,
            start: self.pose,
            end: target,
            duration_s: duration_s.max(MIN_DURATION_S),
            elapsed_s: 0.0,
            tracks,
        });

        handle
    }

    /// Cancels the in-flight transition, if any. Its completion is delivered
    /// on the next `tick` with `cancelled = true`; the camera stays wherever
    /// the interpolation left it.
    pub fn cancel_current(&mut self) {
        if let Some(active) = self.active.take() {
            log::debug!("transition {:?} cancelled", active.handle);
            self.pending.push(TransitionCompletion {
                handle: active.handle,
                cancelled: true,
            });
        }
    }

    /// Re-arms idle auto-rotation, continuing the orbit from the camera's
    /// current bearing so there is no snap.
    pub fn arm_auto_rotate(&mut self) {
        let offset = self.pose.position - self.orbit_center;
        self.orbit = Some(Orbit {
            angle_rad: offset.z.atan2(offset.x),
        });
    }

    /// Advances time by `dt_s`, applies the interpolated pose, and returns
    /// the completions to feed into the state machine this frame. A finished
    /// transition is clamped to its exact end pose and completes exactly
    /// once.
    pub fn tick(&mut self, dt_s: f32) -> Vec<TransitionCompletion> {
        let mut completions = std::mem::take(&mut self.pending);

        if let Some(active) = &mut self.active {
            active.elapsed_s += dt_s;

            if active.elapsed_s >= active.duration_s {
                self.pose = active.end;
                let handle = active.handle;
                self.active = None;
                log::debug!("transition {:?} complete", handle);
                completions.push(TransitionCompletion {
                    handle,
                    cancelled: false,
                });
            } else {
                let t = active.elapsed_s / active.duration_s;
                self.pose = active.sample(t);
            }
        } else if let Some(orbit) = &mut self.orbit {
            orbit.angle_rad += self.orbit_config.angular_speed * dt_s;
            self.pose.position = self.orbit_center
                + Vec3::new(
                    orbit.angle_rad.cos() * self.orbit_config.radius,
                    self.orbit_config.height,
                    orbit.angle_rad.sin() * self.orbit_config.radius,
                );
            self.pose.look_target = self.orbit_center;
        }

        completions
    }
}
