//! Vista interaction core: the controller that turns pointer input and camera
//! animation into a single, race-free interactive viewing session.
//!
//! The crate is deliberately free of GPU and windowing concerns. It owns:
//! - the camera pose and the projection of 3D anchors into screen space,
//! - pointer hover / ray-cast hit resolution,
//! - the registry of points of interest (POIs),
//! - cancellable, time-driven camera transitions (plus idle auto-rotation),
//! - the interaction state machine that mediates all of the above.
//!
//! The host application drives it once per frame:
//! feed the frame's coalesced input, tick the machine, tick the transition
//! director, then hand the director's completion events back to the machine.
//! Overlay output (tooltips, focus controls, article panels) goes through the
//! [`overlay::OverlayPresenter`] command sink; the presenter is never queried
//! for truth.

pub mod camera;
pub mod config;
pub mod error;
pub mod machine;
pub mod mesh;
pub mod overlay;
pub mod poi;
pub mod pointer;
pub mod transition;

pub use camera::{CameraPose, Projector, Viewport};
pub use config::SceneConfig;
pub use error::ContentError;
pub use machine::{FrameInput, InteractionState, InteractionStateMachine, Tuning, UiAction};
pub use overlay::{ContentResult, OverlayPresenter, RequestId};
pub use poi::{PoiId, PoiRegistry, PointOfInterest};
pub use pointer::PointerProbe;
pub use transition::{Easing, Tracks, TransitionCompletion, TransitionDirector, TransitionHandle};
