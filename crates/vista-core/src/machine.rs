//! The interaction state machine.
//!
//! Holds the single authoritative [`InteractionState`] and is the only
//! component allowed to command the transition director or change which
//! overlay is visible. Events are applied once per frame in a fixed order:
//! pointer sample and primary action, then overlay UI actions, then content
//! results, then (via [`InteractionStateMachine::handle_completions`]) the
//! director's completion events. That fixed order replaces the ad-hoc busy
//! flags of callback-driven designs with deterministic sequencing.

use crate::camera::CameraPose;
use crate::config::SceneConfig;
use crate::overlay::{ContentResult, OverlayPresenter, RequestId};
use crate::poi::{PoiId, PoiRegistry};
use crate::transition::{
    Easing, Tracks, TransitionCompletion, TransitionDirector, TransitionHandle,
};

/// Which discrete state a transition departed from; kept for logging and
/// inspection. Guards key off the stored handle, not the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTag {
    Idle,
    Hovering,
    Transitioning,
    Focused,
    Content,
}

/// Where an in-flight camera transition is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Focus(PoiId),
    Idle,
}

/// Sub-state of `Content`: the fetch is either outstanding or applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPhase {
    Pending(RequestId),
    Shown,
}

/// The one authoritative discrete state of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Hovering(PoiId),
    Transitioning {
        from: StateTag,
        to: Goal,
        handle: TransitionHandle,
    },
    Focused(PoiId),
    Content { id: PoiId, phase: ContentPhase },
}

impl InteractionState {
    pub fn tag(&self) -> StateTag {
        match self {
            InteractionState::Idle => StateTag::Idle,
            InteractionState::Hovering(_) => StateTag::Hovering,
            InteractionState::Transitioning { .. } => StateTag::Transitioning,
            InteractionState::Focused(_) => StateTag::Focused,
            InteractionState::Content { .. } => StateTag::Content,
        }
    }
}

/// Discrete overlay actions collected by the presenter between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// The "view more" control on a focused POI.
    ViewMore,
    /// The close control on focus controls or the content panel.
    Close,
}

/// Transition timing and easing, derived from the scene config.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub focus_duration_s: f32,
    pub focus_tracks: Tracks,
    pub restore_duration_s: f32,
    pub restore_tracks: Tracks,
    /// Page-scroll fraction beyond which pointer input is inert.
    pub scroll_fade_threshold: f32,
}

impl Tuning {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            focus_duration_s: config.focus.duration_s,
            focus_tracks: Tracks {
                position: Easing::BackIn {
                    overshoot: config.focus.back_overshoot,
                },
                look: Easing::SineInOut,
                fov: Easing::SineInOut,
            },
            restore_duration_s: config.restore_duration_s,
            restore_tracks: Tracks::uniform(Easing::Power3InOut),
            scroll_fade_threshold: config.scroll_fade_threshold,
        }
    }
}

/// One frame's worth of coalesced input for the machine.
#[derive(Debug, Default)]
pub struct FrameInput {
    /// The POI currently under the pointer (already hit-tested against the
    /// refreshed registry), latest value wins.
    pub hover: Option<PoiId>,
    /// Edge-triggered primary action (at most one per frame).
    pub primary: bool,
    /// Overlay control actions collected since the last frame.
    pub ui_actions: Vec<UiAction>,
    /// Content-load results that arrived since the last frame.
    pub content: Vec<ContentResult>,
    /// Current page-scroll fraction in [0, 1].
    pub scroll_fraction: f32,
}

pub struct InteractionStateMachine {
    state: InteractionState,
    tuning: Tuning,
    /// Camera pose captured at the moment the first focus transition left the
    /// idle family; the close path restores exactly this pose.
    idle_pose: Option<CameraPose>,
}

impl InteractionStateMachine {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            state: InteractionState::Idle,
            tuning,
            idle_pose: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// The POI the session is currently about, if any; drives marker
    /// emphasis in the renderer.
    pub fn emphasized_poi(&self) -> Option<PoiId> {
        match self.state {
            InteractionState::Idle => None,
            InteractionState::Hovering(id) => Some(id),
            InteractionState::Transitioning {
                to: Goal::Focus(id),
                ..
            } => Some(id),
            InteractionState::Transitioning { to: Goal::Idle, .. } => None,
            InteractionState::Focused(id) => Some(id),
            InteractionState::Content { id, .. } => Some(id),
        }
    }

    /// Applies one frame of input events, in fixed order: pointer, UI
    /// actions, content results. Call before the director's `tick` so input
    /// always precedes animation completions within a frame.
    pub fn handle_frame_input(
        &mut self,
        mut input: FrameInput,
        registry: &PoiRegistry,
        director: &mut TransitionDirector,
        presenter: &mut dyn OverlayPresenter,
    ) {
        // Past the scroll threshold the pointer is inert; an active hover
        // ends as if the pointer had left.
        let interactive = input.scroll_fraction < self.tuning.scroll_fade_threshold;
        let hover = if interactive { input.hover } else { None };
        let primary = interactive && input.primary;

        self.apply_hover(hover, presenter, registry);
        if primary {
            self.apply_primary(hover, registry, director, presenter);
        }
        for action in std::mem::take(&mut input.ui_actions) {
            self.apply_ui_action(action, registry, director, presenter);
        }
        for result in std::mem::take(&mut input.content) {
            self.apply_content_result(result, registry, presenter);
        }
    }

    /// Applies the director's completion events for this frame.
    pub fn handle_completions(
        &mut self,
        completions: &[TransitionCompletion],
        registry: &PoiRegistry,
        director: &mut TransitionDirector,
        presenter: &mut dyn OverlayPresenter,
    ) {
        for completion in completions {
            let (to, handle) = match self.state {
                InteractionState::Transitioning { to, handle, .. } => (to, handle),
                // Completions can only advance a transitioning machine.
                _ => {
                    log::trace!("completion {:?} outside Transitioning", completion.handle);
                    continue;
                }
            };

            if completion.handle != handle {
                // A superseded transition's cancellation; the state already
                // tracks its replacement.
                log::trace!("completion {:?} for superseded transition", completion.handle);
                continue;
            }

            if completion.cancelled {
                // The driving transition was cancelled out from under us:
                // revert the UI and ease back to the pre-interaction pose.
                // Re-arming the orbit directly would snap the camera onto
                // the ring from wherever the interpolation stopped.
                presenter.hide_tooltip();
                presenter.hide_focus_controls();
                presenter.hide_content();
                let target = self.idle_pose.unwrap_or_else(|| director.pose());
                let restore = director.animate_to(
                    target,
                    self.tuning.restore_duration_s,
                    self.tuning.restore_tracks,
                );
                self.set_state(InteractionState::Transitioning {
                    from: StateTag::Transitioning,
                    to: Goal::Idle,
                    handle: restore,
                });
                continue;
            }

            match to {
                Goal::Focus(id) => {
                    presenter.show_focus_controls(registry.get(id));
                    self.set_state(InteractionState::Focused(id));
                }
                Goal::Idle => self.return_to_idle(director),
            }
        }
    }

    fn apply_hover(
        &mut self,
        hover: Option<PoiId>,
        presenter: &mut dyn OverlayPresenter,
        registry: &PoiRegistry,
    ) {
        match self.state {
            InteractionState::Idle => {
                if let Some(id) = hover {
                    presenter.show_tooltip(registry.get(id));
                    self.set_state(InteractionState::Hovering(id));
                }
            }
            InteractionState::Hovering(current) => match hover {
                None => {
                    presenter.hide_tooltip();
                    self.set_state(InteractionState::Idle);
                }
                Some(id) if id != current => {
                    presenter.hide_tooltip();
                    presenter.show_tooltip(registry.get(id));
                    self.set_state(InteractionState::Hovering(id));
                }
                Some(_) => {}
            },
            // Hover has no effect outside the idle family.
            _ => {}
        }
    }

    fn apply_primary(
        &mut self,
        hover: Option<PoiId>,
        registry: &PoiRegistry,
        director: &mut TransitionDirector,
        presenter: &mut dyn OverlayPresenter,
    ) {
        match self.state {
            InteractionState::Hovering(id) => {
                presenter.hide_tooltip();
                self.begin_focus(id, StateTag::Hovering, registry, director);
            }
            InteractionState::Focused(current) => {
                if let Some(id) = hover.filter(|&id| id != current) {
                    presenter.hide_focus_controls();
                    self.begin_focus(id, StateTag::Focused, registry, director);
                }
            }
            InteractionState::Content {
                id: current,
                phase: ContentPhase::Shown,
            } => {
                if let Some(id) = hover.filter(|&id| id != current) {
                    presenter.hide_content();
                    presenter.hide_focus_controls();
                    self.begin_focus(id, StateTag::Content, registry, director);
                }
            }
            InteractionState::Content {
                phase: ContentPhase::Pending(_),
                ..
            } => {
                // One outstanding fetch at a time; refocus waits for it.
                log::debug!("primary action ignored while content is pending");
            }
            InteractionState::Transitioning {
                to: Goal::Focus(current),
                ..
            } => {
                // A click on a different POI redirects the zoom mid-flight;
                // repeat clicks on the same target stay suppressed.
                if let Some(id) = hover.filter(|&id| id != current) {
                    self.begin_focus(id, StateTag::Transitioning, registry, director);
                } else {
                    log::debug!("primary action ignored during transition");
                }
            }
            InteractionState::Transitioning { to: Goal::Idle, .. } | InteractionState::Idle => {}
        }
    }

    fn apply_ui_action(
        &mut self,
        action: UiAction,
        registry: &PoiRegistry,
        director: &mut TransitionDirector,
        presenter: &mut dyn OverlayPresenter,
    ) {
        match (self.state, action) {
            (InteractionState::Focused(id), UiAction::ViewMore) => {
                let request = presenter.load_content(registry.get(id));
                log::debug!("content requested for {} as {:?}", id, request);
                self.set_state(InteractionState::Content {
                    id,
                    phase: ContentPhase::Pending(request),
                });
            }
            (InteractionState::Focused(_), UiAction::Close)
            | (InteractionState::Content { .. }, UiAction::Close) => {
                // Closing with a fetch still pending is allowed; the stale
                // guard discards its result when it arrives.
                presenter.hide_content();
                presenter.hide_focus_controls();
                let from = self.state.tag();
                let target = self.idle_pose.unwrap_or_else(|| director.pose());
                let handle = director.animate_to(
                    target,
                    self.tuning.restore_duration_s,
                    self.tuning.restore_tracks,
                );
                self.set_state(InteractionState::Transitioning {
                    from,
                    to: Goal::Idle,
                    handle,
                });
            }
            (_, action) => {
                log::debug!("ui action {:?} ignored in {:?}", action, self.state.tag());
            }
        }
    }

    fn apply_content_result(
        &mut self,
        result: ContentResult,
        registry: &PoiRegistry,
        presenter: &mut dyn OverlayPresenter,
    ) {
        match self.state {
            InteractionState::Content {
                id,
                phase: ContentPhase::Pending(request),
            } if request == result.request => match result.outcome {
                Ok(html) => {
                    presenter.show_content(registry.get(id), &html);
                    self.set_state(InteractionState::Content {
                        id,
                        phase: ContentPhase::Shown,
                    });
                }
                Err(error) => {
                    log::warn!("content load failed for {}: {}", id, error);
                    presenter.content_error(registry.get(id), &error);
                    self.set_state(InteractionState::Focused(id));
                }
            },
            _ => {
                // Stale response: the viewer navigated away before it landed.
                log::debug!("discarding stale content result {:?}", result.request);
            }
        }
    }

    /// Starts (or redirects) the zoom toward a POI. Captures the
    /// pre-interaction pose the first time the idle family is left.
    fn begin_focus(
        &mut self,
        id: PoiId,
        from: StateTag,
        registry: &PoiRegistry,
        director: &mut TransitionDirector,
    ) {
        if self.idle_pose.is_none() {
            self.idle_pose = Some(director.pose());
        }
        let handle = director.animate_to(
            registry.focus_pose(id),
            self.tuning.focus_duration_s,
            self.tuning.focus_tracks,
        );
        self.set_state(InteractionState::Transitioning {
            from,
            to: Goal::Focus(id),
            handle,
        });
    }

    fn return_to_idle(&mut self, director: &mut TransitionDirector) {
        self.idle_pose = None;
        director.arm_auto_rotate();
        self.set_state(InteractionState::Idle);
    }

    fn set_state(&mut self, next: InteractionState) {
        if self.state != next {
            log::debug!("state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::error::ContentError;
    use crate::overlay::{ContentResult, OverlayPresenter, RequestId};
    use crate::poi::{PointOfInterest, PoiRegistry};
    use crate::transition::TransitionDirector;
    use glam::Vec2;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Cmd {
        ShowTooltip(PoiId),
        HideTooltip,
        ShowFocus(PoiId),
        HideFocus,
        LoadContent(PoiId, RequestId),
        ShowContent(PoiId),
        HideContent,
        ContentError(PoiId),
    }

    #[derive(Default)]
    struct RecordingPresenter {
        commands: Vec<Cmd>,
        next_request: u64,
    }

    impl RecordingPresenter {
        fn count(&self, pred: impl Fn(&Cmd) -> bool) -> usize {
            self.commands.iter().filter(|c| pred(c)).count()
        }
    }

    impl OverlayPresenter for RecordingPresenter {
        fn show_tooltip(&mut self, poi: &PointOfInterest) {
            self.commands.push(Cmd::ShowTooltip(poi.id));
        }
        fn hide_tooltip(&mut self) {
            self.commands.push(Cmd::HideTooltip);
        }
        fn show_focus_controls(&mut self, poi: &PointOfInterest) {
            self.commands.push(Cmd::ShowFocus(poi.id));
        }
        fn hide_focus_controls(&mut self) {
            self.commands.push(Cmd::HideFocus);
        }
        fn load_content(&mut self, poi: &PointOfInterest) -> RequestId {
            self.next_request += 1;
            let request = RequestId(self.next_request);
            self.commands.push(Cmd::LoadContent(poi.id, request));
            request
        }
        fn show_content(&mut self, poi: &PointOfInterest, _html: &str) {
            self.commands.push(Cmd::ShowContent(poi.id));
        }
        fn hide_content(&mut self) {
            self.commands.push(Cmd::HideContent);
        }
        fn content_error(&mut self, poi: &PointOfInterest, _error: &ContentError) {
            self.commands.push(Cmd::ContentError(poi.id));
        }
    }

    struct Rig {
        registry: PoiRegistry,
        director: TransitionDirector,
        machine: InteractionStateMachine,
        presenter: RecordingPresenter,
        viewport: Viewport,
    }

    impl Rig {
        fn new() -> Self {
            let config = crate::poi::tests::three_poi_config();
            let registry = PoiRegistry::from_config(&config);
            let director =
                TransitionDirector::new(config.idle_pose.to_pose(), config.orbit.clone());
            let machine = InteractionStateMachine::new(Tuning::from_config(&config));
            Self {
                registry,
                director,
                machine,
                presenter: RecordingPresenter::default(),
                viewport: Viewport::new(800.0, 600.0),
            }
        }

        /// Runs one frame in the canonical order: refresh registry, input,
        /// director tick, completions.
        fn frame(&mut self, input: FrameInput, dt: f32) {
            let pose = self.director.pose();
            self.registry.refresh(&pose, self.viewport);
            self.machine.handle_frame_input(
                input,
                &self.registry,
                &mut self.director,
                &mut self.presenter,
            );
            let completions = self.director.tick(dt);
            self.machine.handle_completions(
                &completions,
                &self.registry,
                &mut self.director,
                &mut self.presenter,
            );
        }

        /// Runs empty frames until all animation has settled.
        fn settle(&mut self) {
            for _ in 0..100 {
                self.frame(FrameInput::default(), 0.1);
                if !self.director.is_animating() {
                    return;
                }
            }
            panic!("animation never settled");
        }

        fn hover(id: u32) -> FrameInput {
            FrameInput {
                hover: Some(PoiId(id)),
                ..FrameInput::default()
            }
        }

        fn click(id: u32) -> FrameInput {
            FrameInput {
                hover: Some(PoiId(id)),
                primary: true,
                ..FrameInput::default()
            }
        }

        fn action(action: UiAction) -> FrameInput {
            FrameInput {
                ui_actions: vec![action],
                ..FrameInput::default()
            }
        }
    }

    #[test]
    fn idle_is_stable_under_pointer_moves_outside_every_hit_radius() {
        let mut rig = Rig::new();
        for _ in 0..50 {
            rig.frame(FrameInput::default(), 0.016);
        }
        assert_eq!(rig.machine.state(), InteractionState::Idle);
        assert!(rig.presenter.commands.is_empty());
        assert!(rig.director.auto_rotate_armed());
    }

    #[test]
    fn hover_shows_tooltip_and_leaving_hides_it() {
        let mut rig = Rig::new();

        rig.frame(Rig::hover(1), 0.016);
        assert_eq!(rig.machine.state(), InteractionState::Hovering(PoiId(1)));
        assert_eq!(rig.presenter.commands, vec![Cmd::ShowTooltip(PoiId(1))]);

        rig.frame(FrameInput::default(), 0.016);
        assert_eq!(rig.machine.state(), InteractionState::Idle);
        assert_eq!(rig.presenter.commands.last(), Some(&Cmd::HideTooltip));
    }

    #[test]
    fn moving_between_anchors_retargets_the_tooltip() {
        let mut rig = Rig::new();
        rig.frame(Rig::hover(0), 0.016);
        rig.frame(Rig::hover(2), 0.016);
        assert_eq!(rig.machine.state(), InteractionState::Hovering(PoiId(2)));
        assert_eq!(
            rig.presenter.commands,
            vec![
                Cmd::ShowTooltip(PoiId(0)),
                Cmd::HideTooltip,
                Cmd::ShowTooltip(PoiId(2)),
            ]
        );
    }

    #[test]
    fn click_zooms_and_settles_focused() {
        let mut rig = Rig::new();
        rig.frame(Rig::hover(1), 0.016);
        rig.frame(Rig::click(1), 0.016);

        assert!(matches!(
            rig.machine.state(),
            InteractionState::Transitioning {
                to: Goal::Focus(PoiId(1)),
                ..
            }
        ));
        assert!(!rig.director.auto_rotate_armed());

        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Focused(PoiId(1)));
        assert_eq!(
            rig.presenter.count(|c| matches!(c, Cmd::ShowFocus(_))),
            1
        );
        let expected = rig.registry.focus_pose(PoiId(1));
        assert!(rig.director.pose().approx_eq(&expected, 1e-4));
    }

    #[test]
    fn repeat_clicks_during_transition_are_suppressed() {
        let mut rig = Rig::new();
        rig.frame(Rig::click(1), 0.016);
        let first_state = rig.machine.state();

        rig.frame(Rig::click(1), 0.016);
        // Same target: the in-flight transition is untouched.
        assert_eq!(rig.machine.state(), first_state);
    }

    #[test]
    fn refocus_before_completion_settles_on_second_target() {
        let mut rig = Rig::new();
        rig.frame(Rig::click(0), 0.016);
        // Immediately redirect to another POI mid-flight.
        rig.frame(Rig::click(1), 0.016);

        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Focused(PoiId(1)));
        let expected = rig.registry.focus_pose(PoiId(1));
        assert!(rig.director.pose().approx_eq(&expected, 1e-4));
        // Exactly one focus-controls reveal, for the final target.
        assert_eq!(
            rig.presenter.count(|c| matches!(c, Cmd::ShowFocus(_))),
            1
        );
        assert!(rig.presenter.commands.contains(&Cmd::ShowFocus(PoiId(1))));
    }

    #[test]
    fn refocus_from_focused_skips_the_idle_bounce() {
        let mut rig = Rig::new();
        rig.frame(Rig::click(0), 0.016);
        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Focused(PoiId(0)));

        rig.frame(Rig::click(2), 0.016);
        assert!(matches!(
            rig.machine.state(),
            InteractionState::Transitioning {
                from: StateTag::Focused,
                to: Goal::Focus(PoiId(2)),
                ..
            }
        ));
        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Focused(PoiId(2)));
    }

    #[test]
    fn round_trip_restores_the_pre_interaction_pose_and_auto_rotation() {
        let mut rig = Rig::new();
        // Let the idle orbit run a while first.
        for _ in 0..10 {
            rig.frame(FrameInput::default(), 0.1);
        }
        rig.frame(Rig::hover(0), 0.016);

        // The orbit is still advancing during hover; the pose to restore is
        // the one the click interrupts.
        let pre_interaction = rig.director.pose();
        rig.frame(Rig::click(0), 0.016);
        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Focused(PoiId(0)));

        rig.frame(Rig::action(UiAction::Close), 0.016);
        rig.settle();

        assert_eq!(rig.machine.state(), InteractionState::Idle);
        assert!(rig.director.pose().approx_eq(&pre_interaction, 1e-3));
        assert!(rig.director.auto_rotate_armed());
    }

    #[test]
    fn view_more_loads_and_shows_content() {
        let mut rig = Rig::new();
        rig.frame(Rig::click(1), 0.016);
        rig.settle();

        rig.frame(Rig::action(UiAction::ViewMore), 0.016);
        let request = match rig.machine.state() {
            InteractionState::Content {
                id,
                phase: ContentPhase::Pending(request),
            } => {
                assert_eq!(id, PoiId(1));
                request
            }
            other => panic!("expected pending content, got {other:?}"),
        };

        // Frames keep running while the fetch is outstanding.
        rig.frame(FrameInput::default(), 0.016);

        rig.frame(
            FrameInput {
                content: vec![ContentResult {
                    request,
                    poi: PoiId(1),
                    outcome: Ok("<p>article</p>".into()),
                }],
                ..FrameInput::default()
            },
            0.016,
        );
        assert_eq!(
            rig.machine.state(),
            InteractionState::Content {
                id: PoiId(1),
                phase: ContentPhase::Shown
            }
        );
        assert!(rig.presenter.commands.contains(&Cmd::ShowContent(PoiId(1))));
    }

    #[test]
    fn content_error_falls_back_to_focused_and_reports_once() {
        let mut rig = Rig::new();
        rig.frame(Rig::click(0), 0.016);
        rig.settle();
        rig.frame(Rig::action(UiAction::ViewMore), 0.016);
        let request = match rig.machine.state() {
            InteractionState::Content {
                phase: ContentPhase::Pending(request),
                ..
            } => request,
            other => panic!("expected pending content, got {other:?}"),
        };

        rig.frame(
            FrameInput {
                content: vec![ContentResult {
                    request,
                    poi: PoiId(0),
                    outcome: Err(ContentError::Empty {
                        path: "content/north.html".into(),
                    }),
                }],
                ..FrameInput::default()
            },
            0.016,
        );

        assert_eq!(rig.machine.state(), InteractionState::Focused(PoiId(0)));
        assert_eq!(
            rig.presenter.count(|c| matches!(c, Cmd::ContentError(_))),
            1
        );
        assert_eq!(rig.presenter.count(|c| matches!(c, Cmd::ShowContent(_))), 0);
    }

    #[test]
    fn stale_content_result_is_discarded_after_close() {
        let mut rig = Rig::new();
        rig.frame(Rig::click(0), 0.016);
        rig.settle();
        rig.frame(Rig::action(UiAction::ViewMore), 0.016);
        let request = match rig.machine.state() {
            InteractionState::Content {
                phase: ContentPhase::Pending(request),
                ..
            } => request,
            other => panic!("expected pending content, got {other:?}"),
        };

        // Navigate away before the fetch lands.
        rig.frame(Rig::action(UiAction::Close), 0.016);
        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Idle);

        rig.frame(
            FrameInput {
                content: vec![ContentResult {
                    request,
                    poi: PoiId(0),
                    outcome: Ok("<p>late</p>".into()),
                }],
                ..FrameInput::default()
            },
            0.016,
        );
        assert_eq!(rig.machine.state(), InteractionState::Idle);
        assert_eq!(rig.presenter.count(|c| matches!(c, Cmd::ShowContent(_))), 0);
    }

    #[test]
    fn pending_content_rejects_refocus_clicks() {
        let mut rig = Rig::new();
        rig.frame(Rig::click(0), 0.016);
        rig.settle();
        rig.frame(Rig::action(UiAction::ViewMore), 0.016);
        let pending = rig.machine.state();

        rig.frame(Rig::click(2), 0.016);
        assert_eq!(rig.machine.state(), pending);
    }

    #[test]
    fn scrolled_past_threshold_disables_hover_and_click() {
        let mut rig = Rig::new();
        let scrolled = FrameInput {
            hover: Some(PoiId(1)),
            primary: true,
            scroll_fraction: 0.9,
            ..FrameInput::default()
        };
        rig.frame(scrolled, 0.016);
        assert_eq!(rig.machine.state(), InteractionState::Idle);
        assert!(rig.presenter.commands.is_empty());

        // Scrolling away while hovering ends the hover.
        rig.frame(Rig::hover(1), 0.016);
        assert_eq!(rig.machine.state(), InteractionState::Hovering(PoiId(1)));
        rig.frame(
            FrameInput {
                hover: Some(PoiId(1)),
                scroll_fraction: 0.9,
                ..FrameInput::default()
            },
            0.016,
        );
        assert_eq!(rig.machine.state(), InteractionState::Idle);
    }

    #[test]
    fn external_cancellation_eases_back_without_teleporting() {
        let mut rig = Rig::new();
        let pre_click = rig.director.pose();
        rig.frame(Rig::click(1), 0.016);
        rig.frame(FrameInput::default(), 0.3);
        let stranded = rig.director.pose();

        rig.director.cancel_current();
        rig.frame(FrameInput::default(), 0.016);

        // The cancellation starts a restore transition from the stranded
        // pose rather than snapping onto the idle orbit.
        assert!(matches!(
            rig.machine.state(),
            InteractionState::Transitioning { to: Goal::Idle, .. }
        ));
        assert!(rig.director.pose().approx_eq(&stranded, 1e-5));

        rig.frame(FrameInput::default(), 0.016);
        let step = rig.director.pose().position.distance(stranded.position);
        let total = pre_click.position.distance(stranded.position);
        assert!(step < total * 0.1, "camera jumped {step} of {total}");

        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Idle);
        assert!(rig.director.pose().approx_eq(&pre_click, 1e-3));
        assert!(rig.director.auto_rotate_armed());
    }

    #[test]
    fn full_scenario_hover_click_focus_content_close() {
        let mut rig = Rig::new();

        // Resolve hover through the real registry hit test.
        let pose = rig.director.pose();
        rig.registry.refresh(&pose, rig.viewport);
        let pointer = rig.registry.get(PoiId(1)).screen + Vec2::new(4.0, -3.0);
        let hover = rig.registry.hit_test(pointer, 30.0);
        assert_eq!(hover, Some(PoiId(1)));

        rig.frame(
            FrameInput {
                hover,
                ..FrameInput::default()
            },
            0.016,
        );
        assert_eq!(rig.machine.state(), InteractionState::Hovering(PoiId(1)));
        assert_eq!(rig.presenter.commands, vec![Cmd::ShowTooltip(PoiId(1))]);

        // The orbit advanced during the hover frame; the click interrupts
        // this pose and close must restore it.
        let pre_interaction = rig.director.pose();
        rig.frame(
            FrameInput {
                hover,
                primary: true,
                ..FrameInput::default()
            },
            0.016,
        );
        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Focused(PoiId(1)));

        rig.frame(Rig::action(UiAction::ViewMore), 0.016);
        let request = match rig.machine.state() {
            InteractionState::Content {
                phase: ContentPhase::Pending(request),
                ..
            } => request,
            other => panic!("expected pending content, got {other:?}"),
        };
        rig.frame(
            FrameInput {
                content: vec![ContentResult {
                    request,
                    poi: PoiId(1),
                    outcome: Ok("<p>hello</p>".into()),
                }],
                ..FrameInput::default()
            },
            0.016,
        );
        assert_eq!(
            rig.machine.state(),
            InteractionState::Content {
                id: PoiId(1),
                phase: ContentPhase::Shown
            }
        );

        rig.frame(Rig::action(UiAction::Close), 0.016);
        rig.settle();
        assert_eq!(rig.machine.state(), InteractionState::Idle);
        assert!(rig.director.pose().approx_eq(&pre_interaction, 1e-3));
        assert!(rig.director.auto_rotate_armed());
    }
}
