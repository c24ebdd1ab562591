//! Overlay presenter contract.
//!
//! The presenter renders and removes tooltips, focus controls and long-form
//! content panels on command from the state machine. It is a pure command
//! sink: the machine never asks it what is currently shown. Content loading
//! is asynchronous; the presenter returns a [`RequestId`] and the host
//! delivers the matching [`ContentResult`] on a later frame.

use crate::error::ContentError;
use crate::poi::{PoiId, PointOfInterest};

/// Monotonically increasing key for one content-load request; used by the
/// stale-response guard to discard results for a POI no longer focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// Outcome of one content-load request.
#[derive(Debug, Clone)]
pub struct ContentResult {
    pub request: RequestId,
    pub poi: PoiId,
    pub outcome: Result<String, ContentError>,
}

/// Commands the state machine issues toward the DOM/UI layer.
pub trait OverlayPresenter {
    fn show_tooltip(&mut self, poi: &PointOfInterest);
    fn hide_tooltip(&mut self);

    /// "More" / close controls shown once the camera has settled on a POI.
    fn show_focus_controls(&mut self, poi: &PointOfInterest);
    fn hide_focus_controls(&mut self);

    /// Begins loading the long-form content fragment for the POI. Must not
    /// block; the result arrives later as a [`ContentResult`].
    fn load_content(&mut self, poi: &PointOfInterest) -> RequestId;
    fn show_content(&mut self, poi: &PointOfInterest, html: &str);
    fn hide_content(&mut self);

    /// A recoverable content-load failure; reported once per occurrence.
    fn content_error(&mut self, poi: &PointOfInterest, error: &ContentError);
}
