//! egui implementation of the overlay contract: tooltips anchored to POI
//! screen positions, focus controls, the long-form content panel and error
//! toasts. Pure command sink toward the state machine; button presses are
//! queued and drained once per frame.

use crate::content::ContentFetcher;
use std::time::{Duration, Instant};
use vista_core::{
    ContentError, ContentResult, OverlayPresenter, PoiId, PoiRegistry, PointOfInterest, RequestId,
    UiAction,
};

const TOAST_TTL: Duration = Duration::from_secs(4);

pub struct EguiOverlay {
    fetcher: ContentFetcher,
    tooltip: Option<PoiId>,
    focus_controls: Option<(PoiId, String)>,
    content: Option<(PoiId, String, String)>,
    toast: Option<(String, Instant)>,
    actions: Vec<UiAction>,
}

impl EguiOverlay {
    pub fn new() -> Self {
        Self {
            fetcher: ContentFetcher::new(),
            tooltip: None,
            focus_controls: None,
            content: None,
            toast: None,
            actions: Vec::new(),
        }
    }

    /// Results that arrived from the fetcher since the last frame.
    pub fn poll_content(&self) -> Vec<ContentResult> {
        self.fetcher.poll()
    }

    /// Button presses recorded while drawing, in press order.
    pub fn take_actions(&mut self) -> Vec<UiAction> {
        std::mem::take(&mut self.actions)
    }

    pub fn draw(&mut self, ctx: &egui::Context, registry: &PoiRegistry) {
        if let Some(id) = self.tooltip {
            let poi = registry.get(id);
            if poi.visible {
                egui::Area::new(egui::Id::new("poi-tooltip"))
                    .fixed_pos(egui::pos2(poi.screen.x + 14.0, poi.screen.y - 10.0))
                    .order(egui::Order::Foreground)
                    .show(ctx, |ui| {
                        egui::Frame::popup(ui.style()).show(ui, |ui| {
                            ui.label(egui::RichText::new(&poi.name).strong());
                        });
                    });
            }
        }

        // Cloned out so the closures below can record actions on `self`.
        if let Some(name) = self.focus_controls.as_ref().map(|(_, n)| n.clone()) {
            egui::Area::new(egui::Id::new("focus-controls"))
                .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -32.0))
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(name).strong());
                            if ui.button("View more").clicked() {
                                self.actions.push(UiAction::ViewMore);
                            }
                            if ui.button("Back").clicked() {
                                self.actions.push(UiAction::Close);
                            }
                        });
                    });
                });
        }

        if let Some((name, body)) = self.content.as_ref().map(|(_, n, b)| (n.clone(), b.clone())) {
            egui::Window::new(name)
                .id(egui::Id::new("poi-content"))
                .anchor(egui::Align2::RIGHT_CENTER, egui::vec2(-16.0, 0.0))
                .collapsible(false)
                .resizable(false)
                .default_width(360.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .max_height(420.0)
                        .show(ui, |ui| {
                            ui.label(body);
                        });
                    ui.separator();
                    if ui.button("Close").clicked() {
                        self.actions.push(UiAction::Close);
                    }
                });
        }

        if self
            .toast
            .as_ref()
            .is_some_and(|(_, shown_at)| shown_at.elapsed() > TOAST_TTL)
        {
            self.toast = None;
        }
        if let Some((message, _)) = &self.toast {
            egui::Area::new(egui::Id::new("overlay-toast"))
                .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 24.0))
                .order(egui::Order::Tooltip)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.colored_label(egui::Color32::LIGHT_RED, message);
                    });
                });
        }
    }
}

impl Default for EguiOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayPresenter for EguiOverlay {
    fn show_tooltip(&mut self, poi: &PointOfInterest) {
        self.tooltip = Some(poi.id);
    }

    fn hide_tooltip(&mut self) {
        self.tooltip = None;
    }

    fn show_focus_controls(&mut self, poi: &PointOfInterest) {
        self.focus_controls = Some((poi.id, poi.name.clone()));
    }

    fn hide_focus_controls(&mut self) {
        self.focus_controls = None;
    }

    fn load_content(&mut self, poi: &PointOfInterest) -> RequestId {
        self.fetcher.request(poi.id, poi.content_path.clone())
    }

    fn show_content(&mut self, poi: &PointOfInterest, html: &str) {
        self.content = Some((poi.id, poi.name.clone(), html.to_string()));
    }

    fn hide_content(&mut self) {
        self.content = None;
    }

    fn content_error(&mut self, poi: &PointOfInterest, error: &ContentError) {
        log::warn!("content load failed for {}: {error}", poi.name);
        self.toast = Some((format!("Could not load \"{}\"", poi.name), Instant::now()));
    }
}
