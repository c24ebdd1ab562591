use crate::{
    assets::{self, GpuMesh},
    overlay::EguiOverlay,
    renderer::{
        pipelines::{MarkerInstance, MarkerUniforms, MeshUniforms},
        Renderer, FOG_COLOR,
    },
};
use anyhow::Result;
use glam::{Vec2, Vec3};
use std::sync::Arc;
use vista_core::{
    CameraPose, FrameInput, InteractionStateMachine, PoiRegistry, PointerProbe, Projector,
    SceneConfig, TransitionDirector, Tuning, Viewport,
};
use vista_core::mesh::TriMesh;
use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    window::{CursorIcon, Window},
};

/// Marker disc radius at rest, in pixels.
const MARKER_SIZE_PX: f32 = 10.0;

/// Wheel travel that maps scroll fraction 0 to 1.
const SCROLL_RANGE_PX: f32 = 600.0;

/// One wheel line in pixels, for mice reporting line deltas.
const LINE_HEIGHT_PX: f32 = 52.0;

pub struct App {
    pub renderer: Renderer,
    config: SceneConfig,
    pick_mesh: TriMesh,
    model: GpuMesh,
    registry: PoiRegistry,
    director: TransitionDirector,
    machine: InteractionStateMachine,
    probe: PointerProbe,
    overlay: EguiOverlay,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    scroll_px: f32,
    fog_near: f32,
    fog_far: f32,
}

impl App {
    pub async fn new(window: Arc<Window>, config: SceneConfig) -> Result<Self> {
        let renderer = Renderer::new(window.clone()).await?;

        // A missing or unreadable model is fatal; the scene is the model.
        log::info!("loading model {}", &config.model_path);
        let mut last_pct = 0u64;
        let loaded = assets::load_obj_file(&config.model_path, |done, total| {
            let pct = if total > 0 { done * 100 / total } else { 100 };
            if pct >= last_pct + 25 {
                last_pct = pct;
                log::info!("model load {pct}%");
                window.set_title(&format!("Vista Scene Viewer (loading {pct}%)"));
            }
        })?;
        window.set_title("Vista Scene Viewer");
        log::info!(
            "model ready: {} vertices, {} triangles",
            loaded.mesh.positions.len(),
            loaded.mesh.triangle_count()
        );
        let model = GpuMesh::upload(&renderer.gfx.device, &loaded);

        let registry = PoiRegistry::from_config(&config);
        let idle_pose = config.idle_pose.to_pose();
        let director = TransitionDirector::new(idle_pose, config.orbit.clone());
        let machine = InteractionStateMachine::new(Tuning::from_config(&config));

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        // Fog banded to the scene scale so distant terrain fades into the sky.
        let scene_radius = loaded.mesh.bounding_radius().max(config.orbit.radius);
        let fog_near = scene_radius * 1.5;
        let fog_far = scene_radius * 6.0;

        Ok(Self {
            renderer,
            config,
            pick_mesh: loaded.mesh,
            model,
            registry,
            director,
            machine,
            probe: PointerProbe::new(),
            overlay: EguiOverlay::new(),
            egui_ctx,
            egui_state,
            scroll_px: 0.0,
            fog_near,
            fog_far,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(new_size);
    }

    /// Routes a window event; returns true when egui consumed it.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.probe
                    .on_cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.probe
                    .on_primary_button(*state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => lines * LINE_HEIGHT_PX,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                // Wheel up is positive; scrolling down fades the scene out.
                self.scroll_px = (self.scroll_px - dy).clamp(0.0, SCROLL_RANGE_PX);
                self.probe
                    .set_scroll_fraction(self.scroll_px / SCROLL_RANGE_PX);
            }
            WindowEvent::Resized(physical_size) => {
                self.resize(*physical_size);
            }
            _ => {}
        }

        false
    }

    /// One simulation step: project POIs, resolve hover, feed the state
    /// machine, then advance the camera.
    pub fn update(&mut self, window: &Window, dt_s: f32) {
        let viewport = self.viewport();
        let pose = self.director.pose();

        self.registry.refresh(&pose, viewport);

        // Marker hit test first; a miss falls through to the terrain surface
        // near an anchor, so POIs stay clickable when partially occluded by
        // their own peak.
        let hover = self
            .probe
            .cursor_px()
            .and_then(|px| self.registry.hit_test(px, self.config.hit_radius_px))
            .or_else(|| self.surface_hover(&pose, viewport));

        window.set_cursor_icon(if hover.is_some() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        });

        let input = FrameInput {
            hover,
            primary: self.probe.take_click(),
            ui_actions: self.overlay.take_actions(),
            content: self.overlay.poll_content(),
            scroll_fraction: self.probe.scroll_fraction(),
        };

        self.machine
            .handle_frame_input(input, &self.registry, &mut self.director, &mut self.overlay);

        let completions = self.director.tick(dt_s);
        self.machine.handle_completions(
            &completions,
            &self.registry,
            &mut self.director,
            &mut self.overlay,
        );
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(
            self.renderer.gfx.size.width as f32,
            self.renderer.gfx.size.height as f32,
        )
    }

    /// Ray-casts the pointer against the terrain and reports the POI whose
    /// anchor lies within the surface pick radius of the hit point.
    fn surface_hover(
        &self,
        pose: &CameraPose,
        viewport: Viewport,
    ) -> Option<vista_core::PoiId> {
        let hit = self.probe.cast_ray(pose, viewport, &self.pick_mesh)?;
        let radius = self.config.surface_hit_radius;

        self.registry
            .iter()
            .filter(|poi| poi.visible)
            .map(|poi| (poi.id, poi.anchor.distance(hit.point)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let viewport = self.viewport();
        let pose = self.director.pose();
        let view_proj = Projector::view_proj(&pose, viewport);

        let mesh_uniforms = MeshUniforms {
            view_proj,
            camera_pos: pose.position.to_array(),
            _pad0: 0.0,
            fog_color: FOG_COLOR,
            fog_near: self.fog_near,
            light_dir: Vec3::new(0.4, 0.8, 0.3).normalize().to_array(),
            fog_far: self.fog_far,
        };

        let marker_uniforms = MarkerUniforms {
            view_proj,
            viewport_size: [viewport.width, viewport.height],
            marker_size_px: MARKER_SIZE_PX,
            _pad0: 0.0,
        };

        let emphasized = self.machine.emphasized_poi();
        let instances: Vec<MarkerInstance> = self
            .registry
            .iter()
            .filter(|poi| poi.visible)
            .map(|poi| MarkerInstance {
                center: poi.anchor.to_array(),
                emphasis: if emphasized == Some(poi.id) { 1.0 } else { 0.0 },
            })
            .collect();

        self.renderer.render(
            &swap_view,
            Some(&self.model),
            &mesh_uniforms,
            &marker_uniforms,
            &instances,
        );

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);
        self.overlay.draw(&self.egui_ctx, &self.registry);
        let egui_output = self.egui_ctx.end_frame();

        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
