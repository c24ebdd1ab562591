//! The rendering orchestrator. Owns the GPU context, the depth target and
//! the individual render pass pipelines.

pub mod context;
pub mod pipelines;

use self::{
    context::GfxContext,
    pipelines::{MarkerInstance, MarkerPipeline, MarkerUniforms, MeshPipeline, MeshUniforms},
};
use crate::assets::GpuMesh;
use std::sync::Arc;
use winit::window::Window;

const DEPTH_FMT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Clear color; also the fog color the scene fades into.
pub const FOG_COLOR: [f32; 3] = [0.89, 0.91, 0.94];

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    depth_view: wgpu::TextureView,
    pub mesh: MeshPipeline,
    pub markers: MarkerPipeline,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;

        let depth_view = create_depth_view(&gfx.device, gfx.size);
        let mesh = MeshPipeline::new(&gfx.device, gfx.config.format, DEPTH_FMT);
        let markers = MarkerPipeline::new(&gfx.device, gfx.config.format, DEPTH_FMT);

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            depth_view,
            mesh,
            markers,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.depth_view = create_depth_view(&self.gfx.device, new_size);
        }
    }

    pub fn render(
        &mut self,
        swap_view: &wgpu::TextureView,
        model: Option<&GpuMesh>,
        mesh_uniforms: &MeshUniforms,
        marker_uniforms: &MarkerUniforms,
        marker_instances: &[MarkerInstance],
    ) {
        self.mesh.update(&self.gfx.queue, mesh_uniforms);
        self.markers
            .upload(&self.gfx.queue, marker_uniforms, marker_instances);

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: FOG_COLOR[0] as f64,
                            g: FOG_COLOR[1] as f64,
                            b: FOG_COLOR[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(model) = model {
                self.mesh.draw(&mut pass, model);
            }

            // Markers go last so they blend over the terrain.
            self.markers.draw(&mut pass);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    size: winit::dpi::PhysicalSize<u32>,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Target"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FMT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
