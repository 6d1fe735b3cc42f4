//! wgpu forward renderer: surface/device setup, the mesh and helper
//! pipelines, per-frame uniform upload, and the egui overlay pass.

pub mod camera;
pub mod pick;

pub use camera::{Camera, OrbitController};

use crate::app::EguiFrameOutput;
use crate::assets::{MaterialFactors, ModelData};
use crate::scene::lighting::LightRig;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

// 0x202020, the viewer's fixed background.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.016,
    g: 0.016,
    b: 0.016,
    a: 1.0,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Enough for three area-light outlines plus the directional marker.
const HELPER_VERTEX_CAPACITY: usize = 256;

const FLOOR_COLOR: [f32; 4] = [0.33, 0.33, 0.35, 1.0];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to acquire GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    hemi_sky: [f32; 4],
    hemi_ground: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    rim_pos: [f32; 4],
    rim_color: [f32; 4],
    ambient: [f32; 4],
    area_pos: [[f32; 4]; 3],
    area_color: [[f32; 4]; 3],
    area_u: [[f32; 4]; 3],
    area_v: [[f32; 4]; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MaterialUniform {
    base_color: [f32; 4],
    emissive: [f32; 4],
    params: [f32; 4],
}

impl From<&MaterialFactors> for MaterialUniform {
    fn from(factors: &MaterialFactors) -> Self {
        Self {
            base_color: factors.base_color,
            emissive: [
                factors.emissive[0],
                factors.emissive[1],
                factors.emissive[2],
                0.0,
            ],
            params: [
                factors.metallic,
                factors.roughness,
                if factors.shaded { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 3],
    color: [f32; 3],
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_bind_group: wgpu::BindGroup,
    // Kept alive for the bind group's sake.
    _material_buffer: wgpu::Buffer,
}

pub struct RenderContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    material_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_primitives: Vec<GpuPrimitive>,
    floor: GpuPrimitive,
    helper_buffer: wgpu::Buffer,
    helper_vertex_count: u32,
    ui_renderer: egui_wgpu::Renderer,
}

impl RenderContext {
    pub fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        pollster::block_on(Self::new_async(window))
    }

    async fn new_async(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        log::info!("GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("turntable device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("viewer shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame uniforms"),
            entries: &[uniform_layout_entry(0)],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material uniforms"),
            entries: &[uniform_layout_entry(0)],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniform buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame bind group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh pipeline layout"),
            bind_group_layouts: &[&frame_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Arbitrary imported geometry: render both faces.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line pipeline layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });
        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("helper line pipeline"),
            layout: Some(&line_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_line"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_line"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let helper_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("helper line buffer"),
            size: (HELPER_VERTEX_CAPACITY * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let floor = build_floor(&device, &material_layout, 5.0, 0.0);
        let ui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        log::info!(
            "Renderer initialized ({}x{}, {:?})",
            config.width,
            config.height,
            surface_format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            mesh_pipeline,
            line_pipeline,
            material_layout,
            frame_buffer,
            frame_bind_group,
            model_primitives: Vec::new(),
            floor,
            helper_buffer,
            helper_vertex_count: 0,
            ui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.config.width = new_size.width.max(1);
        self.config.height = new_size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.config.width, self.config.height);
    }

    /// Upload a loaded (already recentered) model, replacing whatever
    /// was there, and rebuild the floor under its base.
    pub fn upload_model(&mut self, model: &ModelData) {
        self.model_primitives = model
            .primitives
            .iter()
            .map(|primitive| {
                let vertices: Vec<MeshVertex> = primitive
                    .positions
                    .iter()
                    .zip(&primitive.normals)
                    .map(|(position, normal)| MeshVertex {
                        position: *position,
                        normal: *normal,
                    })
                    .collect();
                let vertex_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("model vertices"),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                let index_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("model indices"),
                            contents: bytemuck::cast_slice(&primitive.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        });
                let (material_bind_group, material_buffer) = self.material_bind_group(
                    MaterialUniform::from(&primitive.material),
                    "model material",
                );
                GpuPrimitive {
                    vertex_buffer,
                    index_buffer,
                    index_count: primitive.indices.len() as u32,
                    material_bind_group,
                    _material_buffer: material_buffer,
                }
            })
            .collect();

        let size = model.size();
        let half_extent = (size.x.max(size.z) * 2.0).max(5.0);
        self.floor = build_floor(
            &self.device,
            &self.material_layout,
            half_extent,
            model.min.y,
        );
    }

    /// Drop the model geometry (failed load: keep drawing the default
    /// scene).
    pub fn clear_model(&mut self) {
        self.model_primitives.clear();
    }

    fn material_bind_group(
        &self,
        uniform: MaterialUniform,
        label: &str,
    ) -> (wgpu::BindGroup, wgpu::Buffer) {
        create_material_bind_group(&self.device, &self.material_layout, uniform, label)
    }

    /// Draw one frame: scene pass (floor, model, helpers) then the egui
    /// overlay pass.
    pub fn render(
        &mut self,
        rig: &LightRig,
        camera: &Camera,
        controller: &OrbitController,
        ui: EguiFrameOutput,
    ) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => return,
            Err(err) => {
                log::error!("Surface error: {err}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&frame_uniforms(rig, camera, controller)),
        );
        let helpers = if rig.show_helpers {
            helper_lines(rig)
        } else {
            Vec::new()
        };
        self.helper_vertex_count = helpers.len().min(HELPER_VERTEX_CAPACITY) as u32;
        if self.helper_vertex_count > 0 {
            self.queue.write_buffer(
                &self.helper_buffer,
                0,
                bytemuck::cast_slice(&helpers[..self.helper_vertex_count as usize]),
            );
        }

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: ui.pixels_per_point,
        };
        for (id, delta) in &ui.textures_delta.set {
            self.ui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        let ui_commands = self.ui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &ui.clipped_primitives,
            &screen,
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            if rig.show_floor {
                draw_primitive(&mut pass, &self.floor);
            }
            for primitive in &self.model_primitives {
                draw_primitive(&mut pass, primitive);
            }

            if self.helper_vertex_count > 0 {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_vertex_buffer(0, self.helper_buffer.slice(..));
                pass.draw(0..self.helper_vertex_count, 0..1);
            }
        }

        {
            let mut ui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("ui pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.ui_renderer
                .render(&mut ui_pass, &ui.clipped_primitives, &screen);
        }

        self.queue
            .submit(ui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();

        for id in &ui.textures_delta.free {
            self.ui_renderer.free_texture(id);
        }
    }
}

fn draw_primitive<'a>(pass: &mut wgpu::RenderPass<'a>, primitive: &'a GpuPrimitive) {
    pass.set_bind_group(1, &primitive.material_bind_group, &[]);
    pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
    pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..primitive.index_count, 0, 0..1);
}

fn uniform_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth buffer"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform: MaterialUniform,
    label: &str,
) -> (wgpu::BindGroup, wgpu::Buffer) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(&uniform),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (bind_group, buffer)
}

fn build_floor(
    device: &wgpu::Device,
    material_layout: &wgpu::BindGroupLayout,
    half_extent: f32,
    y: f32,
) -> GpuPrimitive {
    let vertices = [
        MeshVertex {
            position: [-half_extent, y, -half_extent],
            normal: [0.0, 1.0, 0.0],
        },
        MeshVertex {
            position: [half_extent, y, -half_extent],
            normal: [0.0, 1.0, 0.0],
        },
        MeshVertex {
            position: [half_extent, y, half_extent],
            normal: [0.0, 1.0, 0.0],
        },
        MeshVertex {
            position: [-half_extent, y, half_extent],
            normal: [0.0, 1.0, 0.0],
        },
    ];
    let indices: [u32; 6] = [0, 2, 1, 0, 3, 2];
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("floor vertices"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("floor indices"),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let (material_bind_group, material_buffer) = create_material_bind_group(
        device,
        material_layout,
        MaterialUniform {
            base_color: FLOOR_COLOR,
            emissive: [0.0; 4],
            params: [0.0, 0.9, 1.0, 0.0],
        },
        "floor material",
    );
    GpuPrimitive {
        vertex_buffer,
        index_buffer,
        index_count: indices.len() as u32,
        material_bind_group,
        _material_buffer: material_buffer,
    }
}

fn frame_uniforms(rig: &LightRig, camera: &Camera, controller: &OrbitController) -> FrameUniforms {
    let view_proj = camera.projection() * controller.view_matrix();
    let mut uniforms = FrameUniforms {
        view_proj: view_proj.to_cols_array_2d(),
        eye: vec4(controller.eye(), 1.0),
        hemi_sky: vec4(rig.hemisphere.sky, rig.hemisphere.intensity),
        hemi_ground: vec4(rig.hemisphere.ground, 0.0),
        sun_dir: vec4(rig.directional.direction(), rig.directional.intensity),
        sun_color: vec4(rig.directional.color, rig.directional.intensity),
        rim_pos: vec4(rig.rim.position, rig.rim.intensity),
        rim_color: vec4(rig.rim.color, 0.0),
        ambient: vec4(rig.ambient_color, rig.ambient_intensity),
        area_pos: [[0.0; 4]; 3],
        area_color: [[0.0; 4]; 3],
        area_u: [[0.0; 4]; 3],
        area_v: [[0.0; 4]; 3],
    };
    for (index, light) in rig.area.iter().enumerate() {
        let (axis_u, axis_v, _) = light.axes();
        let half_width = light.width * 0.5;
        let half_height = light.height * 0.5;
        uniforms.area_pos[index] = vec4(light.position, 0.0);
        uniforms.area_color[index] = vec4(light.color, light.intensity);
        uniforms.area_u[index] = vec4(axis_u * half_width, half_width);
        uniforms.area_v[index] = vec4(axis_v * half_height, half_height);
    }
    uniforms
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// Wireframe overlays: an outline plus emission tick per area light and
/// an axis marker at the directional light.
fn helper_lines(rig: &LightRig) -> Vec<LineVertex> {
    let mut lines = Vec::with_capacity(HELPER_VERTEX_CAPACITY);
    for light in &rig.area {
        let color = light.color.to_array();
        let corners = light.corners();
        for index in 0..4 {
            lines.push(LineVertex {
                position: corners[index].to_array(),
                color,
            });
            lines.push(LineVertex {
                position: corners[(index + 1) % 4].to_array(),
                color,
            });
        }
        let (_, _, facing) = light.axes();
        let tick = light.position + facing * (light.width.min(light.height) * 0.5);
        lines.push(LineVertex {
            position: light.position.to_array(),
            color,
        });
        lines.push(LineVertex {
            position: tick.to_array(),
            color,
        });
    }

    let sun = rig.directional.position;
    let sun_color = [1.0, 0.92, 0.5];
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        lines.push(LineVertex {
            position: (sun - axis * 0.5).to_array(),
            color: sun_color,
        });
        lines.push(LineVertex {
            position: (sun + axis * 0.5).to_array(),
            color: sun_color,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::lighting::Settings;

    #[test]
    fn frame_uniforms_mirror_the_rig() {
        let basis = Vec3::new(4.0, 2.0, 6.0);
        let settings = Settings::for_basis(basis);
        let rig = LightRig::new(basis, &settings);
        let camera = Camera::new(1280, 720);
        let controller = OrbitController::new(&crate::scene::Framing::default_view());

        let uniforms = frame_uniforms(&rig, &camera, &controller);
        for (index, light) in rig.area.iter().enumerate() {
            assert_eq!(uniforms.area_pos[index][1], light.position.y);
            assert_eq!(uniforms.area_color[index][3], light.intensity);
            assert!((uniforms.area_u[index][3] - light.width * 0.5).abs() < 1e-6);
            assert!((uniforms.area_v[index][3] - light.height * 0.5).abs() < 1e-6);
        }
        assert_eq!(uniforms.sun_color[3], rig.directional.intensity);
    }

    #[test]
    fn helper_lines_fit_the_reserved_buffer() {
        let basis = Vec3::ONE;
        let settings = Settings::for_basis(basis);
        let rig = LightRig::new(basis, &settings);
        let lines = helper_lines(&rig);
        assert!(!lines.is_empty());
        assert!(lines.len() <= HELPER_VERTEX_CAPACITY);
        // Line-list topology needs an even vertex count.
        assert_eq!(lines.len() % 2, 0);
    }
}
