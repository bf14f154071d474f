//! Renderer: wgpu surface/device setup, mesh upload and indexed draws.
//! wgpu = 26.x, winit = 0.30.x
//!
//! Consumes the asset layer's `MeshData`/`TextureData` and the corelib
//! scene/camera; owns everything GPU-side.

use std::num::NonZeroU64;
use std::sync::Arc;

use asset::mesh::{MeshData, MeshVertex};
use asset::texture::TextureData;
use bytemuck::{Pod, Zeroable};
use corelib::camera::FlyCamera;
use corelib::scene::Scene;
use wgpu::{
    util::DeviceExt, AddressMode, BindGroup, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, BlendState, Buffer, BufferBindingType, BufferUsages,
    ColorTargetState, ColorWrites, CommandEncoderDescriptor, DepthBiasState, DepthStencilState,
    Device, DeviceDescriptor, Extent3d, Features, FilterMode, FragmentState, Instance,
    InstanceDescriptor, Limits, LoadOp, Operations, PipelineLayoutDescriptor, PowerPreference,
    PresentMode, Queue, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline,
    RenderPipelineDescriptor, Sampler, SamplerDescriptor, ShaderModuleDescriptor, ShaderSource,
    ShaderStages, StoreOp, Surface, SurfaceConfiguration, SurfaceError, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
    VertexBufferLayout, VertexState, VertexStepMode,
};
use winit::{dpi::PhysicalSize, window::Window};

/// Attribute layout matching `MeshVertex`'s field order
/// (position, uv, normal).
pub const MESH_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<MeshVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3],
};

/// Camera UBO (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

/// Per-instance model matrix UBO.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Uploaded mesh buffers.
struct GpuMesh {
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,
}

/// Model-matrix buffer + bind group for one scene instance.
struct InstanceSlot {
    buf: Buffer,
    bind_group: BindGroup,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    #[allow(dead_code)]
    surface_format: TextureFormat,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline
    pipeline: RenderPipeline,

    // Camera
    camera_bg: BindGroup,
    camera_buf: Buffer,

    // Per-instance model uniforms
    model_bgl: BindGroupLayout,
    instance_slots: Vec<InstanceSlot>,

    // Diffuse texture
    texture_bgl: BindGroupLayout,
    texture_bg: BindGroup,
    sampler: Sampler,

    // Geometry
    mesh: Option<GpuMesh>,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends) -> Self {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .expect("create_surface failed");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("No suitable GPU adapter");

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Prism3D Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .expect("request_device failed");

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shaders ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Mesh WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        // ==== Bind group layouts ====
        let camera_bgl = uniform_bgl::<CameraUniform>(&device, "Camera BGL");
        let model_bgl = uniform_bgl::<ModelUniform>(&device, "Model BGL");

        let texture_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Texture BGL"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // ==== Camera UBO ====
        let camera_init = CameraUniform {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
        };
        let camera_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera UBO"),
            contents: bytemuck::bytes_of(&camera_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let camera_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera BG"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
        });

        // ==== Default texture ====
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("Diffuse Sampler"),
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });
        let texture_bg = create_texture_bg(
            &device,
            &queue,
            &texture_bgl,
            &sampler,
            &TextureData::checkerboard(64, 8),
        );

        // ==== Pipeline ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Mesh PipelineLayout"),
            bind_group_layouts: &[&camera_bgl, &model_bgl, &texture_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MESH_VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // loaded models are not guaranteed consistent winding
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            surface,
            surface_format,
            surface_config,
            device,
            queue,
            pipeline,
            camera_bg,
            camera_buf,
            model_bgl,
            instance_slots: Vec::new(),
            texture_bgl,
            texture_bg,
            sampler,
            mesh: None,
            depth_view,
            width,
            height,
        }
    }

    /// Upload loader output into vertex/index buffers.
    pub fn upload_mesh(&mut self, data: &MeshData) {
        debug_assert!(data.is_valid());
        if data.is_empty() {
            log::warn!("mesh has no triangles; nothing will be drawn");
            self.mesh = None;
            return;
        }
        let vertex_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh VB"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: BufferUsages::VERTEX,
            });
        let index_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh IB"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: BufferUsages::INDEX,
            });
        log::info!(
            "Uploaded mesh: {} vertices, {} triangles",
            data.vertices.len(),
            data.triangle_count()
        );
        self.mesh = Some(GpuMesh {
            vertex_buf,
            index_buf,
            index_count: data.indices.len() as u32,
        });
    }

    /// Replace the diffuse texture.
    pub fn set_texture(&mut self, data: &TextureData) {
        self.texture_bg = create_texture_bg(
            &self.device,
            &self.queue,
            &self.texture_bgl,
            &self.sampler,
            data,
        );
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: write camera + per-instance uniforms, clear, draw.
    pub fn render(&mut self, scene: &Scene, camera: &FlyCamera) -> Result<(), SurfaceError> {
        let cam = camera.with_aspect(self.width as f32 / self.height as f32);
        let camera_uniform = CameraUniform {
            view_proj: cam.proj_view().to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.camera_buf, 0, bytemuck::bytes_of(&camera_uniform));

        self.ensure_instance_slots(scene.len());
        for (inst, slot) in scene.iter().zip(&self.instance_slots) {
            let model = ModelUniform {
                model: inst.transform.matrix().to_cols_array_2d(),
            };
            self.queue
                .write_buffer(&slot.buf, 0, bytemuck::bytes_of(&model));
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: 0.05,
                            g: 0.05,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(mesh) = &self.mesh {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.camera_bg, &[]);
                rpass.set_bind_group(2, &self.texture_bg, &[]);
                rpass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
                rpass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                for slot in self.instance_slots.iter().take(scene.len()) {
                    rpass.set_bind_group(1, &slot.bind_group, &[]);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }

    /// Grow per-instance uniform slots to `count` (never shrinks).
    fn ensure_instance_slots(&mut self, count: usize) {
        while self.instance_slots.len() < count {
            let init = ModelUniform {
                model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            };
            let buf = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Model UBO"),
                    contents: bytemuck::bytes_of(&init),
                    usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Model BG"),
                layout: &self.model_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buf.as_entire_binding(),
                }],
            });
            self.instance_slots.push(InstanceSlot { buf, bind_group });
        }
    }
}

/// Bind group layout for a single vertex-stage uniform buffer of type `U`.
fn uniform_bgl<U>(device: &Device, label: &str) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(
                    NonZeroU64::new(std::mem::size_of::<U>() as u64).unwrap(),
                ),
            },
            count: None,
        }],
    })
}

/// Upload `data` and build the diffuse bind group.
fn create_texture_bg(
    device: &Device,
    queue: &Queue,
    layout: &BindGroupLayout,
    sampler: &Sampler,
    data: &TextureData,
) -> BindGroup {
    debug_assert!(data.is_valid());
    let size = Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("Diffuse Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8UnormSrgb,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width),
            rows_per_image: Some(data.height),
        },
        size,
    );
    let view = texture.create_view(&TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Texture BG"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
