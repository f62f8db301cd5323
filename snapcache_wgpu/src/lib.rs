// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! wgpu backend for snapcache.
//!
//! [`WgpuBackend`] renders node content and cached proxies as textured
//! triangles with a single pipeline. Solid fills sample a 1x1 white texture;
//! proxies sample their [`WgpuSurface`]. Draws are appended to a pending
//! batch and encoded into one render pass per [`flush`](RenderBackend::flush),
//! which also happens whenever the render target changes.
//!
//! Render state is a [`TargetStack`]: the presentable frame sits at the
//! bottom, snapshot surfaces are pushed on top while a subtree is captured,
//! and a snapshot always starts from an empty stack.
//!
//! # Frame protocol
//!
//! ```rust,ignore
//! backend.begin_frame(frame_view, width, height); // cleared to transparent
//! store.update_transforms();
//! store.render_roots(&mut backend);
//! backend.end_frame();                             // flush and unbind
//! ```
//!
//! Cached surfaces may be released at any point, mid-frame included. A
//! released texture stays alive until the batches that sample it are
//! submitted.

mod vertex;

use std::ops::Range;

use kurbo::Affine;
use snapcache_core::backend::{OffscreenSurface, RenderBackend, SurfaceError};
use snapcache_core::effect::Effect;
use snapcache_core::scene::{Color, Geometry};
use snapcache_core::state::{SavedStack, TargetStack};

use crate::vertex::{ClipSpace, Vertex};

const QUAD_SHADER: &str = r"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@group(0) @binding(0) var quad_texture: texture_2d<f32>;
@group(0) @binding(1) var quad_sampler: sampler;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(quad_texture, quad_sampler, in.uv) * in.color;
}
";

/// Batch key of the white fill texture. Surfaces count up from 1.
const WHITE_KEY: u64 = 0;

/// GPU backend configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WgpuBackendOptions {
    /// Color format of the frame target and of every snapshot surface.
    pub format: wgpu::TextureFormat,
    /// Pending quads (six vertices each) that trigger an early flush.
    pub max_batch_quads: usize,
}

impl Default for WgpuBackendOptions {
    fn default() -> Self {
        Self {
            format: wgpu::TextureFormat::Rgba8Unorm,
            max_batch_quads: 1024,
        }
    }
}

/// A render-target texture holding a cached snapshot.
#[derive(Debug)]
pub struct WgpuSurface {
    id: u64,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl WgpuSurface {
    /// The snapshot texture.
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// A view of the whole texture.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl OffscreenSurface for WgpuSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn destroy(self) {
        // Pending batches hold their own bind group handles.
        drop(self);
    }
}

/// An entry on the backend's render-target stack.
#[derive(Debug)]
pub enum GpuTarget {
    /// The presentable frame bound by [`WgpuBackend::begin_frame`].
    Frame {
        /// Frame view.
        view: wgpu::TextureView,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Whether the next pass clears before drawing.
        clear: bool,
    },
    /// A snapshot surface.
    Surface {
        /// The surface being drawn into.
        surface: WgpuSurface,
        /// Whether the next pass clears before drawing.
        clear: bool,
    },
}

impl GpuTarget {
    fn view(&self) -> &wgpu::TextureView {
        match self {
            Self::Frame { view, .. } => view,
            Self::Surface { surface, .. } => &surface.view,
        }
    }

    fn size(&self) -> (u32, u32) {
        match self {
            Self::Frame { width, height, .. } => (*width, *height),
            Self::Surface { surface, .. } => (surface.width, surface.height),
        }
    }

    fn take_clear(&mut self) -> bool {
        match self {
            Self::Frame { clear, .. } | Self::Surface { clear, .. } => core::mem::take(clear),
        }
    }
}

/// A run of vertices sharing one texture binding.
#[derive(Debug)]
struct Batch {
    key: u64,
    bind_group: wgpu::BindGroup,
    vertices: Range<u32>,
}

/// A [`RenderBackend`] on wgpu.
#[derive(Debug)]
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    vertices: Vec<Vertex>,
    batches: Vec<Batch>,
    stack: TargetStack<GpuTarget>,
    next_surface: u64,
    options: WgpuBackendOptions,
}

impl WgpuBackend {
    /// Creates the pipeline and shared resources on `device`.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, options: WgpuBackendOptions) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("snapcache quad shader"),
            source: wgpu::ShaderSource::Wgsl(QUAD_SHADER.into()),
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("snapcache quad texture"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("snapcache quad layout"),
            bind_group_layouts: &[&texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("snapcache quad pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: options.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("snapcache quad sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..wgpu::SamplerDescriptor::default()
        });

        let white_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("snapcache white"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &white_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255; 4],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let white_view = white_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let white = texture_bind_group(device, &texture_layout, &sampler, &white_view);

        let vertex_capacity = options.max_batch_quads.max(1) * 6;
        let vertex_buffer = create_vertex_buffer(device, vertex_capacity);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            texture_layout,
            sampler,
            white,
            vertex_buffer,
            vertex_capacity,
            vertices: Vec::with_capacity(vertex_capacity),
            batches: Vec::new(),
            stack: TargetStack::new(),
            next_surface: WHITE_KEY + 1,
            options,
        }
    }

    /// Binds the presentable frame and schedules a clear to transparent.
    pub fn begin_frame(&mut self, view: wgpu::TextureView, width: u32, height: u32) {
        self.flush();
        self.stack.push_target(GpuTarget::Frame {
            view,
            width,
            height,
            clear: true,
        });
    }

    /// Submits pending draws and unbinds the frame.
    pub fn end_frame(&mut self) {
        self.flush();
        self.stack.pop_target();
    }

    /// Number of bound render targets.
    #[must_use]
    pub fn target_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Effects currently on the filter stack, innermost last.
    #[must_use]
    pub fn filters(&self) -> &[Effect] {
        self.stack.filters()
    }

    /// The backend's configuration.
    #[must_use]
    pub fn options(&self) -> &WgpuBackendOptions {
        &self.options
    }

    fn push_vertices(
        &mut self,
        key: u64,
        bind_group: wgpu::BindGroup,
        emit: impl FnOnce(&mut Vec<Vertex>, ClipSpace),
    ) {
        let Some(target) = self.stack.top() else {
            return;
        };
        let (width, height) = target.size();
        let start = self.vertices.len();
        emit(&mut self.vertices, ClipSpace::new(width, height));
        let range = vertex_index(start)..vertex_index(self.vertices.len());
        if range.is_empty() {
            return;
        }

        match self.batches.last_mut() {
            Some(last) if last.key == key && last.vertices.end == range.start => {
                last.vertices.end = range.end;
            }
            _ => self.batches.push(Batch {
                key,
                bind_group,
                vertices: range,
            }),
        }

        if self.vertices.len() >= self.options.max_batch_quads.max(1) * 6 {
            self.flush();
        }
    }
}

impl RenderBackend for WgpuBackend {
    type Surface = WgpuSurface;
    type SavedState = SavedStack<GpuTarget>;

    fn flush(&mut self) {
        let Some(target) = self.stack.top_mut() else {
            self.vertices.clear();
            self.batches.clear();
            return;
        };
        let clear = target.take_clear();
        if self.batches.is_empty() && !clear {
            return;
        }

        if self.vertices.len() > self.vertex_capacity {
            self.vertex_capacity = self.vertices.len().next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.device, self.vertex_capacity);
        }
        if !self.vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("snapcache flush"),
            });
        {
            let load = if clear {
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
            } else {
                wgpu::LoadOp::Load
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("snapcache pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            if !self.batches.is_empty() {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                for batch in &self.batches {
                    pass.set_bind_group(0, &batch.bind_group, &[]);
                    pass.draw(batch.vertices.clone(), 0..1);
                }
            }
        }
        self.queue.submit([encoder.finish()]);

        self.vertices.clear();
        self.batches.clear();
    }

    fn allocate_surface(&mut self, width: u32, height: u32) -> Result<WgpuSurface, SurfaceError> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(SurfaceError::TooLarge { width, height, max });
        }
        if width == 0 || height == 0 {
            return Err(SurfaceError::Backend);
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("snapcache surface"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.options.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group =
            texture_bind_group(&self.device, &self.texture_layout, &self.sampler, &view);
        let id = self.next_surface;
        self.next_surface += 1;
        Ok(WgpuSurface {
            id,
            texture,
            view,
            bind_group,
            width,
            height,
        })
    }

    fn save_state(&mut self) -> Self::SavedState {
        self.flush();
        self.stack.save()
    }

    fn restore_state(&mut self, state: Self::SavedState) -> Option<WgpuSurface> {
        self.flush();
        let mut orphan = None;
        while let Some(target) = self.stack.pop_target() {
            if let GpuTarget::Surface { surface, .. } = target {
                orphan = Some(surface);
            }
        }
        self.stack.restore(state);
        orphan
    }

    fn bind_target(&mut self, surface: WgpuSurface, clear: bool) {
        self.flush();
        self.stack.push_target(GpuTarget::Surface { surface, clear });
    }

    fn take_target(&mut self) -> Option<WgpuSurface> {
        self.flush();
        match self.stack.pop_target()? {
            GpuTarget::Surface { surface, .. } => Some(surface),
            frame @ GpuTarget::Frame { .. } => {
                self.stack.push_target(frame);
                None
            }
        }
    }

    fn push_filter(&mut self, effect: &Effect) {
        self.stack.push_filter(*effect);
    }

    fn pop_filter(&mut self) {
        self.stack.pop_filter();
    }

    fn fill(&mut self, geometry: &Geometry, transform: Affine, color: Color, alpha: f32) {
        let color = vertex::premultiplied(color, alpha);
        let white = self.white.clone();
        self.push_vertices(WHITE_KEY, white, |out, clip| {
            vertex::fill(out, geometry, transform, clip, color);
        });
    }

    fn draw_surface(&mut self, surface: &WgpuSurface, transform: Affine, alpha: f32) {
        let (width, height) = (surface.width, surface.height);
        self.push_vertices(surface.id, surface.bind_group.clone(), |out, clip| {
            vertex::quad(out, width, height, transform, clip, alpha);
        });
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    view: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("snapcache quad texture"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_vertex_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("snapcache vertices"),
        size: (vertices * size_of::<Vertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "pending vertices are bounded by the flush threshold"
)]
fn vertex_index(i: usize) -> u32 {
    i as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use snapcache_core::effect::EffectId;
    use snapcache_core::scene::{Content, NodeId, SceneStore};

    fn gpu() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::default();
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .ok()?;
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("snapcache tests"),
            ..wgpu::DeviceDescriptor::default()
        }))
        .ok()
    }

    fn frame_view(device: &wgpu::Device, size: u32) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("test frame"),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: WgpuBackendOptions::default().format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn square(store: &mut SceneStore<WgpuSurface>, side: f64) -> NodeId {
        let id = store.create_node();
        store.set_content(
            id,
            Some(Content::fill(
                Geometry::Rect(Rect::new(0.0, 0.0, side, side)),
                Color::WHITE,
            )),
        );
        id
    }

    fn frame(
        store: &mut SceneStore<WgpuSurface>,
        backend: &mut WgpuBackend,
        view: &wgpu::TextureView,
    ) {
        store.update_transforms();
        backend.begin_frame(view.clone(), 64, 64);
        store.render_roots(backend);
        assert_eq!(backend.target_depth(), 1, "only the frame stays bound");
        backend.end_frame();
    }

    #[test]
    fn surface_over_device_limit_is_refused() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let mut backend = WgpuBackend::new(&device, &queue, WgpuBackendOptions::default());
        let max = device.limits().max_texture_dimension_2d;
        let err = backend.allocate_surface(max + 1, 4).unwrap_err();
        assert_eq!(
            err,
            SurfaceError::TooLarge {
                width: max + 1,
                height: 4,
                max
            }
        );
    }

    #[test]
    fn cached_node_keeps_one_surface_across_frames() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let mut backend = WgpuBackend::new(&device, &queue, WgpuBackendOptions::default());
        let view = frame_view(&device, 64);
        let mut store = SceneStore::new();
        let id = square(&mut store, 20.0);
        store.set_transform(id, Affine::translate((8.0, 8.0)));
        store.set_cached(id, true);

        frame(&mut store, &mut backend, &view);
        let first = store.cached_proxy(id).unwrap().surface().id;
        frame(&mut store, &mut backend, &view);
        let surface = store.cached_proxy(id).unwrap().surface();
        assert_eq!(surface.id, first, "no re-snapshot on later frames");
        assert_eq!((surface.width(), surface.height()), (20, 20));
        assert_eq!(backend.target_depth(), 0);

        store.set_cached(id, false);
        assert!(store.cached_proxy(id).is_none(), "surface released");
    }

    #[test]
    fn uncache_mid_frame_defers_texture_release() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let mut backend = WgpuBackend::new(&device, &queue, WgpuBackendOptions::default());
        let view = frame_view(&device, 64);
        let mut store = SceneStore::new();
        let id = square(&mut store, 12.0);
        store.set_cached(id, true);

        store.update_transforms();
        backend.begin_frame(view.clone(), 64, 64);
        store.render_roots(&mut backend);
        assert!(store.cached_proxy(id).is_some());
        store.set_cached(id, false);
        assert!(store.cached_proxy(id).is_none(), "surface released");
        // The proxy draw is still batched; submitting it must not fault.
        backend.end_frame();

        frame(&mut store, &mut backend, &view);
        assert!(store.cached_proxy(id).is_none());
    }

    #[test]
    fn snapshot_inside_effect_restores_filter_stack() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let mut backend = WgpuBackend::new(&device, &queue, WgpuBackendOptions::default());
        let view = frame_view(&device, 64);
        let mut store = SceneStore::new();
        let root = square(&mut store, 4.0);
        store.push_effect(root, Effect::new(EffectId(7), 2.0));
        let parent = square(&mut store, 10.0);
        let child = square(&mut store, 5.0);
        store.add_child(root, parent);
        store.add_child(parent, child);
        store.push_effect(child, Effect::new(EffectId(8), 1.0));
        store.set_cached(child, true);
        store.set_cached(parent, true);

        frame(&mut store, &mut backend, &view);
        assert!(backend.filters().is_empty(), "filters popped");
        let outer = store.cached_proxy(parent).unwrap().surface();
        let inner = store.cached_proxy(child).unwrap().surface();
        assert_eq!((inner.width(), inner.height()), (7, 7));
        assert_eq!((outer.width(), outer.height()), (10, 10));
        assert_ne!(outer.id, inner.id);
    }

    #[test]
    fn take_target_leaves_frame_bound() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let mut backend = WgpuBackend::new(&device, &queue, WgpuBackendOptions::default());
        let view = frame_view(&device, 16);
        backend.begin_frame(view, 16, 16);
        assert!(backend.take_target().is_none(), "the frame is not a surface");
        assert_eq!(backend.target_depth(), 1);

        let surface = backend.allocate_surface(8, 8).unwrap();
        let saved = backend.save_state();
        assert_eq!(backend.target_depth(), 0, "snapshots start from an empty stack");
        backend.bind_target(surface, true);
        backend.fill(
            &Geometry::Rect(Rect::new(0.0, 0.0, 8.0, 8.0)),
            Affine::IDENTITY,
            Color::WHITE,
            1.0,
        );
        let surface = backend.take_target().unwrap();
        assert!(backend.restore_state(saved).is_none(), "nothing left bound");
        assert_eq!(backend.target_depth(), 1);

        backend.draw_surface(&surface, Affine::translate((4.0, 4.0)), 0.5);
        backend.end_frame();
        surface.destroy();
    }

    #[test]
    fn draws_without_a_target_are_dropped() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let mut backend = WgpuBackend::new(&device, &queue, WgpuBackendOptions::default());
        backend.fill(
            &Geometry::Rect(Rect::new(0.0, 0.0, 8.0, 8.0)),
            Affine::IDENTITY,
            Color::WHITE,
            1.0,
        );
        assert!(backend.vertices.is_empty(), "nothing queued");
        backend.flush();
    }
}
