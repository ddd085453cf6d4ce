//! Render Device Boundary
//!
//! The rendering core never talks to a graphics API directly. Every GPU
//! interaction goes through the [`RenderDevice`] trait: resource creation,
//! state binding, draws and dispatches. Backends (a wgpu device, a recording
//! device for tests, a network proxy) implement the trait.
//!
//! # Design
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────────┐
//! │   SceneRenderer      │      │   dyn RenderDevice       │
//! │   PassExecutor       │ ───→ │   create_* / write_*     │
//! │   post-process chain │      │   set_* / bind_*         │
//! └──────────────────────┘      │   draw* / dispatch       │
//!                               └──────────────────────────┘
//! ```
//!
//! Handles are plain `u64` newtypes issued by the device. Calls are
//! infallible; a backend reports its own validation errors.

mod recording;

pub use recording::{DeviceCommand, RecordingDevice};

use glam::UVec3;
use smallvec::SmallVec;

use crate::renderer::state::{
    DepthStencilState, DispatchState, RasterState, RenderTargets, ShaderResources,
};

// ─── Handles ──────────────────────────────────────────────────────────────────

macro_rules! device_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw handle value as issued by the device.
            #[inline]
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

device_handle!(
    /// GPU texture handle.
    TextureHandle
);
device_handle!(
    /// GPU buffer handle.
    BufferHandle
);
device_handle!(
    /// Compiled shader program handle (graphics or compute).
    ShaderHandle
);
device_handle!(
    /// Vertex input layout handle.
    InputLayoutHandle
);

// ─── Descriptors ──────────────────────────────────────────────────────────────

/// Texture creation descriptor.
///
/// Storage (UAV) access is expressed through
/// [`wgpu::TextureUsages::STORAGE_BINDING`] in `usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub dimension: wgpu::TextureViewDimension,
    pub mip_level_count: u32,
    pub depth_or_array_layers: u32,
    pub usage: wgpu::TextureUsages,
}

impl TextureDesc {
    /// Single-mip 2D render target.
    #[must_use]
    pub fn render_target(width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            dimension: wgpu::TextureViewDimension::D2,
            mip_level_count: 1,
            depth_or_array_layers: 1,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
        }
    }

    #[must_use]
    pub fn with_mips(mut self, mip_level_count: u32) -> Self {
        self.mip_level_count = mip_level_count.max(1);
        self
    }

    #[must_use]
    pub fn with_layers(mut self, dimension: wgpu::TextureViewDimension, layers: u32) -> Self {
        self.dimension = dimension;
        self.depth_or_array_layers = layers.max(1);
        self
    }

    #[must_use]
    pub fn with_storage(mut self) -> Self {
        self.usage |= wgpu::TextureUsages::STORAGE_BINDING;
        self
    }

    /// Size of mip `level`, clamped to 1×1.
    #[inline]
    #[must_use]
    pub fn mip_size(&self, level: u32) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }
}

/// Buffer creation descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    pub size: u64,
    pub usage: wgpu::BufferUsages,
}

impl BufferDesc {
    #[must_use]
    pub fn uniform(size: u64) -> Self {
        Self {
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }
    }

    #[must_use]
    pub fn vertex(size: u64) -> Self {
        Self {
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        }
    }
}

/// Mesh input binding: topology, layout, index and vertex buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderInputs {
    pub topology: wgpu::PrimitiveTopology,
    pub layout: InputLayoutHandle,
    pub index_buffer: Option<(BufferHandle, wgpu::IndexFormat)>,
    pub vertex_buffers: SmallVec<[BufferHandle; 4]>,
}

/// Arguments of one (indexed or non-indexed) draw.
///
/// For non-indexed draws `count` is the vertex count and `first` the first
/// vertex; for indexed draws they address the bound index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawArguments {
    pub count: u32,
    pub first: u32,
    pub base_vertex: i32,
    pub instance_count: u32,
    pub first_instance: u32,
}

impl DrawArguments {
    #[must_use]
    pub fn vertices(count: u32) -> Self {
        Self {
            count,
            instance_count: 1,
            ..Default::default()
        }
    }
}

// ─── Device Trait ─────────────────────────────────────────────────────────────

/// Opaque command-issuing graphics device.
///
/// The trait is object safe; post-process effects receive it as
/// `&mut dyn RenderDevice`.
pub trait RenderDevice {
    // ── Resources ──────────────────────────────────────────────────────────
    fn create_texture(&mut self, label: &str, desc: &TextureDesc) -> TextureHandle;
    fn destroy_texture(&mut self, texture: TextureHandle);
    fn create_buffer(&mut self, label: &str, desc: &BufferDesc) -> BufferHandle;
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]);
    fn write_texture(&mut self, texture: TextureHandle, mip: u32, layer: u32, data: &[u8]);

    // ── State ──────────────────────────────────────────────────────────────
    fn set_shader(&mut self, shader: ShaderHandle);
    fn bind_shader_resources(&mut self, resources: &ShaderResources);
    fn bind_shader_inputs(&mut self, inputs: &ShaderInputs);
    fn set_raster_state(&mut self, state: &RasterState);
    fn set_depth_stencil_state(&mut self, state: &DepthStencilState);
    fn bind_render_targets(&mut self, targets: &RenderTargets);
    /// Clears the bound targets according to the clear flags in `targets`.
    fn clear_render_targets(&mut self, targets: &RenderTargets);
    fn clear_texture_float(&mut self, texture: TextureHandle, value: f32);

    // ── Work ───────────────────────────────────────────────────────────────
    fn draw(&mut self, args: &[DrawArguments]);
    /// Indexed draw; more than one argument is a multi-draw submission.
    fn draw_indexed(&mut self, args: &[DrawArguments]);
    fn dispatch(&mut self, state: &DispatchState, groups: UVec3);
    fn generate_mipmaps(&mut self, texture: TextureHandle);
    /// Copies `src` into `dst`, or into the presentable surface when `dst` is `None`.
    fn blit(&mut self, src: TextureHandle, dst: Option<TextureHandle>);

    /// Forgets any cached binding state so the next calls rebind everything.
    fn invalidate_state(&mut self);

    // ── Debug ──────────────────────────────────────────────────────────────
    fn push_debug_group(&mut self, label: &str);
    fn pop_debug_group(&mut self);
}

/// Issues the shader, resources and fixed-function state of a fullscreen or
/// non-material draw in one go.
pub fn apply_draw_state(device: &mut dyn RenderDevice, state: &crate::renderer::state::DrawCallState) {
    if let Some(shader) = state.shader {
        device.set_shader(shader);
    }
    device.bind_shader_resources(&state.resources);
    device.set_raster_state(&state.raster);
    device.set_depth_stencil_state(&state.depth_stencil);
}
