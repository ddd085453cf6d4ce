//! Transient Draw & Dispatch State
//!
//! [`DrawCallState`] and [`DispatchState`] are the descriptors a pass fills
//! before talking to the device: bound targets, textures, samplers, buffers,
//! fixed-function state and loose uniform values. They are built per pass and
//! dropped at the end of it.
//!
//! Binding tables are small ordered vectors keyed by the shader-side name.
//! Setting an existing name replaces its value in place so the binding order
//! stays stable across frames.

use glam::{Mat4, Vec2, Vec3, Vec4};
use smallvec::SmallVec;

use crate::renderer::device::{BufferHandle, ShaderHandle, TextureHandle};

// ─── Binding Table ────────────────────────────────────────────────────────────

/// Ordered name → value table used for every kind of shader binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings<T> {
    entries: SmallVec<[(&'static str, T); 8]>,
}

impl<T> Default for Bindings<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> Bindings<T> {
    pub fn set(&mut self, name: &'static str, value: T) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        let index = self.entries.iter().position(|(n, _)| *n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ─── Samplers & Uniforms ──────────────────────────────────────────────────────

/// Fixed sampler presets understood by every device backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    ClampClampLinearLinear,
    ClampClampNearestNearest,
    RepeatRepeatLinearLinear,
    /// Comparison sampler for hardware PCF shadow lookups.
    LinearShadowCompare,
}

/// Loose (non-buffer) uniform value.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Mat4Array(Vec<Mat4>),
}

macro_rules! impl_uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for UniformValue {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

impl_uniform_from!(
    bool => Bool,
    u32 => UInt,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat4 => Mat4,
    Vec<Mat4> => Mat4Array,
);

/// Sampled texture binding. `texture: None` is an explicit null binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    pub texture: Option<TextureHandle>,
    pub sampler: Option<SamplerKind>,
}

/// Read-write (storage / UAV) binding of one mip level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageBinding {
    pub texture: TextureHandle,
    pub mip: u32,
}

/// Everything a shader reads or writes besides vertex input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderResources {
    pub textures: Bindings<TextureBinding>,
    pub storage_textures: Bindings<StorageBinding>,
    pub uniform_buffers: Bindings<BufferHandle>,
    pub storage_buffers: Bindings<BufferHandle>,
    pub uniforms: Bindings<UniformValue>,
}

impl ShaderResources {
    pub fn bind_texture(&mut self, name: &'static str, texture: TextureHandle) {
        let sampler = self.textures.get(name).and_then(|b| b.sampler);
        self.textures.set(
            name,
            TextureBinding {
                texture: Some(texture),
                sampler,
            },
        );
    }

    /// Binds an explicit null texture so the shader sees "no input".
    pub fn bind_null_texture(&mut self, name: &'static str) {
        self.textures.set(
            name,
            TextureBinding {
                texture: None,
                sampler: None,
            },
        );
    }

    pub fn bind_sampler(&mut self, name: &'static str, sampler: SamplerKind) {
        if let Some(binding) = self.textures.get_mut(name) {
            binding.sampler = Some(sampler);
        } else {
            self.textures.set(
                name,
                TextureBinding {
                    texture: None,
                    sampler: Some(sampler),
                },
            );
        }
    }

    pub fn bind_storage_texture(&mut self, name: &'static str, texture: TextureHandle, mip: u32) {
        self.storage_textures
            .set(name, StorageBinding { texture, mip });
    }

    pub fn bind_uniform_buffer(&mut self, name: &'static str, buffer: BufferHandle) {
        self.uniform_buffers.set(name, buffer);
    }

    pub fn bind_storage_buffer(&mut self, name: &'static str, buffer: BufferHandle) {
        self.storage_buffers.set(name, buffer);
    }

    pub fn set_uniform(&mut self, name: &'static str, value: impl Into<UniformValue>) {
        self.uniforms.set(name, value.into());
    }
}

// ─── Fixed-Function State ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterState {
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,
    pub polygon_mode: wgpu::PolygonMode,
    pub blend: Option<wgpu::BlendState>,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            cull_mode: Some(wgpu::Face::Back),
            front_face: wgpu::FrontFace::Ccw,
            polygon_mode: wgpu::PolygonMode::Fill,
            blend: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_enable: bool,
    pub depth_write: bool,
    pub compare: wgpu::CompareFunction,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write: true,
            compare: wgpu::CompareFunction::Less,
        }
    }
}

impl DepthStencilState {
    /// Depth test and write disabled, for fullscreen passes.
    pub const DISABLED: Self = Self {
        depth_enable: false,
        depth_write: false,
        compare: wgpu::CompareFunction::Always,
    };
}

// ─── Targets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewPort {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewPort {
    #[must_use]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// One attachment: a texture plus the array layer and mip rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBinding {
    pub texture: TextureHandle,
    pub layer: u32,
    pub mip: u32,
}

/// Bound attachments, viewport and clear requests of a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargets {
    pub colors: SmallVec<[TargetBinding; 4]>,
    pub depth: Option<TargetBinding>,
    pub viewport: ViewPort,
    pub clear_color_target: bool,
    pub clear_depth_target: bool,
    pub clear_color: Vec4,
    pub clear_depth: f32,
}

impl Default for RenderTargets {
    fn default() -> Self {
        Self {
            colors: SmallVec::new(),
            depth: None,
            viewport: ViewPort::default(),
            clear_color_target: false,
            clear_depth_target: false,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            clear_depth: 1.0,
        }
    }
}

impl RenderTargets {
    pub fn bind_target(&mut self, index: usize, texture: TextureHandle) {
        let binding = TargetBinding {
            texture,
            layer: 0,
            mip: 0,
        };
        if index < self.colors.len() {
            self.colors[index] = binding;
        } else {
            self.colors.push(binding);
        }
    }

    pub fn bind_depth_target(&mut self, texture: TextureHandle, layer: u32, mip: u32) {
        self.depth = Some(TargetBinding {
            texture,
            layer,
            mip,
        });
    }

    #[inline]
    #[must_use]
    pub fn wants_clear(&self) -> bool {
        self.clear_color_target || self.clear_depth_target
    }
}

// ─── Aggregate States ─────────────────────────────────────────────────────────

/// Complete description of a graphics draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawCallState {
    pub shader: Option<ShaderHandle>,
    pub targets: RenderTargets,
    pub resources: ShaderResources,
    pub raster: RasterState,
    pub depth_stencil: DepthStencilState,
}

impl DrawCallState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for a fullscreen triangle: no culling, no depth.
    #[must_use]
    pub fn fullscreen(shader: ShaderHandle) -> Self {
        Self {
            shader: Some(shader),
            raster: RasterState {
                cull_mode: None,
                ..RasterState::default()
            },
            depth_stencil: DepthStencilState::DISABLED,
            ..Self::default()
        }
    }
}

/// Complete description of a compute dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchState {
    pub shader: ShaderHandle,
    pub resources: ShaderResources,
}

impl DispatchState {
    #[must_use]
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            shader,
            resources: ShaderResources::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_replace_in_place() {
        let mut table = Bindings::default();
        table.set("a", 1);
        table.set("b", 2);
        table.set("a", 3);

        let names: Vec<_> = table.iter().map(|(n, v)| (n, *v)).collect();
        assert_eq!(names, vec![("a", 3), ("b", 2)]);
    }

    #[test]
    fn sampler_survives_texture_rebind() {
        let mut resources = ShaderResources::default();
        resources.bind_sampler("_FinalBloom", SamplerKind::ClampClampLinearLinear);
        resources.bind_texture("_FinalBloom", TextureHandle(7));

        let binding = resources.textures.get("_FinalBloom").copied();
        assert_eq!(
            binding,
            Some(TextureBinding {
                texture: Some(TextureHandle(7)),
                sampler: Some(SamplerKind::ClampClampLinearLinear),
            })
        );
    }

    #[test]
    fn bind_target_grows_and_replaces() {
        let mut targets = RenderTargets::default();
        targets.bind_target(0, TextureHandle(1));
        targets.bind_target(0, TextureHandle(2));
        targets.bind_target(1, TextureHandle(3));
        assert_eq!(targets.colors.len(), 2);
        assert_eq!(targets.colors[0].texture, TextureHandle(2));
    }
}
