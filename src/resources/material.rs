//! Material Resource
//!
//! Materials are data, not a type hierarchy. Every material exposes the same
//! operation set ([`Material::begin_pass`], [`Material::end_pass`],
//! [`Material::sort_type`], [`Material::has_flag`], [`Material::kind`]) and
//! carries a per-pass table of [`MaterialPass`] entries. A material that has
//! no entry for a pass does not take part in it.
//!
//! ```text
//! Material
//!  ├─ kind       : MaterialKind   (statistics / debug)
//!  ├─ sort_type  : SortType       (render-set bucket)
//!  ├─ flags      : MaterialFlags  (INSTANCED, SKIP_SHADOWS)
//!  └─ passes     : [Option<MaterialPass>; PassType::COUNT]
//!                     └─ shader + resources + raster + depth state
//! ```

use bitflags::bitflags;

use crate::renderer::device::ShaderHandle;
use crate::renderer::state::{DepthStencilState, DrawCallState, RasterState, ShaderResources};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFlags: u32 {
        /// Instances are drawn with one instanced draw per batch.
        const INSTANCED    = 1 << 0;
        /// Excluded from shadow cascades.
        const SKIP_SHADOWS = 1 << 1;
    }
}

/// Render-set bucket. Buckets are drawn in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum SortType {
    #[default]
    Opaque = 0,
    Transparent = 1,
    Translucent = 2,
    Sky = 3,
    Overlay = 4,
}

impl SortType {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Opaque,
        Self::Transparent,
        Self::Translucent,
        Self::Sky,
        Self::Overlay,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Opaque => "Opaque",
            Self::Transparent => "Transparent",
            Self::Translucent => "Translucent",
            Self::Sky => "Sky",
            Self::Overlay => "Overlay",
        }
    }
}

/// Pass a material can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PassType {
    /// Depth only: depth pre-pass and shadow maps.
    Depth = 0,
    /// Shaded color output.
    Ambient = 1,
}

impl PassType {
    pub const COUNT: usize = 2;

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Material family, used for per-frame visibility statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Lit,
    Unlit,
    Sky,
    Custom(&'static str),
}

/// Everything a material binds for one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPass {
    pub shader: ShaderHandle,
    pub resources: ShaderResources,
    pub raster: RasterState,
    pub depth_stencil: DepthStencilState,
}

impl MaterialPass {
    #[must_use]
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            shader,
            resources: ShaderResources::default(),
            raster: RasterState::default(),
            depth_stencil: DepthStencilState::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    kind: MaterialKind,
    sort_type: SortType,
    flags: MaterialFlags,
    passes: [Option<MaterialPass>; PassType::COUNT],
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MaterialKind, sort_type: SortType) -> Self {
        Self {
            name: name.into(),
            kind,
            sort_type,
            flags: MaterialFlags::empty(),
            passes: [None, None],
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: MaterialFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_pass(mut self, pass: PassType, entry: MaterialPass) -> Self {
        self.passes[pass.index()] = Some(entry);
        self
    }

    pub fn set_pass(&mut self, pass: PassType, entry: Option<MaterialPass>) {
        self.passes[pass.index()] = entry;
    }

    #[must_use]
    pub fn pass(&self, pass: PassType) -> Option<&MaterialPass> {
        self.passes[pass.index()].as_ref()
    }

    pub fn pass_mut(&mut self, pass: PassType) -> Option<&mut MaterialPass> {
        self.passes[pass.index()].as_mut()
    }

    #[inline]
    #[must_use]
    pub fn supports_pass(&self, pass: PassType) -> bool {
        self.passes[pass.index()].is_some()
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn sort_type(&self) -> SortType {
        self.sort_type
    }

    pub fn set_sort_type(&mut self, sort_type: SortType) {
        self.sort_type = sort_type;
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> MaterialFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub fn has_flag(&self, flag: MaterialFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: MaterialFlags, value: bool) {
        self.flags.set(flag, value);
    }

    /// Writes this material's shader, resources and fixed-function state for
    /// `pass` into `state`. Returns `false` when the material does not
    /// implement the pass; `state` is left untouched in that case.
    pub fn begin_pass(&self, pass: PassType, state: &mut DrawCallState) -> bool {
        let Some(entry) = self.pass(pass) else {
            return false;
        };

        state.shader = Some(entry.shader);
        for (name, binding) in entry.resources.textures.iter() {
            state.resources.textures.set(name, *binding);
        }
        for (name, buffer) in entry.resources.uniform_buffers.iter() {
            state.resources.uniform_buffers.set(name, *buffer);
        }
        for (name, buffer) in entry.resources.storage_buffers.iter() {
            state.resources.storage_buffers.set(name, *buffer);
        }
        for (name, value) in entry.resources.uniforms.iter() {
            state.resources.uniforms.set(name, value.clone());
        }
        state.raster = entry.raster;
        state.depth_stencil = entry.depth_stencil;
        true
    }

    /// Removes the bindings [`begin_pass`](Self::begin_pass) added so the
    /// next material starts from the pass-level state.
    pub fn end_pass(&self, pass: PassType, state: &mut DrawCallState) {
        let Some(entry) = self.pass(pass) else {
            return;
        };

        for (name, _) in entry.resources.textures.iter() {
            state.resources.textures.remove(name);
        }
        for (name, _) in entry.resources.uniform_buffers.iter() {
            state.resources.uniform_buffers.remove(name);
        }
        for (name, _) in entry.resources.storage_buffers.iter() {
            state.resources.storage_buffers.remove(name);
        }
        for (name, _) in entry.resources.uniforms.iter() {
            state.resources.uniforms.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::device::{BufferHandle, TextureHandle};

    fn lit() -> Material {
        let mut ambient = MaterialPass::new(ShaderHandle(2));
        ambient.resources.bind_texture("u_Albedo", TextureHandle(9));
        Material::new("Lit", MaterialKind::Lit, SortType::Opaque)
            .with_flags(MaterialFlags::INSTANCED)
            .with_pass(PassType::Depth, MaterialPass::new(ShaderHandle(1)))
            .with_pass(PassType::Ambient, ambient)
    }

    #[test]
    fn sort_type_order_matches_bucket_order() {
        for pair in SortType::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].index() + 1, pair[1].index());
        }
    }

    #[test]
    fn begin_pass_without_entry_is_rejected() {
        let sky = Material::new("Sky", MaterialKind::Sky, SortType::Sky)
            .with_pass(PassType::Ambient, MaterialPass::new(ShaderHandle(5)));
        let mut state = DrawCallState::new();
        assert!(!sky.begin_pass(PassType::Depth, &mut state));
        assert_eq!(state.shader, None);
    }

    #[test]
    fn end_pass_keeps_pass_level_bindings() {
        let material = lit();
        let mut state = DrawCallState::new();
        state
            .resources
            .bind_uniform_buffer("BaseVSData", BufferHandle(1));

        assert!(material.begin_pass(PassType::Ambient, &mut state));
        assert_eq!(state.shader, Some(ShaderHandle(2)));
        assert!(state.resources.textures.get("u_Albedo").is_some());

        material.end_pass(PassType::Ambient, &mut state);
        assert!(state.resources.textures.get("u_Albedo").is_none());
        assert_eq!(
            state.resources.uniform_buffers.get("BaseVSData"),
            Some(&BufferHandle(1))
        );
    }
}
