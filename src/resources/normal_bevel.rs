//! Screen-Space Normal Bevel Configuration
//!
//! Softens hard geometric edges by blending normals across depth
//! discontinuities in screen space. The pass reads the normal and depth
//! buffers and its output replaces the raw normals for lighting.

use bytemuck::{Pod, Zeroable};

/// GPU uniform block of the normal bevel pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct NormalBevelUniforms {
    pub edge_offset: f32,
    pub edge_distance: f32,
    pub bevel_radius: f32,
    pub bevel_distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalBevelSettings {
    pub enabled: bool,
    /// Pixel offset of the edge detection taps.
    edge_offset: f32,
    /// Depth difference (view units) treated as an edge.
    edge_distance: f32,
    /// Blend radius in pixels.
    bevel_radius: f32,
    /// View distance beyond which the bevel fades out.
    bevel_distance: f32,
}

impl Default for NormalBevelSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            edge_offset: 1.0,
            edge_distance: 0.05,
            bevel_radius: 4.0,
            bevel_distance: 50.0,
        }
    }
}

impl NormalBevelSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_edge_offset(&mut self, value: f32) {
        self.edge_offset = value.max(0.0);
    }

    pub fn set_edge_distance(&mut self, value: f32) {
        self.edge_distance = value.max(0.0);
    }

    pub fn set_bevel_radius(&mut self, value: f32) {
        self.bevel_radius = value.max(0.0);
    }

    pub fn set_bevel_distance(&mut self, value: f32) {
        self.bevel_distance = value.max(0.0);
    }

    #[must_use]
    pub fn uniforms(&self) -> NormalBevelUniforms {
        NormalBevelUniforms {
            edge_offset: self.edge_offset,
            edge_distance: self.edge_distance,
            bevel_radius: self.bevel_radius,
            bevel_distance: self.bevel_distance,
        }
    }
}
