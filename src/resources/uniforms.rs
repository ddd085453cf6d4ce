//! GPU Uniform Blocks
//!
//! `#[repr(C)]` + `Pod` structs uploaded with
//! [`RenderDevice::write_buffer`](crate::renderer::device::RenderDevice::write_buffer).
//! Field order and padding match the std140 blocks of the same names.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Maximum decals bound to the ambient pass.
pub const MAX_DECALS: usize = 32;

/// Maximum shadow cascades of the directional light.
pub const MAX_CASCADES: usize = 4;

/// `BaseVSData`: camera matrices, written once per camera (and per cascade).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BaseVsData {
    pub projection: Mat4,
    pub view: Mat4,
    pub projection_view: Mat4,
}

impl BaseVsData {
    #[must_use]
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self {
            projection,
            view,
            projection_view: projection * view,
        }
    }
}

/// `GLOB_Data`: camera position and forward vector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalData {
    pub camera_position: Vec4,
    pub camera_direction: Vec4,
}

impl GlobalData {
    #[must_use]
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            camera_position: position.extend(1.0),
            camera_direction: direction.extend(0.0),
        }
    }
}

/// `GLOB_DecalMatricesVS`: inverse decal projectors.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DecalMatricesVs {
    pub matrices: [Mat4; MAX_DECALS],
    pub count: u32,
    pub _pad: [u32; 3],
}

/// `GLOB_DecalMatricesPS`: decal count seen by the fragment stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DecalMatricesPs {
    pub count: u32,
    pub _pad: [u32; 3],
}

/// Shadow cascade matrices and split distances.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowMatrices {
    pub matrices: [Mat4; MAX_CASCADES],
    pub splits: Vec4,
}
