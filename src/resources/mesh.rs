//! Mesh Resource
//!
//! A [`Mesh`] is GPU-resident geometry already uploaded by the resource
//! manager: shared vertex buffers, one or more index buffers, and a list of
//! [`MeshSection`]s. Each section maps to one material slot of the renderer
//! component and owns one or more [`DrawRange`]s into its index buffer.

use smallvec::SmallVec;

use crate::renderer::device::{BufferHandle, DrawArguments, InputLayoutHandle, ShaderInputs};
use crate::resources::geometry::BoundingBox;

/// One contiguous index range of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub index_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub enabled: bool,
}

impl DrawRange {
    #[must_use]
    pub const fn new(first_index: u32, index_count: u32) -> Self {
        Self {
            index_count,
            first_index,
            base_vertex: 0,
            enabled: true,
        }
    }

    /// Ranges that produce no GPU work are skipped silently.
    #[inline]
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.enabled && self.index_count > 0
    }

    #[must_use]
    pub fn to_arguments(&self, instance_count: u32) -> DrawArguments {
        DrawArguments {
            count: self.index_count,
            first: self.first_index,
            base_vertex: self.base_vertex,
            instance_count,
            first_instance: 0,
        }
    }
}

/// A material-addressable part of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSection {
    /// Slot in the renderer component's material list.
    pub material_index: usize,
    /// Index into [`Mesh::index_buffers`].
    pub buffer_index: usize,
    pub topology: wgpu::PrimitiveTopology,
    pub ranges: SmallVec<[DrawRange; 1]>,
}

impl MeshSection {
    #[must_use]
    pub fn new(material_index: usize, range: DrawRange) -> Self {
        Self {
            material_index,
            buffer_index: 0,
            topology: wgpu::PrimitiveTopology::TriangleList,
            ranges: smallvec::smallvec![range],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBuffer {
    pub buffer: BufferHandle,
    pub format: wgpu::IndexFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub input_layout: InputLayoutHandle,
    pub vertex_buffers: SmallVec<[BufferHandle; 4]>,
    pub index_buffers: SmallVec<[IndexBuffer; 1]>,
    pub sections: Vec<MeshSection>,
    /// Local-space bounds. `None` means the mesh is never frustum culled
    /// unless the renderer's unbounded-mesh policy says otherwise.
    pub bounds: Option<BoundingBox>,
    /// Bounds are already in world space (baked static geometry).
    pub bounds_pre_transformed: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(name: impl Into<String>, input_layout: InputLayoutHandle) -> Self {
        Self {
            name: name.into(),
            input_layout,
            vertex_buffers: SmallVec::new(),
            index_buffers: SmallVec::new(),
            sections: Vec::new(),
            bounds: None,
            bounds_pre_transformed: false,
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub fn with_section(mut self, section: MeshSection) -> Self {
        self.sections.push(section);
        self
    }

    #[must_use]
    pub fn section(&self, index: u32) -> Option<&MeshSection> {
        self.sections.get(index as usize)
    }

    /// Input binding for drawing `section`.
    #[must_use]
    pub fn shader_inputs(&self, section: &MeshSection) -> ShaderInputs {
        ShaderInputs {
            topology: section.topology,
            layout: self.input_layout,
            index_buffer: self
                .index_buffers
                .get(section.buffer_index)
                .map(|ib| (ib.buffer, ib.format)),
            vertex_buffers: self.vertex_buffers.clone(),
        }
    }
}
