//! Immediate-Mode Debug Shapes
//!
//! Game and editor code queue lines, boxes, spheres and arrows at any time
//! during a frame. The debug-shape pass tessellates them into one vertex
//! upload and draws up to four batches:
//!
//! ```text
//! vertex buffer: [ depth lines | depth triangles | overlay lines | overlay triangles ]
//! ```
//!
//! A shape stays queued for `lifetime` frames; [`DebugShapes::reset`] runs
//! at frame end and drops expired shapes.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::renderer::device::{
    BufferDesc, BufferHandle, DrawArguments, InputLayoutHandle, RenderDevice, ShaderHandle,
    ShaderInputs, apply_draw_state,
};
use crate::renderer::state::{DepthStencilState, DrawCallState};

const SPHERE_SEGMENTS: usize = 24;

/// Corner indices (bit 0: +x, bit 1: +y, bit 2: +z) of each box face.
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 2, 3, 1],
    [4, 5, 7, 6],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 4, 6, 2],
    [1, 3, 7, 5],
];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
    pub thickness: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugShapeKind {
    Line { from: Vec3, to: Vec3 },
    Box { center: Vec3, half_extents: Vec3, wireframe: bool },
    Sphere { center: Vec3, radius: f32 },
    Arrow { from: Vec3, to: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugShape {
    pub kind: DebugShapeKind,
    pub color: Vec4,
    pub thickness: f32,
    /// Frames left before the shape expires.
    pub lifetime: u32,
    /// Depth tested against the scene; off draws on top.
    pub use_depth: bool,
}

impl DebugShape {
    #[must_use]
    pub fn new(kind: DebugShapeKind) -> Self {
        Self {
            kind,
            color: Vec4::ONE,
            thickness: 1.0,
            lifetime: 1,
            use_depth: true,
        }
    }

    #[must_use]
    pub fn line(from: Vec3, to: Vec3) -> Self {
        Self::new(DebugShapeKind::Line { from, to })
    }

    #[must_use]
    pub fn wire_box(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(DebugShapeKind::Box {
            center,
            half_extents,
            wireframe: true,
        })
    }

    #[must_use]
    pub fn solid_box(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(DebugShapeKind::Box {
            center,
            half_extents,
            wireframe: false,
        })
    }

    #[must_use]
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::new(DebugShapeKind::Sphere { center, radius })
    }

    #[must_use]
    pub fn arrow(from: Vec3, to: Vec3) -> Self {
        Self::new(DebugShapeKind::Arrow { from, to })
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    #[must_use]
    pub fn with_lifetime(mut self, frames: u32) -> Self {
        self.lifetime = frames.max(1);
        self
    }

    #[must_use]
    pub fn without_depth(mut self) -> Self {
        self.use_depth = false;
        self
    }

    fn vertex(&self, position: Vec3) -> DebugVertex {
        DebugVertex {
            position: position.to_array(),
            thickness: self.thickness,
            color: self.color.to_array(),
        }
    }

    fn push_line(&self, lines: &mut Vec<DebugVertex>, a: Vec3, b: Vec3) {
        lines.push(self.vertex(a));
        lines.push(self.vertex(b));
    }

    /// Appends line-list and triangle-list vertices.
    pub fn tessellate(&self, lines: &mut Vec<DebugVertex>, triangles: &mut Vec<DebugVertex>) {
        match self.kind {
            DebugShapeKind::Line { from, to } => self.push_line(lines, from, to),
            DebugShapeKind::Box {
                center,
                half_extents,
                wireframe,
            } => {
                let corner = |i: usize| {
                    let sign = Vec3::new(
                        if i & 1 == 0 { -1.0 } else { 1.0 },
                        if i & 2 == 0 { -1.0 } else { 1.0 },
                        if i & 4 == 0 { -1.0 } else { 1.0 },
                    );
                    center + half_extents * sign
                };
                if wireframe {
                    for i in 0..8 {
                        for bit in [1, 2, 4] {
                            if i & bit == 0 {
                                self.push_line(lines, corner(i), corner(i | bit));
                            }
                        }
                    }
                } else {
                    for [a, b, c, d] in BOX_FACES {
                        for index in [a, b, c, a, c, d] {
                            triangles.push(self.vertex(corner(index)));
                        }
                    }
                }
            }
            DebugShapeKind::Sphere { center, radius } => {
                let axes = [(Vec3::X, Vec3::Y), (Vec3::Y, Vec3::Z), (Vec3::Z, Vec3::X)];
                for (u, v) in axes {
                    let point = |step: usize| {
                        let angle = step as f32 / SPHERE_SEGMENTS as f32 * std::f32::consts::TAU;
                        center + (u * angle.cos() + v * angle.sin()) * radius
                    };
                    for step in 0..SPHERE_SEGMENTS {
                        self.push_line(lines, point(step), point(step + 1));
                    }
                }
            }
            DebugShapeKind::Arrow { from, to } => {
                self.push_line(lines, from, to);
                let shaft = to - from;
                let length = shaft.length();
                if length <= f32::EPSILON {
                    return;
                }
                let direction = shaft / length;
                let side = direction.any_orthonormal_vector();
                let up = direction.cross(side);
                let head = length * 0.2;
                let base = to - direction * head;
                for offset in [side, -side, up, -up] {
                    self.push_line(lines, to, base + offset * head * 0.5);
                }
            }
        }
    }
}

/// Queue of shapes drawn by the debug-shape pass.
#[derive(Debug, Clone, Default)]
pub struct DebugShapes {
    shapes: Vec<DebugShape>,
}

impl DebugShapes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, shape: DebugShape) {
        self.shapes.push(shape);
    }

    #[must_use]
    pub fn shapes(&self) -> &[DebugShape] {
        &self.shapes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Ages every shape by one frame and drops the expired ones.
    pub fn reset(&mut self) {
        self.shapes.retain_mut(|shape| {
            shape.lifetime = shape.lifetime.saturating_sub(1);
            shape.lifetime > 0
        });
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

/// Vertex ranges of one tessellated frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugGeometry {
    pub vertices: Vec<DebugVertex>,
    /// `(topology, depth tested, first vertex, vertex count)` per batch.
    pub batches: Vec<(wgpu::PrimitiveTopology, bool, u32, u32)>,
}

impl DebugGeometry {
    #[must_use]
    pub fn build(shapes: &DebugShapes) -> Self {
        let mut geometry = Self::default();
        for use_depth in [true, false] {
            let mut lines = Vec::new();
            let mut triangles = Vec::new();
            for shape in shapes.shapes().iter().filter(|s| s.use_depth == use_depth) {
                shape.tessellate(&mut lines, &mut triangles);
            }
            for (topology, vertices) in [
                (wgpu::PrimitiveTopology::LineList, lines),
                (wgpu::PrimitiveTopology::TriangleList, triangles),
            ] {
                if vertices.is_empty() {
                    continue;
                }
                let first = geometry.vertices.len() as u32;
                geometry
                    .batches
                    .push((topology, use_depth, first, vertices.len() as u32));
                geometry.vertices.extend(vertices);
            }
        }
        geometry
    }
}

pub struct DebugShapeRenderer {
    shader: ShaderHandle,
    input_layout: InputLayoutHandle,
    buffer: Option<(BufferHandle, u64)>,
}

impl DebugShapeRenderer {
    #[must_use]
    pub fn new(shader: ShaderHandle, input_layout: InputLayoutHandle) -> Self {
        Self {
            shader,
            input_layout,
            buffer: None,
        }
    }

    fn vertex_buffer(&mut self, device: &mut dyn RenderDevice, size: u64) -> BufferHandle {
        match self.buffer {
            Some((buffer, capacity)) if capacity >= size => buffer,
            _ => {
                let capacity = size.next_power_of_two();
                let buffer = device.create_buffer("DebugShapes", &BufferDesc::vertex(capacity));
                self.buffer = Some((buffer, capacity));
                buffer
            }
        }
    }

    /// Draws every queued shape with the targets and camera bindings of
    /// `base`. Returns the number of draw calls.
    pub fn render(
        &mut self,
        device: &mut dyn RenderDevice,
        shapes: &DebugShapes,
        base: &DrawCallState,
    ) -> u32 {
        let geometry = DebugGeometry::build(shapes);
        if geometry.batches.is_empty() {
            return 0;
        }

        let bytes: &[u8] = bytemuck::cast_slice(&geometry.vertices);
        let buffer = self.vertex_buffer(device, bytes.len() as u64);
        device.write_buffer(buffer, 0, bytes);

        let mut state = base.clone();
        state.shader = Some(self.shader);
        for &(topology, use_depth, first, count) in &geometry.batches {
            state.depth_stencil = if use_depth {
                DepthStencilState {
                    depth_enable: true,
                    depth_write: false,
                    compare: wgpu::CompareFunction::LessEqual,
                }
            } else {
                DepthStencilState::DISABLED
            };
            state.raster.cull_mode = Some(wgpu::Face::Back);
            apply_draw_state(device, &state);
            device.bind_shader_inputs(&ShaderInputs {
                topology,
                layout: self.input_layout,
                index_buffer: None,
                vertex_buffers: smallvec::smallvec![buffer],
            });
            device.draw(&[DrawArguments {
                count,
                first,
                instance_count: 1,
                ..DrawArguments::default()
            }]);
        }
        geometry.batches.len() as u32
    }
}
