use glam::{Mat4, Vec3};

use crate::assets::{MaterialKey, MeshKey};
use crate::renderer::device::BufferHandle;

/// Draws a mesh with one material per section slot.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderer {
    pub mesh: Option<MeshKey>,
    /// Indexed by [`MeshSection::material_index`](crate::resources::MeshSection::material_index).
    /// A `None` slot hides the section.
    pub materials: Vec<Option<MaterialKey>>,
    pub transform: Mat4,
    pub active: bool,
}

impl MeshRenderer {
    #[must_use]
    pub fn new(mesh: MeshKey, material: MaterialKey, transform: Mat4) -> Self {
        Self {
            mesh: Some(mesh),
            materials: vec![Some(material)],
            transform,
            active: true,
        }
    }

    #[must_use]
    pub fn material(&self, slot: usize) -> Option<MaterialKey> {
        self.materials.get(slot).copied().flatten()
    }
}

/// GPU particle system. Positions live in a storage buffer updated by a
/// compute pass and drawn as points.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystem {
    pub position_buffer: BufferHandle,
    pub particle_count: u32,
    pub active: bool,
}

impl ParticleSystem {
    #[must_use]
    pub fn new(position_buffer: BufferHandle, particle_count: u32) -> Self {
        Self {
            position_buffer,
            particle_count,
            active: true,
        }
    }
}

/// Box projector. The unit cube of `transform` is the decal volume, the
/// local +Z axis the projection direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Decal {
    pub transform: Mat4,
    pub active: bool,
}

impl Decal {
    #[must_use]
    pub fn new(transform: Mat4) -> Self {
        Self {
            transform,
            active: true,
        }
    }

    /// Inverse projector matrix: the decal volume is pushed back half a
    /// unit along its axis and its footprint halved.
    #[must_use]
    pub fn projector_matrix(&self) -> Mat4 {
        let mut m = self.transform;
        let axis = m.z_axis.truncate().normalize_or_zero();
        let origin = m.w_axis.truncate() - axis * 0.5;
        m.w_axis = origin.extend(m.w_axis.w);
        m.x_axis *= 0.5;
        m.y_axis *= 0.5;
        m.inverse()
    }
}

/// Directional light. Only the first active shadow caster renders shadows.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (world space).
    pub direction: Vec3,
    pub cast_shadows: bool,
    pub active: bool,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction,
            cast_shadows: false,
            active: true,
        }
    }

    #[must_use]
    pub fn with_shadows(mut self) -> Self {
        self.cast_shadows = true;
        self
    }

    #[must_use]
    pub fn normalized_direction(&self) -> Vec3 {
        self.direction.try_normalize().unwrap_or(Vec3::NEG_Y)
    }
}
