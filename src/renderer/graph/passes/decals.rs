//! Decal Projection Data
//!
//! Packs the inverse projector matrices of up to [`MAX_DECALS`] active
//! decals into the `GLOB_DecalMatricesVS` / `GLOB_DecalMatricesPS` uniform
//! blocks and binds them, with the decal atlas, for the ambient pass.

use glam::Mat4;
use log::warn;

use crate::renderer::device::{BufferDesc, BufferHandle, RenderDevice, TextureHandle};
use crate::renderer::state::{SamplerKind, ShaderResources};
use crate::resources::uniforms::{DecalMatricesPs, DecalMatricesVs, MAX_DECALS};
use crate::scene::{Decal, Scene};

#[derive(Default)]
pub struct DecalBinder {
    vs_buffer: Option<BufferHandle>,
    ps_buffer: Option<BufferHandle>,
    atlas: Option<TextureHandle>,
}

impl DecalBinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_atlas(&mut self, atlas: Option<TextureHandle>) {
        self.atlas = atlas;
    }

    #[must_use]
    pub fn atlas(&self) -> Option<TextureHandle> {
        self.atlas
    }

    /// Projector matrices of the active decals, capped at [`MAX_DECALS`].
    #[must_use]
    pub fn pack(scene: &Scene) -> DecalMatricesVs {
        let mut block = DecalMatricesVs {
            matrices: [Mat4::IDENTITY; MAX_DECALS],
            count: 0,
            _pad: [0; 3],
        };

        let active = scene.components::<Decal>().filter(|(_, decal)| decal.active);
        for (_, decal) in active {
            if block.count as usize == MAX_DECALS {
                warn!("More than {MAX_DECALS} active decals; the rest are ignored");
                break;
            }
            block.matrices[block.count as usize] = decal.projector_matrix();
            block.count += 1;
        }
        block
    }

    /// Uploads the decal blocks and binds them into `resources`. Returns the
    /// number of decals bound.
    pub fn bind(
        &mut self,
        device: &mut dyn RenderDevice,
        scene: &Scene,
        resources: &mut ShaderResources,
    ) -> u32 {
        let vs = Self::pack(scene);
        let ps = DecalMatricesPs {
            count: vs.count,
            _pad: [0; 3],
        };

        let vs_buffer = *self.vs_buffer.get_or_insert_with(|| {
            let size = std::mem::size_of::<DecalMatricesVs>() as u64;
            device.create_buffer("GLOB_DecalMatricesVS", &BufferDesc::uniform(size))
        });
        let ps_buffer = *self.ps_buffer.get_or_insert_with(|| {
            let size = std::mem::size_of::<DecalMatricesPs>() as u64;
            device.create_buffer("GLOB_DecalMatricesPS", &BufferDesc::uniform(size))
        });
        device.write_buffer(vs_buffer, 0, bytemuck::bytes_of(&vs));
        device.write_buffer(ps_buffer, 0, bytemuck::bytes_of(&ps));

        resources.bind_uniform_buffer("GLOB_DecalMatricesVS", vs_buffer);
        resources.bind_uniform_buffer("GLOB_DecalMatricesPS", ps_buffer);
        match self.atlas {
            Some(atlas) => resources.bind_texture("g_DecalTexture", atlas),
            None => resources.bind_null_texture("g_DecalTexture"),
        }
        resources.bind_sampler("g_DecalTexture", SamplerKind::ClampClampLinearLinear);

        vs.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_decals_are_not_packed() {
        let mut scene = Scene::new();
        scene.add(Decal::new(Mat4::IDENTITY));
        let mut hidden = Decal::new(Mat4::IDENTITY);
        hidden.active = false;
        scene.add(hidden);

        assert_eq!(DecalBinder::pack(&scene).count, 1);
    }

    #[test]
    fn decal_count_is_capped() {
        let mut scene = Scene::new();
        for _ in 0..MAX_DECALS + 3 {
            scene.add(Decal::new(Mat4::IDENTITY));
        }
        assert_eq!(DecalBinder::pack(&scene).count as usize, MAX_DECALS);
    }
}
