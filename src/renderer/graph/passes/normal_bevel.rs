//! Screen-Space Normal Bevel
//!
//! Reads the pre-pass normals and depth, blends normals across depth
//! discontinuities and writes the softened normals into a pooled target.
//! The ambient pass samples that target as `g_NormalTexture` instead of the
//! raw normals.

use log::trace;

use crate::renderer::HDR_TEXTURE_FORMAT;
use crate::renderer::device::{
    BufferDesc, BufferHandle, DrawArguments, RenderDevice, ShaderHandle, TextureDesc,
    TextureHandle, apply_draw_state,
};
use crate::renderer::state::{DrawCallState, SamplerKind, ViewPort};
use crate::renderer::temporal_pool::{TemporalRenderTarget, TemporalRenderTargetCache};
use crate::resources::{NormalBevelSettings, NormalBevelUniforms};

pub struct NormalBevelPass {
    shader: ShaderHandle,
    uniforms: Option<BufferHandle>,
}

impl NormalBevelPass {
    #[must_use]
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            shader,
            uniforms: None,
        }
    }

    fn uniform_buffer(&mut self, device: &mut dyn RenderDevice) -> BufferHandle {
        *self.uniforms.get_or_insert_with(|| {
            let size = std::mem::size_of::<NormalBevelUniforms>() as u64;
            device.create_buffer("NormalBevelParams", &BufferDesc::uniform(size))
        })
    }

    /// Returns the beveled normals, sized like `viewport`.
    pub fn render(
        &mut self,
        device: &mut dyn RenderDevice,
        cache: &TemporalRenderTargetCache,
        settings: &NormalBevelSettings,
        normals: TextureHandle,
        depth: TextureHandle,
        viewport: ViewPort,
    ) -> TemporalRenderTarget {
        let buffer = self.uniform_buffer(device);
        device.write_buffer(buffer, 0, bytemuck::bytes_of(&settings.uniforms()));

        let desc = TextureDesc::render_target(viewport.width, viewport.height, HDR_TEXTURE_FORMAT);
        let output = cache.acquire(device, "BeveledNormals", &desc);
        trace!("Normal bevel {}x{}", viewport.width, viewport.height);

        let mut state = DrawCallState::fullscreen(self.shader);
        state.targets.bind_target(0, output.texture());
        state.targets.viewport = viewport;
        state.resources.bind_uniform_buffer("NormalBevelParams", buffer);
        state.resources.bind_texture("g_NormalTexture", normals);
        state
            .resources
            .bind_sampler("g_NormalTexture", SamplerKind::ClampClampNearestNearest);
        state.resources.bind_texture("g_DepthTexture", depth);
        state
            .resources
            .bind_sampler("g_DepthTexture", SamplerKind::ClampClampNearestNearest);

        device.push_debug_group("NormalBevel");
        device.bind_render_targets(&state.targets);
        apply_draw_state(device, &state);
        device.draw(&[DrawArguments::vertices(3)]);
        device.pop_debug_group();

        output
    }
}
