//! Camera Post-Process Effects
//!
//! Cameras carry an ordered list of [`PostProcessEffect`]s that run on the
//! composited (bloomed, tone-mapped) image before it is presented. Each
//! effect reads the current image and writes a scratch target; the scratch
//! is blitted back so the next effect (and the present blit) always read the
//! same texture.
//!
//! ```text
//! image ──effect 0──► scratch ──blit──► image ──effect 1──► scratch ──blit──► image
//! ```

use log::trace;

use crate::renderer::device::{
    DrawArguments, RenderDevice, ShaderHandle, TextureHandle, apply_draw_state,
};
use crate::renderer::state::{DrawCallState, SamplerKind, UniformValue, ViewPort};
use crate::renderer::temporal_pool::{TemporalRenderTarget, TemporalRenderTargetCache};

/// A user-supplied screen-space effect.
pub trait PostProcessEffect {
    fn name(&self) -> &str;

    /// Reads `input` and writes the full `viewport` of `output`.
    fn render(
        &self,
        device: &mut dyn RenderDevice,
        input: TextureHandle,
        output: TextureHandle,
        viewport: ViewPort,
    );

    fn enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    fn can_render(&self) -> bool {
        self.enabled()
    }
}

/// Fullscreen-triangle effect driven by a single shader.
///
/// The input is bound as `_MainTex`; extra loose uniforms are forwarded
/// unchanged.
#[derive(Debug, Clone)]
pub struct FullscreenEffect {
    name: String,
    shader: ShaderHandle,
    enabled: bool,
    uniforms: Vec<(&'static str, UniformValue)>,
}

impl FullscreenEffect {
    #[must_use]
    pub fn new(name: impl Into<String>, shader: ShaderHandle) -> Self {
        Self {
            name: name.into(),
            shader,
            enabled: true,
            uniforms: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_uniform(mut self, name: &'static str, value: impl Into<UniformValue>) -> Self {
        self.uniforms.push((name, value.into()));
        self
    }
}

impl PostProcessEffect for FullscreenEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(
        &self,
        device: &mut dyn RenderDevice,
        input: TextureHandle,
        output: TextureHandle,
        viewport: ViewPort,
    ) {
        let mut state = DrawCallState::fullscreen(self.shader);
        state.targets.bind_target(0, output);
        state.targets.viewport = viewport;
        state.resources.bind_texture("_MainTex", input);
        state
            .resources
            .bind_sampler("_MainTex", SamplerKind::ClampClampLinearLinear);
        for (name, value) in &self.uniforms {
            state.resources.set_uniform(name, value.clone());
        }

        device.bind_render_targets(&state.targets);
        apply_draw_state(device, &state);
        device.draw(&[DrawArguments::vertices(3)]);
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Runs every renderable effect on `color` in list order. Returns the
/// number of effects executed.
pub fn run_effect_chain(
    device: &mut dyn RenderDevice,
    cache: &TemporalRenderTargetCache,
    effects: &[Box<dyn PostProcessEffect>],
    color: &TemporalRenderTarget,
    viewport: ViewPort,
) -> u32 {
    if !effects.iter().any(|effect| effect.can_render()) {
        return 0;
    }

    let scratch = cache.acquire(device, "PostProcessScratch", color.desc());
    let mut executed = 0;
    for effect in effects.iter().filter(|effect| effect.can_render()) {
        trace!("Post-process effect '{}'", effect.name());
        device.push_debug_group(effect.name());
        effect.render(device, color.texture(), scratch.texture(), viewport);
        device.blit(scratch.texture(), Some(color.texture()));
        device.pop_debug_group();
        executed += 1;
    }
    scratch.free();
    executed
}
