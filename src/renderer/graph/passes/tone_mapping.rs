//! Final Composite Pass
//!
//! One fullscreen triangle that combines the HDR scene color with the bloom
//! contribution, applies the LUT and/or basic tone mapping operator and
//! writes the result into the viewport target.
//!
//! | Binding            | Content                                         |
//! |--------------------|-------------------------------------------------|
//! | `_FinalColor`      | HDR scene color                                 |
//! | `_FinalBloom`      | bloom mip 0, or an explicit null binding        |
//! | `_BloomDirt`       | lens dirt texture, or null                      |
//! | `_LutTarget`       | color grading LUT, or null                      |

use glam::Vec2;

use crate::renderer::device::{
    DrawArguments, RenderDevice, ShaderHandle, TextureHandle, apply_draw_state,
};
use crate::renderer::state::{DrawCallState, SamplerKind, ViewPort};
use crate::resources::{BloomSettings, ToneMappingSettings};

/// Inputs of one composite.
#[derive(Debug, Clone, Copy)]
pub struct CompositeInputs<'a> {
    pub color: TextureHandle,
    pub bloom: Option<TextureHandle>,
    pub bloom_settings: &'a BloomSettings,
    pub tone_mapping: &'a ToneMappingSettings,
}

pub struct FinalCompositePass {
    shader: ShaderHandle,
}

impl FinalCompositePass {
    #[must_use]
    pub fn new(shader: ShaderHandle) -> Self {
        Self { shader }
    }

    /// Draw state of the composite, exposed for inspection.
    #[must_use]
    pub fn build_state(
        &self,
        inputs: &CompositeInputs<'_>,
        target: TextureHandle,
        viewport: ViewPort,
    ) -> DrawCallState {
        let mut state = DrawCallState::fullscreen(self.shader);
        state.targets.bind_target(0, target);
        state.targets.viewport = viewport;

        let resources = &mut state.resources;
        resources.bind_texture("_FinalColor", inputs.color);
        resources.bind_sampler("_FinalColor", SamplerKind::ClampClampLinearLinear);

        match inputs.bloom {
            Some(bloom) => {
                resources.bind_texture("_FinalBloom", bloom);
                resources.bind_sampler("_FinalBloom", SamplerKind::ClampClampLinearLinear);
                resources.set_uniform("u_BloomIntensity", inputs.bloom_settings.intensity());
            }
            None => {
                resources.bind_null_texture("_FinalBloom");
                resources.set_uniform("u_BloomIntensity", 0.0f32);
            }
        }

        match (inputs.bloom, inputs.bloom_settings.dirt_texture) {
            (Some(_), Some(dirt)) => {
                resources.bind_texture("_BloomDirt", dirt);
                resources.bind_sampler("_BloomDirt", SamplerKind::ClampClampLinearLinear);
                resources.set_uniform(
                    "u_BloomDirtIntensity",
                    inputs.bloom_settings.dirt_intensity(),
                );
            }
            _ => {
                resources.bind_null_texture("_BloomDirt");
                resources.set_uniform("u_BloomDirtIntensity", 0.0f32);
            }
        }

        let tone = inputs.tone_mapping;
        match tone.active_lut() {
            Some(lut) => {
                resources.set_uniform("u_LutToneMapEnabled", true);
                resources.set_uniform("u_LutToneMapData", lut.params());
                resources.bind_texture("_LutTarget", lut.texture());
                resources.bind_sampler("_LutTarget", SamplerKind::ClampClampLinearLinear);
            }
            None => {
                resources.set_uniform("u_LutToneMapEnabled", false);
                resources.set_uniform("u_LutToneMapData", Vec2::ZERO);
                resources.bind_null_texture("_LutTarget");
            }
        }
        resources.set_uniform("u_BasicToneMapEnabled", tone.basic_enabled());
        resources.set_uniform("u_BasicToneMapMode", tone.mode.shader_index());

        state
    }

    pub fn render(
        &self,
        device: &mut dyn RenderDevice,
        inputs: &CompositeInputs<'_>,
        target: TextureHandle,
        viewport: ViewPort,
    ) {
        let state = self.build_state(inputs, target, viewport);
        device.push_debug_group("FinalComposite");
        device.bind_render_targets(&state.targets);
        apply_draw_state(device, &state);
        device.draw(&[DrawArguments::vertices(3)]);
        device.pop_debug_group();
    }
}
