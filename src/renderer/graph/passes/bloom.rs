//! Bloom Compute Chain
//!
//! Four compute stages over three pooled RGBA16F mip chains:
//!
//! ```text
//!  input (HDR) ──Prefilter──► A[0]
//!                              │
//!            ┌─────────────────┘  for i in 1..=D
//!            ▼
//!   A[i-1] ──Downsample──► B[i] ──Downsample──► A[i]
//!                                                 │
//!   A[D] ──UpsampleFirst──► C[N-1]                │
//!                                                 ▼
//!   for i in (0..N-1).rev():  A[i] + C[i+1] ──Upsample──► C[i]
//!
//!   output: C[0]
//! ```
//!
//! `D = mip_level_count(W, H) - 4` (saturating) and `N = D + 1`. The working
//! targets are sized to the input rounded up to the 16×16 compute tile and
//! each dispatch covers `ceil(mip size / 16)` groups.
//!
//! Every dispatch has its own uniform block so the per-stage parameters
//! survive until the GPU executes the chain.

use glam::{UVec3, Vec2};
use log::debug;

use crate::renderer::HDR_TEXTURE_FORMAT;
use crate::renderer::device::{
    BufferDesc, BufferHandle, RenderDevice, ShaderHandle, TextureDesc, TextureHandle,
};
use crate::renderer::state::{DispatchState, SamplerKind};
use crate::renderer::temporal_pool::{TemporalRenderTarget, TemporalRenderTargetCache};
use crate::resources::{BloomMode, BloomSettings, BloomUniforms};

/// Compute tile edge, in pixels.
pub const BLOOM_WORKGROUP_SIZE: u32 = 16;

/// Mips dropped from the full chain so the smallest level never degenerates.
pub const BLOOM_MIP_REDUCTION: u32 = 4;

/// Full mip chain length of a `width`×`height` texture.
#[must_use]
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Number of downsample iterations for an input of the given size.
#[must_use]
pub fn downsample_iterations(width: u32, height: u32) -> u32 {
    mip_level_count(width, height).saturating_sub(BLOOM_MIP_REDUCTION)
}

#[inline]
#[must_use]
pub fn round_up_to_tile(value: u32) -> u32 {
    value.max(1).div_ceil(BLOOM_WORKGROUP_SIZE) * BLOOM_WORKGROUP_SIZE
}

#[inline]
#[must_use]
pub fn dispatch_groups(width: u32, height: u32) -> UVec3 {
    UVec3::new(
        width.div_ceil(BLOOM_WORKGROUP_SIZE),
        height.div_ceil(BLOOM_WORKGROUP_SIZE),
        1,
    )
}

/// Layout of one bloom run, derived from the input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomChain {
    /// Downsample iterations.
    pub iterations: u32,
    /// Mip levels of each working target (`iterations + 1`).
    pub mip_count: u32,
    pub width: u32,
    pub height: u32,
}

impl BloomChain {
    #[must_use]
    pub fn new(input_width: u32, input_height: u32) -> Self {
        let iterations = downsample_iterations(input_width, input_height);
        Self {
            iterations,
            mip_count: iterations + 1,
            width: round_up_to_tile(input_width),
            height: round_up_to_tile(input_height),
        }
    }

    /// Working target descriptor (storage-capable, full chain).
    #[must_use]
    pub fn target_desc(&self) -> TextureDesc {
        TextureDesc::render_target(self.width, self.height, HDR_TEXTURE_FORMAT)
            .with_mips(self.mip_count)
            .with_storage()
    }

    /// Dispatches issued by one run.
    #[must_use]
    pub fn dispatch_count(&self) -> u32 {
        // prefilter + 2 per downsample + upsample-first + remaining upsamples
        1 + 2 * self.iterations + 1 + (self.mip_count - 1)
    }
}

/// One dispatch of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomStage {
    pub mode: BloomMode,
    pub source: TextureHandle,
    pub source_lod: u32,
    /// Coarser bloom level blended in by [`BloomMode::Upsample`].
    pub bloom: Option<TextureHandle>,
    pub output: TextureHandle,
    pub output_mip: u32,
}

impl BloomChain {
    /// Dispatch sequence over the working targets `a`, `b` and `c`.
    #[must_use]
    pub fn stages(
        &self,
        input: TextureHandle,
        a: TextureHandle,
        b: TextureHandle,
        c: TextureHandle,
    ) -> Vec<BloomStage> {
        let stage = |mode, source, source_lod, bloom, output, output_mip| BloomStage {
            mode,
            source,
            source_lod,
            bloom,
            output,
            output_mip,
        };

        let mut stages = Vec::with_capacity(self.dispatch_count() as usize);
        stages.push(stage(BloomMode::Prefilter, input, 0, None, a, 0));

        for mip in 1..=self.iterations {
            stages.push(stage(BloomMode::Downsample, a, mip - 1, None, b, mip));
            stages.push(stage(BloomMode::Downsample, b, mip, None, a, mip));
        }

        let top = self.mip_count - 1;
        stages.push(stage(BloomMode::UpsampleFirst, a, top, None, c, top));
        for mip in (0..top).rev() {
            stages.push(stage(BloomMode::Upsample, a, mip, Some(c), c, mip));
        }
        stages
    }
}

pub struct BloomPass {
    shader: ShaderHandle,
    uniform_buffers: Vec<BufferHandle>,
}

impl BloomPass {
    #[must_use]
    pub fn new(shader: ShaderHandle) -> Self {
        Self {
            shader,
            uniform_buffers: Vec::new(),
        }
    }

    fn uniform_buffer(&mut self, device: &mut dyn RenderDevice, index: usize) -> BufferHandle {
        while self.uniform_buffers.len() <= index {
            let size = std::mem::size_of::<BloomUniforms>() as u64;
            let buffer = device.create_buffer("BloomParams", &BufferDesc::uniform(size));
            self.uniform_buffers.push(buffer);
        }
        self.uniform_buffers[index]
    }

    /// Runs the chain on `input` and returns the target holding the bloom
    /// contribution in mip 0. The intermediate targets are released before
    /// returning.
    pub fn render(
        &mut self,
        device: &mut dyn RenderDevice,
        cache: &TemporalRenderTargetCache,
        settings: &BloomSettings,
        input: TextureHandle,
        input_width: u32,
        input_height: u32,
    ) -> TemporalRenderTarget {
        let chain = BloomChain::new(input_width, input_height);
        let desc = chain.target_desc();
        debug!(
            "Bloom chain {}x{} ({} mips, {} downsamples)",
            chain.width, chain.height, chain.mip_count, chain.iterations
        );

        let a = cache.acquire(device, "BloomA", &desc);
        let b = cache.acquire(device, "BloomB", &desc);
        let c = cache.acquire(device, "BloomC", &desc);

        device.push_debug_group("Bloom");
        let input_size = (input_width.max(1), input_height.max(1));
        for (index, stage) in chain
            .stages(input, a.texture(), b.texture(), c.texture())
            .iter()
            .enumerate()
        {
            let source_size = if stage.source == input {
                input_size
            } else {
                desc.mip_size(stage.source_lod)
            };
            let uniforms = BloomUniforms {
                params: settings.prefilter_params(),
                lod_and_mode: Vec2::new(stage.source_lod as f32, stage.mode as u32 as f32),
                half_texel: Vec2::new(0.5 / source_size.0 as f32, 0.5 / source_size.1 as f32),
            };
            let buffer = self.uniform_buffer(device, index);
            device.write_buffer(buffer, 0, bytemuck::bytes_of(&uniforms));

            let mut state = DispatchState::new(self.shader);
            state.resources.bind_uniform_buffer("BloomParams", buffer);
            state.resources.bind_texture("u_Texture", stage.source);
            state
                .resources
                .bind_sampler("u_Texture", SamplerKind::ClampClampLinearLinear);
            match stage.bloom {
                Some(bloom) => {
                    state.resources.bind_texture("u_BloomTexture", bloom);
                    state
                        .resources
                        .bind_sampler("u_BloomTexture", SamplerKind::ClampClampLinearLinear);
                    state
                        .resources
                        .set_uniform("u_UpsampleScale", settings.upsample_scale());
                }
                None => state.resources.bind_null_texture("u_BloomTexture"),
            }
            state
                .resources
                .bind_storage_texture("o_Image", stage.output, stage.output_mip);

            let (width, height) = desc.mip_size(stage.output_mip);
            device.dispatch(&state, dispatch_groups(width, height));
        }
        device.pop_debug_group();

        a.free();
        b.free();
        c
    }
}
