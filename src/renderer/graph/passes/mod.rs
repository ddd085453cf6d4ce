//! Scene Renderer Passes
//!
//! Self-contained pass implementations driven by the scene renderer:
//!
//! - [`ShadowPass`]: cascaded depth maps of the first shadow caster
//! - [`DecalBinder`]: decal projector blocks for the ambient pass
//! - [`ParticlePass`]: compute update + point-list draw
//! - [`NormalBevelPass`]: screen-space normal smoothing
//! - [`BloomPass`]: prefilter / downsample / upsample compute chain
//! - [`FinalCompositePass`]: bloom + LUT + tone map into the viewport
//! - [`post_effects`]: camera-owned effect list

pub mod bloom;
pub mod decals;
pub mod normal_bevel;
pub mod particles;
pub mod post_effects;
pub mod shadow;
pub mod tone_mapping;

pub use bloom::{BloomChain, BloomPass, BloomStage};
pub use decals::DecalBinder;
pub use normal_bevel::NormalBevelPass;
pub use particles::ParticlePass;
pub use post_effects::{FullscreenEffect, PostProcessEffect, run_effect_chain};
pub use shadow::{ShadowFrame, ShadowPass};
pub use tone_mapping::{CompositeInputs, FinalCompositePass};
