//! Bloom Post-Processing Configuration
//!
//! This module defines bloom settings as pure data, following the same
//! pattern as [`ToneMappingSettings`](super::tone_mapping::ToneMappingSettings).
//!
//! The bloom pass is a four-stage compute chain (prefilter, downsample,
//! upsample-first, upsample). The soft threshold curve used by the prefilter
//! is packed by [`BloomSettings::prefilter_params`] as
//! `(threshold, threshold - knee, 2 * knee, 0.25 / knee)`.
//!
//! # GPU Uniform Structs
//!
//! - [`BloomUniforms`]: one block per dispatch (curve, lod, mode, half texel).

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

use crate::renderer::device::TextureHandle;

// ============================================================================
// GPU Uniform Structs
// ============================================================================

/// Stage selector written into [`BloomUniforms::lod_and_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BloomMode {
    Prefilter = 0,
    Downsample = 1,
    UpsampleFirst = 2,
    Upsample = 3,
}

impl BloomMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prefilter => "Prefilter",
            Self::Downsample => "Downsample",
            Self::UpsampleFirst => "UpsampleFirst",
            Self::Upsample => "Upsample",
        }
    }
}

/// GPU uniform block of one bloom dispatch.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BloomUniforms {
    /// Soft threshold curve.
    pub params: Vec4,
    /// `x`: source lod, `y`: [`BloomMode`] as float.
    pub lod_and_mode: Vec2,
    /// Half texel of the source mip.
    pub half_texel: Vec2,
}

// ============================================================================
// BloomSettings
// ============================================================================

/// Bloom post-processing configuration.
///
/// ```rust,ignore
/// let bloom = renderer.bloom_settings_mut();
/// bloom.set_enabled(true);
/// bloom.set_threshold(1.5);
/// bloom.set_knee(0.2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BloomSettings {
    /// Whether bloom is enabled.
    pub enabled: bool,

    /// Luminance where bloom starts.
    ///
    /// Default: `1.1`
    threshold: f32,

    /// Width of the soft transition below the threshold.
    ///
    /// Default: `0.1`
    knee: f32,

    /// Sample spread of the upsample tent filter.
    ///
    /// Default: `1.0`
    upsample_scale: f32,

    /// Bloom contribution in the final composite.
    ///
    /// Default: `1.0`
    intensity: f32,

    /// Lens dirt contribution, only used with a dirt texture.
    ///
    /// Default: `1.0`
    dirt_intensity: f32,

    pub dirt_texture: Option<TextureHandle>,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1.1,
            knee: 0.1,
            upsample_scale: 1.0,
            intensity: 1.0,
            dirt_intensity: 1.0,
            dirt_texture: None,
        }
    }
}

impl BloomSettings {
    const MIN_KNEE: f32 = 1e-5;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[inline]
    #[must_use]
    pub fn knee(&self) -> f32 {
        self.knee
    }

    #[inline]
    #[must_use]
    pub fn upsample_scale(&self) -> f32 {
        self.upsample_scale
    }

    #[inline]
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    #[inline]
    #[must_use]
    pub fn dirt_intensity(&self) -> f32 {
        self.dirt_intensity
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.max(0.0);
    }

    /// The knee is kept strictly positive; the curve divides by it.
    pub fn set_knee(&mut self, knee: f32) {
        self.knee = knee.max(Self::MIN_KNEE);
    }

    pub fn set_upsample_scale(&mut self, scale: f32) {
        self.upsample_scale = scale.max(0.0);
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity.max(0.0);
    }

    pub fn set_dirt_intensity(&mut self, intensity: f32) {
        self.dirt_intensity = intensity.max(0.0);
    }

    /// Prefilter curve: `(threshold, threshold - knee, 2 * knee, 0.25 / knee)`.
    #[must_use]
    pub fn prefilter_params(&self) -> Vec4 {
        Vec4::new(
            self.threshold,
            self.threshold - self.knee,
            self.knee * 2.0,
            0.25 / self.knee,
        )
    }
}
