//! Tone Mapping Configuration
//!
//! Tone mapping modes and settings as pure data. The final composite pass
//! reads them every frame and turns them into loose uniforms:
//!
//! | Uniform                 | Source                                   |
//! |-------------------------|------------------------------------------|
//! | `u_BasicToneMapEnabled` | [`ToneMappingSettings::basic_enabled`]   |
//! | `u_BasicToneMapMode`    | [`ToneMappingMode::shader_index`]        |
//! | `u_LutToneMapEnabled`   | [`ToneMappingSettings::lut_enabled`]     |
//! | `u_LutToneMapData`      | [`LutTexture::params`]                   |
//!
//! Color grading uses a strip LUT. Its sampling parameters are
//! `scale = (size - 1) / size` and `offset = 0.5 / size`, where `size` is
//! the width of the LUT texture.

use glam::Vec2;

use crate::renderer::device::{TextureDesc, TextureHandle};

/// Basic (analytic) tone mapping operator.
///
/// - [`Linear`](ToneMappingMode::Linear): clamp only
/// - [`Reinhard`](ToneMappingMode::Reinhard): classic operator, soft highlight rolloff
/// - [`Filmic`](ToneMappingMode::Filmic): Uncharted 2 style curve
/// - [`ACESFilmic`](ToneMappingMode::ACESFilmic): industry standard filmic curve
/// - [`Neutral`](ToneMappingMode::Neutral): balanced, hue preserving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneMappingMode {
    Linear,
    Reinhard,
    Filmic,
    #[default]
    ACESFilmic,
    Neutral,
}

impl ToneMappingMode {
    /// Value written to `u_BasicToneMapMode`.
    #[must_use]
    pub const fn shader_index(self) -> u32 {
        match self {
            Self::Linear => 0,
            Self::Reinhard => 1,
            Self::Filmic => 2,
            Self::ACESFilmic => 3,
            Self::Neutral => 4,
        }
    }

    /// Returns a human-readable name for the mode.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Reinhard => "Reinhard",
            Self::Filmic => "Filmic",
            Self::ACESFilmic => "ACES Filmic",
            Self::Neutral => "Neutral",
        }
    }

    /// Returns all available tone mapping modes.
    #[must_use]
    pub fn all() -> &'static [ToneMappingMode] {
        &[
            Self::Linear,
            Self::Reinhard,
            Self::Filmic,
            Self::ACESFilmic,
            Self::Neutral,
        ]
    }
}

/// Color grading LUT together with the descriptor it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LutTexture {
    texture: TextureHandle,
    desc: TextureDesc,
}

impl LutTexture {
    #[must_use]
    pub fn new(texture: TextureHandle, desc: TextureDesc) -> Self {
        Self { texture, desc }
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    /// Width of the LUT in texels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u32 {
        self.desc.width
    }

    /// `(scale, offset)` that map `[0, 1]` onto texel centres.
    #[must_use]
    pub fn params(&self) -> Vec2 {
        let size = self.size().max(1) as f32;
        Vec2::new((size - 1.0) / size, 0.5 / size)
    }
}

/// Tone mapping configuration.
///
/// ```rust,ignore
/// let tm = renderer.tone_mapping_mut();
/// tm.set_mode(ToneMappingMode::Reinhard);
/// tm.set_lut(Some(LutTexture::new(lut, lut_desc)));
/// tm.set_lut_enabled(true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ToneMappingSettings {
    /// Selected basic tone mapping algorithm.
    pub mode: ToneMappingMode,
    basic_enabled: bool,
    lut_enabled: bool,
    lut: Option<LutTexture>,
}

impl Default for ToneMappingSettings {
    fn default() -> Self {
        Self {
            mode: ToneMappingMode::default(),
            basic_enabled: true,
            lut_enabled: false,
            lut: None,
        }
    }
}

impl ToneMappingSettings {
    /// Basic ACES tone mapping on, LUT off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings with every stage off; the HDR buffer is blitted as is.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            basic_enabled: false,
            ..Self::default()
        }
    }

    /// `true` when any tone mapping stage runs.
    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.basic_enabled || self.lut_enabled
    }

    #[inline]
    #[must_use]
    pub fn basic_enabled(&self) -> bool {
        self.basic_enabled
    }

    #[inline]
    #[must_use]
    pub fn lut_enabled(&self) -> bool {
        self.lut_enabled
    }

    #[must_use]
    pub fn lut(&self) -> Option<&LutTexture> {
        self.lut.as_ref()
    }

    /// LUT that should actually be sampled this frame.
    #[must_use]
    pub fn active_lut(&self) -> Option<&LutTexture> {
        self.lut.as_ref().filter(|_| self.lut_enabled)
    }

    /// Sets the tone mapping mode.
    pub fn set_mode(&mut self, mode: ToneMappingMode) {
        self.mode = mode;
    }

    pub fn set_basic_enabled(&mut self, enabled: bool) {
        self.basic_enabled = enabled;
    }

    pub fn set_lut_enabled(&mut self, enabled: bool) {
        self.lut_enabled = enabled;
    }

    pub fn set_lut(&mut self, lut: Option<LutTexture>) {
        self.lut = lut;
    }
}
