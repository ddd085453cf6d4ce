//! Frame Stage Definitions
//!
//! `FrameStage` is the fixed per-camera pass sequence of the scene renderer.
//! A stage may be skipped (feature flag off, empty render set) but the
//! relative order never changes.

/// Per-camera stage enumeration.
///
/// # Stage Overview
///
/// | Stage | Purpose | Skipped when |
/// |-------|---------|--------------|
/// | `ClearVisibility` | Reset the collector | never |
/// | `ShadowDepth` | Cascade depth maps of the first shadow-casting light | shadows off / no caster |
/// | `DepthPrePass` | Opaque + transparent depth | pre-pass off |
/// | `Ambient` | Opaque + transparent shading, decals, shadows | never (clears color) |
/// | `Sky` | Sky materials | empty set |
/// | `Particles` | Compute update + point draw | particles off |
/// | `Translucent` | Blended materials | empty set |
/// | `DebugShapes` | Immediate-mode lines | debug shapes off / debug camera |
/// | `Overlay` | Depth-cleared overlay materials | empty set |
/// | `PostProcess` | Bloom, tone map, effect chain | post-processing off |
/// | `Present` | Release frame targets | never |
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
#[repr(u8)]
pub enum FrameStage {
    ClearVisibility = 0,
    ShadowDepth = 1,
    DepthPrePass = 2,
    Ambient = 3,
    Sky = 4,
    Particles = 5,
    Translucent = 6,
    DebugShapes = 7,
    Overlay = 8,
    PostProcess = 9,
    Present = 10,
}

impl FrameStage {
    pub const ALL: [Self; 11] = [
        Self::ClearVisibility,
        Self::ShadowDepth,
        Self::DepthPrePass,
        Self::Ambient,
        Self::Sky,
        Self::Particles,
        Self::Translucent,
        Self::DebugShapes,
        Self::Overlay,
        Self::PostProcess,
        Self::Present,
    ];

    /// Returns the numeric index of the stage (used for sorting).
    #[inline]
    #[must_use]
    pub const fn order(self) -> u8 {
        self as u8
    }

    /// Returns the stage name, also used as the GPU debug group label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ClearVisibility => "ClearVisibility",
            Self::ShadowDepth => "ShadowDepthPass",
            Self::DepthPrePass => "DepthPrePass",
            Self::Ambient => "AmbientPass",
            Self::Sky => "SkyPass",
            Self::Particles => "ParticlePass",
            Self::Translucent => "TranslucentPass",
            Self::DebugShapes => "DebugShapePass",
            Self::Overlay => "OverlayPass",
            Self::PostProcess => "PostProcess",
            Self::Present => "Present",
        }
    }

    /// The stage that follows, `None` after `Present`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self as usize + 1).copied()
    }
}

/// Tracks stage progression for one camera; stages may be skipped but never
/// revisited.
#[derive(Debug, Clone, Default)]
pub struct StageTracker {
    current: Option<FrameStage>,
    executed: Vec<FrameStage>,
}

impl StageTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `stage` as entered.
    pub fn enter(&mut self, stage: FrameStage) {
        debug_assert!(
            self.current.is_none_or(|c| c < stage),
            "stage {} entered after {:?}",
            stage.name(),
            self.current
        );
        self.current = Some(stage);
        self.executed.push(stage);
    }

    #[must_use]
    pub fn current(&self) -> Option<FrameStage> {
        self.current
    }

    #[must_use]
    pub fn executed(&self) -> &[FrameStage] {
        &self.executed
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.executed.clear();
    }
}
