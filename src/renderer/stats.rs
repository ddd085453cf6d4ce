//! Frame Statistics
//!
//! Per-camera counters gathered while a frame is recorded. They are cheap
//! to fill and are logged at `debug` level after every camera.

use std::fmt;

use crate::renderer::graph::{FrameStage, PassStats};
use crate::resources::SortType;
use crate::scene::CameraKey;

/// Counters for one rendered camera.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Entities that survived frustum culling in the main view.
    pub visible_entities: u32,
    /// Renderers rejected by the main view frustum.
    pub culled: u32,
    /// Model contexts per sort bucket, indexed by [`SortType::index`].
    pub contexts: [u32; SortType::COUNT],

    pub shadow: PassStats,
    pub shadow_cascades: u32,
    pub depth_prepass: PassStats,
    pub ambient: PassStats,
    pub sky: PassStats,
    pub translucent: PassStats,
    pub overlay: PassStats,

    pub particle_systems: u32,
    pub decals: u32,
    pub debug_draws: u32,
    pub post_effects: u32,
    pub bloom: bool,
    pub tone_mapped: bool,

    /// Stages entered, in execution order.
    pub stages: Vec<FrameStage>,
}

impl FrameStats {
    /// All scene-geometry passes folded together.
    #[must_use]
    pub fn geometry(&self) -> PassStats {
        let mut total = PassStats::default();
        for pass in [
            &self.shadow,
            &self.depth_prepass,
            &self.ambient,
            &self.sky,
            &self.translucent,
            &self.overlay,
        ] {
            total.accumulate(pass);
        }
        total
    }

    #[must_use]
    pub fn draw_calls(&self) -> u32 {
        self.geometry().draw_calls + self.particle_systems + self.debug_draws
    }

    #[must_use]
    pub fn instances(&self) -> u32 {
        self.geometry().instances
    }

    #[must_use]
    pub fn ran(&self, stage: FrameStage) -> bool {
        self.stages.contains(&stage)
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} visible, {} culled, {} draws, {} instances, {} stages",
            self.visible_entities,
            self.culled,
            self.draw_calls(),
            self.instances(),
            self.stages.len()
        )
    }
}

/// Outcome of rendering every camera of a scene.
#[derive(Debug, Clone, Default)]
pub struct FrameSummary {
    pub rendered: Vec<(CameraKey, FrameStats)>,
    /// Cameras skipped because of a configuration error.
    pub skipped: Vec<CameraKey>,
}

impl FrameSummary {
    #[must_use]
    pub fn stats(&self, camera: CameraKey) -> Option<&FrameStats> {
        self.rendered
            .iter()
            .find(|(key, _)| *key == camera)
            .map(|(_, stats)| stats)
    }

    #[must_use]
    pub fn draw_calls(&self) -> u32 {
        self.rendered.iter().map(|(_, stats)| stats.draw_calls()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_calls_include_particles_and_debug() {
        let mut stats = FrameStats::default();
        stats.ambient.draw_calls = 4;
        stats.shadow.draw_calls = 2;
        stats.particle_systems = 1;
        stats.debug_draws = 3;
        assert_eq!(stats.draw_calls(), 10);
    }

    #[test]
    fn ran_reports_entered_stages() {
        let stats = FrameStats {
            stages: vec![FrameStage::ClearVisibility, FrameStage::Ambient],
            ..FrameStats::default()
        };
        assert!(stats.ran(FrameStage::Ambient));
        assert!(!stats.ran(FrameStage::Sky));
    }
}
