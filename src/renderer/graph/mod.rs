//! Per-Camera Frame Graph
//!
//! The building blocks the scene renderer sequences for every camera:
//!
//! - [`FrameStage`]: fixed stage order and debug labels
//! - [`VisibilityCollector`]: frustum culling into visible entities
//! - [`RenderSetBuilder`]: sorting, bucketing and instance merging
//! - [`PassExecutor`]: state-change-minimizing draw submission
//! - [`shadow_utils`]: cascade math
//! - [`passes`]: shadow, particle, decal and post-process passes

pub mod executor;
pub mod passes;
pub mod render_set;
pub mod shadow_utils;
pub mod stage;
pub mod visibility;

pub use executor::{InstanceSlot, PassExecutor, PassStats, StateOverride};
pub use render_set::{ModelContext, RenderSet, RenderSetBuilder};
pub use stage::{FrameStage, StageTracker};
pub use visibility::{CollectFilter, VisibilityCollector, VisibleEntity};

use glam::{Mat4, Vec3};

use crate::renderer::state::ViewPort;
use crate::scene::Frustum;

/// Camera matrices and target rectangle resolved for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub projection: Mat4,
    pub view: Mat4,
    pub position: Vec3,
    pub forward: Vec3,
    pub near: f32,
    pub far: f32,
    pub viewport: ViewPort,
}

impl CameraView {
    #[inline]
    #[must_use]
    pub fn projection_view(&self) -> Mat4 {
        self.projection * self.view
    }

    #[must_use]
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(self.projection_view())
    }
}
