//! Renderer Settings
//!
//! Runtime configuration of the scene renderer: which passes run, how the
//! visibility collector treats meshes without bounds, and the sizing of the
//! instance buffer, temporal target cache and shadow maps.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lumen::renderer::settings::{RendererSettings, UnboundedMeshPolicy};
//!
//! // Defaults: every pass on, unbounded meshes always drawn
//! let settings = RendererSettings::default();
//!
//! // Shadow-less, cull anything without bounds
//! let settings = RendererSettings {
//!     shadows: false,
//!     unbounded_mesh_policy: UnboundedMeshPolicy::Cull,
//!     ..Default::default()
//! };
//!
//! // From a config file
//! let settings = RendererSettings::from_json(r#"{ "shadow_map_size": 4096 }"#)?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::resources::uniforms::MAX_CASCADES;

// ---------------------------------------------------------------------------
// UnboundedMeshPolicy
// ---------------------------------------------------------------------------

/// What the visibility collector does with meshes that declare no bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnboundedMeshPolicy {
    /// Never culled; drawn by every camera and every shadow cascade.
    #[default]
    AlwaysVisible,
    /// Treated as outside every frustum.
    Cull,
}

// ---------------------------------------------------------------------------
// RendererSettings
// ---------------------------------------------------------------------------

/// Scene renderer configuration.
///
/// # Fields
///
/// | Field                       | Description                                  | Default         |
/// |-----------------------------|----------------------------------------------|-----------------|
/// | `shadows`                   | Directional light shadow cascades            | `true`          |
/// | `depth_prepass`             | Depth pre-pass before the ambient pass       | `true`          |
/// | `particles`                 | Particle simulation and draw                 | `true`          |
/// | `debug_shapes`              | Immediate-mode debug shapes                  | `true`          |
/// | `post_processing`           | Bloom / tone mapping / effect chain          | `true`          |
/// | `unbounded_mesh_policy`     | Culling of meshes without bounds             | `AlwaysVisible` |
/// | `instance_capacity`         | Transforms per instanced batch               | `1024`          |
/// | `temporal_target_idle_secs` | Idle time before a pooled target is evicted  | `10.0`          |
/// | `temporal_target_soft_cap`  | Pool size that triggers a warning            | `50`            |
/// | `shadow_map_size`           | Cascade resolution (square)                  | `2048`          |
/// | `shadow_cascades`           | Cascade count, clamped to `1..=4`            | `4`             |
/// | `cascade_lambda`            | Uniform/log split blend, clamped to `0..=1`  | `0.75`          |
/// | `shadow_distance`           | Shadow far distance, clamped to camera far   | `100.0`         |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    // === Pass toggles ===
    pub shadows: bool,
    pub depth_prepass: bool,
    pub particles: bool,
    pub debug_shapes: bool,
    pub post_processing: bool,

    // === Visibility ===
    pub unbounded_mesh_policy: UnboundedMeshPolicy,

    // === Batching ===
    /// Capacity of the instance buffer in transforms. Larger batches are
    /// split automatically.
    pub instance_capacity: u32,

    // === Temporal targets ===
    pub temporal_target_idle_secs: f32,
    pub temporal_target_soft_cap: usize,

    // === Shadows ===
    pub shadow_map_size: u32,
    pub shadow_cascades: u32,
    pub cascade_lambda: f32,
    pub shadow_distance: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            shadows: true,
            depth_prepass: true,
            particles: true,
            debug_shapes: true,
            post_processing: true,
            unbounded_mesh_policy: UnboundedMeshPolicy::default(),
            instance_capacity: 1024,
            temporal_target_idle_secs: 10.0,
            temporal_target_soft_cap: 50,
            shadow_map_size: 2048,
            shadow_cascades: MAX_CASCADES as u32,
            cascade_lambda: 0.75,
            shadow_distance: 100.0,
        }
    }
}

impl RendererSettings {
    /// Parses settings from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Idle threshold of the temporal target cache.
    #[must_use]
    pub fn temporal_target_idle(&self) -> Duration {
        Duration::from_secs_f32(self.temporal_target_idle_secs.max(0.0))
    }

    #[inline]
    #[must_use]
    pub fn effective_instance_capacity(&self) -> u32 {
        self.instance_capacity.max(1)
    }

    #[inline]
    #[must_use]
    pub fn effective_cascade_count(&self) -> u32 {
        self.shadow_cascades.clamp(1, MAX_CASCADES as u32)
    }

    #[inline]
    #[must_use]
    pub fn effective_cascade_lambda(&self) -> f32 {
        self.cascade_lambda.clamp(0.0, 1.0)
    }
}
