//! Rendering System
//!
//! Everything between a populated [`Scene`](crate::scene::Scene) and the
//! device calls that draw it:
//!
//! - [`device`]: the abstract device and a recording implementation
//! - [`state`]: draw/dispatch state descriptions
//! - [`graph`]: visibility, batching, pass execution and the built-in passes
//! - [`temporal_pool`]: frame-scoped pooled render targets
//! - [`viewport`]: output surfaces cameras render into
//! - [`scene_renderer`]: the per-camera frame orchestration

pub mod debug_shapes;
pub mod device;
pub mod graph;
pub mod scene_renderer;
pub mod settings;
pub mod state;
pub mod stats;
pub mod temporal_pool;
pub mod viewport;

pub use scene_renderer::{SceneRenderer, ShaderLibrary};
pub use stats::{FrameStats, FrameSummary};

/// Format of the scene color buffer and every post-process intermediate.
pub const HDR_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Format of scene depth and shadow maps.
pub const DEPTH_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
