//! Error Types
//!
//! This module defines the error types used by the rendering core.
//!
//! # Overview
//!
//! The main error type [`RenderError`] covers three families of failure:
//! - Camera configuration errors (the camera is skipped, other cameras render)
//! - Resource discipline violations (temporal render targets outliving a frame)
//! - Configuration loading errors
//!
//! Device calls themselves are infallible; GPU-side validation is the
//! device implementation's business.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen::errors::{RenderError, Result};
//!
//! fn render_one(renderer: &mut SceneRenderer<MyDevice>) -> Result<()> {
//!     renderer.render_camera(&scene, &assets, camera)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::renderer::viewport::ViewportId;
use crate::scene::CameraKey;

/// The main error type for the rendering core.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // Camera Configuration Errors
    // ========================================================================
    /// The camera has no viewport assigned.
    #[error("Cannot render camera {camera} because it has no viewport")]
    MissingViewport {
        /// Camera debug name
        camera: String,
    },

    /// The camera references a viewport that was never created or has no size yet.
    #[error("Cannot render camera {camera} because viewport {viewport:?} is not ready")]
    ViewportNotReady {
        /// Camera debug name
        camera: String,
        /// The referenced viewport
        viewport: ViewportId,
    },

    /// The camera has no projection.
    #[error("Cannot render camera {camera} because it has no projection")]
    MissingProjection {
        /// Camera debug name
        camera: String,
    },

    /// The camera key does not resolve to a camera in the scene.
    #[error("Unknown camera: {0:?}")]
    UnknownCamera(CameraKey),

    // ========================================================================
    // Resource Discipline
    // ========================================================================
    /// A temporal render target was still in use at the end-of-frame sweep.
    #[error("Temporal render target '{name}' cannot live outside a frame")]
    TemporalTargetLeaked {
        /// Debug name given at acquisition
        name: String,
    },

    // ========================================================================
    // Configuration
    // ========================================================================
    /// JSON parsing error while loading renderer settings.
    #[error("JSON parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RenderError {
    /// Returns `true` for errors that only affect the current camera.
    #[must_use]
    pub fn is_camera_error(&self) -> bool {
        matches!(
            self,
            Self::MissingViewport { .. }
                | Self::ViewportNotReady { .. }
                | Self::MissingProjection { .. }
                | Self::UnknownCamera(_)
        )
    }
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
