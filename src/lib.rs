#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod assets;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use assets::{Assets, MaterialKey, MeshKey};
pub use errors::{RenderError, Result};
pub use renderer::{FrameStats, FrameSummary, SceneRenderer, ShaderLibrary};
pub use renderer::device::{RecordingDevice, RenderDevice};
pub use renderer::settings::RendererSettings;
pub use resources::{BloomSettings, Material, Mesh, NormalBevelSettings, ToneMappingSettings};
pub use scene::{Camera, Scene};
