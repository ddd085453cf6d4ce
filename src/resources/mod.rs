//! Render-facing resource data: meshes, materials, GPU uniform blocks and
//! the long-lived post-processing settings.

pub mod bloom;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod normal_bevel;
pub mod tone_mapping;
pub mod uniforms;

pub use bloom::{BloomMode, BloomSettings, BloomUniforms};
pub use geometry::BoundingBox;
pub use material::{Material, MaterialFlags, MaterialKind, MaterialPass, PassType, SortType};
pub use mesh::{DrawRange, IndexBuffer, Mesh, MeshSection};
pub use normal_bevel::{NormalBevelSettings, NormalBevelUniforms};
pub use tone_mapping::{LutTexture, ToneMappingMode, ToneMappingSettings};
