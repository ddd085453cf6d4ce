//! Resource store consumed by the render core.
//!
//! Meshes and materials are owned here and referenced everywhere else by
//! stable slotmap keys. Key comparison (`Ord`) is what the render-set
//! builder sorts on, so batching is deterministic across runs.

mod storage;

pub use storage::AssetStorage;

use slotmap::new_key_type;

use crate::resources::{Material, Mesh};

new_key_type! {
    pub struct MeshKey;
    pub struct MaterialKey;
}

#[derive(Default)]
pub struct Assets {
    pub meshes: AssetStorage<MeshKey, Mesh>,
    pub materials: AssetStorage<MaterialKey, Material>,
}

impl Assets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    #[inline]
    #[must_use]
    pub fn material(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key)
    }
}
