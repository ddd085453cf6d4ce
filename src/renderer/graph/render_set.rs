//! Render-Set Building
//!
//! Turns the flat visible-entity list into per-bucket batches. Entities are
//! sorted by `(mesh, section, material)` using arena-key order, which is
//! deterministic for a given scene history, then distributed into one bucket
//! per [`SortType`]. Building a render set walks the requested buckets and
//! merges runs of entities that can share a draw into one [`ModelContext`].
//!
//! ```text
//! entities ─► sort (mesh, section, material) ─► buckets[SortType]
//!                                                   │
//!              fill(&[Opaque, Transparent]) ◄───────┘
//!                 │
//!                 ▼
//!   [ModelContext { mesh A, s0, mat 1, instances: [T, T, T] },
//!    ModelContext { mesh A, s0, mat 2, instances: [T] }, ...]
//! ```

use std::cmp::Ordering;

use glam::Mat4;

use crate::assets::{MaterialKey, MeshKey};
use crate::renderer::graph::visibility::VisibleEntity;
use crate::resources::SortType;

/// A run of entities drawn with the same mesh section and material.
///
/// `instances` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelContext {
    pub material: MaterialKey,
    pub mesh: MeshKey,
    pub section: u32,
    pub instanced: bool,
    pub instances: Vec<Mat4>,
}

impl ModelContext {
    #[inline]
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn accepts(&self, entity: &VisibleEntity) -> bool {
        self.mesh == entity.mesh
            && self.section == entity.section
            && self.material == entity.material
            && self.instanced == entity.instanced
    }
}

impl From<&VisibleEntity> for ModelContext {
    fn from(entity: &VisibleEntity) -> Self {
        Self {
            material: entity.material,
            mesh: entity.mesh,
            section: entity.section,
            instanced: entity.instanced,
            instances: vec![entity.transform],
        }
    }
}

/// Ordered contexts consumed by one pass.
pub type RenderSet = Vec<ModelContext>;

/// Batching order: mesh, then section, then material.
#[must_use]
pub fn batch_order(a: &VisibleEntity, b: &VisibleEntity) -> Ordering {
    a.mesh
        .cmp(&b.mesh)
        .then(a.section.cmp(&b.section))
        .then(a.material.cmp(&b.material))
}

fn same_batch(a: &VisibleEntity, b: &VisibleEntity) -> bool {
    a.mesh == b.mesh
        && a.section == b.section
        && a.material == b.material
        && a.instanced == b.instanced
}

#[derive(Debug, Default)]
pub struct RenderSetBuilder {
    buckets: [Vec<VisibleEntity>; SortType::COUNT],
}

impl RenderSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Sorts `entities` into the per-bucket lists, replacing any previous
    /// contents.
    pub fn sort(&mut self, entities: &[VisibleEntity]) {
        self.clear();

        let mut sorted = entities.to_vec();
        sorted.sort_by(batch_order);

        for entity in sorted {
            self.buckets[entity.sort_type.index()].push(entity);
        }
    }

    #[must_use]
    pub fn bucket(&self, sort_type: SortType) -> &[VisibleEntity] {
        &self.buckets[sort_type.index()]
    }

    #[must_use]
    pub fn is_empty(&self, sort_type: SortType) -> bool {
        self.buckets[sort_type.index()].is_empty()
    }

    /// Number of contexts [`fill`](Self::fill) produces for one bucket.
    #[must_use]
    pub fn context_count(&self, sort_type: SortType) -> usize {
        let bucket = self.bucket(sort_type);
        if bucket.is_empty() {
            return 0;
        }
        let breaks = bucket
            .windows(2)
            .filter(|pair| !same_batch(&pair[0], &pair[1]))
            .count();
        breaks + 1
    }

    /// Builds a fresh render set from the given buckets, in order.
    #[must_use]
    pub fn build(&self, sort_types: &[SortType]) -> RenderSet {
        let mut set = RenderSet::new();
        self.fill(&mut set, sort_types);
        set
    }

    /// Clears `set` and fills it from the given buckets, in order. Merging
    /// never crosses a bucket boundary.
    pub fn fill(&self, set: &mut RenderSet, sort_types: &[SortType]) {
        set.clear();

        for sort_type in sort_types {
            let bucket_start = set.len();
            for entity in &self.buckets[sort_type.index()] {
                let open = set.len() > bucket_start;
                match set.last_mut() {
                    Some(current) if open && current.accepts(entity) => {
                        current.instances.push(entity.transform);
                    }
                    _ => set.push(ModelContext::from(entity)),
                }
            }
        }
    }
}
