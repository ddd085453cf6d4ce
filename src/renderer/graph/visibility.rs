//! Visibility Collection
//!
//! Walks every active [`MeshRenderer`] in the scene, culls it against a
//! frustum and records one [`VisibleEntity`] per drawable section. The
//! collector is owned by the renderer and reused: every
//! [`collect`](VisibilityCollector::collect) starts from a cleared state, so
//! cameras and shadow cascades never see each other's entities.
//!
//! ```text
//! MeshRenderer ──► mesh bounds? ──yes──► world AABB ∩ frustum? ──no──► skip
//!                       │                         │yes
//!                       no (policy)               ▼
//!                       └──────────────► for section with material:
//!                                            push VisibleEntity
//!                                            counters[kind] += 1
//! ```

use glam::Mat4;
use log::warn;
use rustc_hash::FxHashMap;

use crate::assets::{Assets, MaterialKey, MeshKey};
use crate::renderer::settings::UnboundedMeshPolicy;
use crate::resources::{Material, MaterialFlags, MaterialKind, Mesh, SortType};
use crate::scene::{Frustum, MeshRenderer, Scene};

/// One (material, mesh, section, transform) tuple seen this frame.
///
/// The material's sort type and instancing flag are cached at collection
/// time so sorting never goes back to the asset store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleEntity {
    pub material: MaterialKey,
    pub mesh: MeshKey,
    pub section: u32,
    pub transform: Mat4,
    pub sort_type: SortType,
    pub instanced: bool,
}

/// Which entities a collection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectFilter {
    #[default]
    All,
    /// Drops materials flagged [`MaterialFlags::SKIP_SHADOWS`].
    ShadowCasters,
}

#[derive(Debug, Default)]
pub struct VisibilityCollector {
    entities: Vec<VisibleEntity>,
    counters: FxHashMap<MaterialKind, u32>,
    culled: u32,
    policy: UnboundedMeshPolicy,
}

impl VisibilityCollector {
    #[must_use]
    pub fn new(policy: UnboundedMeshPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn policy(&self) -> UnboundedMeshPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: UnboundedMeshPolicy) {
        self.policy = policy;
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.counters.clear();
        self.culled = 0;
    }

    /// Clears, then collects everything visible from `frustum`.
    pub fn collect(&mut self, scene: &Scene, assets: &Assets, frustum: &Frustum) {
        self.collect_filtered(scene, assets, frustum, CollectFilter::All);
    }

    pub fn collect_filtered(
        &mut self,
        scene: &Scene,
        assets: &Assets,
        frustum: &Frustum,
        filter: CollectFilter,
    ) {
        self.clear();

        for (_, renderer) in scene.components::<MeshRenderer>() {
            if !renderer.active {
                continue;
            }
            let Some(mesh_key) = renderer.mesh else {
                continue;
            };
            let Some(mesh) = assets.mesh(mesh_key) else {
                warn!("MeshRenderer references a missing mesh {mesh_key:?}");
                continue;
            };

            if !self.is_visible(mesh, &renderer.transform, frustum) {
                self.culled += 1;
                continue;
            }

            for (section_index, section) in mesh.sections.iter().enumerate() {
                let Some(material_key) = renderer.material(section.material_index) else {
                    continue;
                };
                let Some(material) = assets.material(material_key) else {
                    warn!("Mesh '{}' section {section_index} references a missing material", mesh.name);
                    continue;
                };
                if filter == CollectFilter::ShadowCasters
                    && material.has_flag(MaterialFlags::SKIP_SHADOWS)
                {
                    continue;
                }

                self.add_visible_entity(
                    material_key,
                    material,
                    mesh_key,
                    section_index as u32,
                    renderer.transform,
                );
            }
        }
    }

    /// Records one entity directly, bypassing culling.
    pub fn add_visible_entity(
        &mut self,
        material_key: MaterialKey,
        material: &Material,
        mesh: MeshKey,
        section: u32,
        transform: Mat4,
    ) {
        self.entities.push(VisibleEntity {
            material: material_key,
            mesh,
            section,
            transform,
            sort_type: material.sort_type(),
            instanced: material.has_flag(MaterialFlags::INSTANCED),
        });
        *self.counters.entry(material.kind()).or_insert(0) += 1;
    }

    fn is_visible(&self, mesh: &Mesh, transform: &Mat4, frustum: &Frustum) -> bool {
        match mesh.bounds {
            Some(bounds) => {
                let world = if mesh.bounds_pre_transformed {
                    bounds
                } else {
                    bounds.transform(transform)
                };
                frustum.intersects_aabb(&world)
            }
            None => self.policy == UnboundedMeshPolicy::AlwaysVisible,
        }
    }

    #[must_use]
    pub fn entities(&self) -> &[VisibleEntity] {
        &self.entities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Visible sections per material kind.
    #[must_use]
    pub fn count_of(&self, kind: MaterialKind) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn counters(&self) -> &FxHashMap<MaterialKind, u32> {
        &self.counters
    }

    /// Mesh renderers rejected by culling in the last collection.
    #[must_use]
    pub fn culled(&self) -> u32 {
        self.culled
    }
}
