//! Visibility and Render-Set Tests
//!
//! Tests for:
//! - Frustum culling of mesh renderers (bounds, pre-transformed bounds, policy)
//! - Section/material slot resolution and per-kind counters
//! - Shadow-caster filtering
//! - Sorting, bucketing and instance merging
//! - Determinism of the batching order

use std::cmp::Ordering;

use glam::{Mat4, Vec3};

use lumen::assets::{Assets, MaterialKey, MeshKey};
use lumen::renderer::device::{InputLayoutHandle, ShaderHandle};
use lumen::renderer::graph::render_set::batch_order;
use lumen::renderer::graph::{CollectFilter, RenderSetBuilder, VisibilityCollector, VisibleEntity};
use lumen::renderer::settings::UnboundedMeshPolicy;
use lumen::resources::{
    BoundingBox, DrawRange, Material, MaterialFlags, MaterialKind, MaterialPass, Mesh,
    MeshSection, PassType, SortType,
};
use lumen::scene::{Frustum, MeshRenderer, Scene};

// ============================================================================
// Fixtures
// ============================================================================

fn unit_mesh(name: &str) -> Mesh {
    Mesh::new(name, InputLayoutHandle(1))
        .with_bounds(BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5)))
        .with_section(MeshSection::new(0, DrawRange::new(0, 36)))
}

fn material(name: &str, kind: MaterialKind, sort_type: SortType) -> Material {
    Material::new(name, kind, sort_type)
        .with_flags(MaterialFlags::INSTANCED)
        .with_pass(PassType::Ambient, MaterialPass::new(ShaderHandle(1)))
}

/// Camera at the origin looking down -Z, 90° fov, far plane at 100.
fn frustum() -> Frustum {
    Frustum::from_matrix(Mat4::perspective_rh(90f32.to_radians(), 1.0, 0.1, 100.0))
}

fn in_front(i: usize) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0 - i as f32 * 0.1))
}

fn collect(scene: &Scene, assets: &Assets) -> VisibilityCollector {
    let mut collector = VisibilityCollector::new(UnboundedMeshPolicy::AlwaysVisible);
    collector.collect(scene, assets, &frustum());
    collector
}

// ============================================================================
// Visibility Tests
// ============================================================================

#[test]
fn culls_renderers_outside_frustum() {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(unit_mesh("Cube"));
    let mat = assets
        .materials
        .add(material("Lit", MaterialKind::Lit, SortType::Opaque));

    let mut scene = Scene::new();
    scene.add(MeshRenderer::new(mesh, mat, in_front(0)));
    scene.add(MeshRenderer::new(
        mesh,
        mat,
        Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)),
    ));

    let collector = collect(&scene, &assets);
    assert_eq!(collector.len(), 1);
    assert_eq!(collector.culled(), 1);
}

#[test]
fn inactive_and_meshless_renderers_are_skipped() {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(unit_mesh("Cube"));
    let mat = assets
        .materials
        .add(material("Lit", MaterialKind::Lit, SortType::Opaque));

    let mut scene = Scene::new();
    let mut hidden = MeshRenderer::new(mesh, mat, in_front(0));
    hidden.active = false;
    scene.add(hidden);
    let mut empty = MeshRenderer::new(mesh, mat, in_front(0));
    empty.mesh = None;
    scene.add(empty);

    let collector = collect(&scene, &assets);
    assert!(collector.is_empty());
    assert_eq!(collector.culled(), 0, "Skipped renderers are not culled");
}

#[test]
fn pre_transformed_bounds_ignore_renderer_transform() {
    let mut assets = Assets::new();
    let mut baked = Mesh::new("Baked", InputLayoutHandle(1))
        .with_bounds(BoundingBox::new(
            Vec3::new(-1.0, -1.0, -11.0),
            Vec3::new(1.0, 1.0, -9.0),
        ))
        .with_section(MeshSection::new(0, DrawRange::new(0, 6)));
    baked.bounds_pre_transformed = true;
    let mesh = assets.meshes.add(baked);
    let mat = assets
        .materials
        .add(material("Lit", MaterialKind::Lit, SortType::Opaque));

    let mut scene = Scene::new();
    // Transform points behind the camera; the baked bounds are in front.
    scene.add(MeshRenderer::new(
        mesh,
        mat,
        Mat4::from_translation(Vec3::new(0.0, 0.0, 50.0)),
    ));

    assert_eq!(collect(&scene, &assets).len(), 1);
}

#[test]
fn unbounded_mesh_follows_policy() {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(
        Mesh::new("Unbounded", InputLayoutHandle(1))
            .with_section(MeshSection::new(0, DrawRange::new(0, 6))),
    );
    let mat = assets
        .materials
        .add(material("Sky", MaterialKind::Sky, SortType::Sky));

    let mut scene = Scene::new();
    scene.add(MeshRenderer::new(
        mesh,
        mat,
        Mat4::from_translation(Vec3::new(0.0, 0.0, 500.0)),
    ));

    let mut collector = VisibilityCollector::new(UnboundedMeshPolicy::AlwaysVisible);
    collector.collect(&scene, &assets, &frustum());
    assert_eq!(collector.len(), 1);

    collector.set_policy(UnboundedMeshPolicy::Cull);
    collector.collect(&scene, &assets, &frustum());
    assert!(collector.is_empty());
    assert_eq!(collector.culled(), 1);
}

#[test]
fn empty_material_slot_hides_section() {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(
        unit_mesh("TwoParts").with_section(MeshSection::new(1, DrawRange::new(36, 12))),
    );
    let mat = assets
        .materials
        .add(material("Lit", MaterialKind::Lit, SortType::Opaque));

    let mut scene = Scene::new();
    scene.add(MeshRenderer::new(mesh, mat, in_front(0)));
    let mut both = MeshRenderer::new(mesh, mat, in_front(1));
    both.materials.push(Some(mat));
    scene.add(both);

    let collector = collect(&scene, &assets);
    assert_eq!(collector.len(), 3, "1 section + 2 sections");
    assert_eq!(
        collector.entities().iter().filter(|e| e.section == 1).count(),
        1
    );
}

#[test]
fn counters_track_material_kinds() {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(unit_mesh("Cube"));
    let lit = assets
        .materials
        .add(material("Lit", MaterialKind::Lit, SortType::Opaque));
    let unlit = assets
        .materials
        .add(material("Unlit", MaterialKind::Unlit, SortType::Opaque));

    let mut scene = Scene::new();
    for i in 0..3 {
        scene.add(MeshRenderer::new(mesh, lit, in_front(i)));
    }
    scene.add(MeshRenderer::new(mesh, unlit, in_front(3)));

    let collector = collect(&scene, &assets);
    assert_eq!(collector.count_of(MaterialKind::Lit), 3);
    assert_eq!(collector.count_of(MaterialKind::Unlit), 1);
    assert_eq!(collector.count_of(MaterialKind::Sky), 0);
}

#[test]
fn shadow_filter_drops_non_casters() {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(unit_mesh("Cube"));
    let caster = assets
        .materials
        .add(material("Caster", MaterialKind::Lit, SortType::Opaque));
    let receiver = assets.materials.add(
        material("Receiver", MaterialKind::Lit, SortType::Opaque)
            .with_flags(MaterialFlags::SKIP_SHADOWS),
    );

    let mut scene = Scene::new();
    scene.add(MeshRenderer::new(mesh, caster, in_front(0)));
    scene.add(MeshRenderer::new(mesh, receiver, in_front(1)));

    let mut collector = VisibilityCollector::default();
    collector.collect_filtered(&scene, &assets, &frustum(), CollectFilter::ShadowCasters);
    assert_eq!(collector.len(), 1);
    assert_eq!(collector.entities()[0].material, caster);

    collector.collect(&scene, &assets, &frustum());
    assert_eq!(collector.len(), 2, "A new collection starts from scratch");
}

// ============================================================================
// Render-Set Tests
// ============================================================================

fn scattered_scene(count: usize) -> (Assets, Scene, Vec<MeshKey>, Vec<MaterialKey>) {
    let mut assets = Assets::new();
    let meshes: Vec<_> = (0..3)
        .map(|i| assets.meshes.add(unit_mesh(&format!("Mesh{i}"))))
        .collect();
    let materials: Vec<_> = (0..2)
        .map(|i| {
            assets
                .materials
                .add(material(&format!("Mat{i}"), MaterialKind::Lit, SortType::Opaque))
        })
        .collect();

    let mut scene = Scene::new();
    for i in 0..count {
        // Interleave so neighbours in scene order never share a batch.
        let mesh = meshes[i % 3];
        let mat = materials[(i / 3) % 2];
        scene.add(MeshRenderer::new(mesh, mat, in_front(i)));
    }
    (assets, scene, meshes, materials)
}

#[test]
fn hundred_entities_merge_into_at_most_six_contexts() {
    let (assets, scene, _, _) = scattered_scene(100);
    let collector = collect(&scene, &assets);
    assert_eq!(collector.len(), 100);

    let mut builder = RenderSetBuilder::new();
    builder.sort(collector.entities());
    let set = builder.build(&[SortType::Opaque]);

    assert!(set.len() <= 6, "expected at most 6 contexts, got {}", set.len());
    let total: usize = set.iter().map(|c| c.instance_count()).sum();
    assert_eq!(total, 100);
    assert_eq!(builder.context_count(SortType::Opaque), set.len());
}

#[test]
fn contexts_never_mix_mesh_or_material() {
    let (assets, scene, _, _) = scattered_scene(30);
    let collector = collect(&scene, &assets);

    let mut builder = RenderSetBuilder::new();
    builder.sort(collector.entities());
    let set = builder.build(&[SortType::Opaque]);

    for context in &set {
        let matching = collector
            .entities()
            .iter()
            .filter(|e| e.mesh == context.mesh && e.material == context.material)
            .count();
        assert_eq!(matching, context.instance_count());
    }
}

#[test]
fn render_set_is_independent_of_input_order() {
    let (assets, scene, _, _) = scattered_scene(40);
    let collector = collect(&scene, &assets);

    let mut reversed: Vec<VisibleEntity> = collector.entities().to_vec();
    reversed.reverse();

    let mut builder = RenderSetBuilder::new();
    builder.sort(collector.entities());
    let forward_keys: Vec<_> = builder
        .build(&[SortType::Opaque])
        .iter()
        .map(|c| (c.mesh, c.material, c.instance_count()))
        .collect();

    builder.sort(&reversed);
    let reversed_keys: Vec<_> = builder
        .build(&[SortType::Opaque])
        .iter()
        .map(|c| (c.mesh, c.material, c.instance_count()))
        .collect();

    assert_eq!(forward_keys, reversed_keys);
}

#[test]
fn buckets_follow_material_sort_type() {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(unit_mesh("Cube"));
    let sky = assets
        .materials
        .add(material("Sky", MaterialKind::Sky, SortType::Sky));
    let glass = assets
        .materials
        .add(material("Glass", MaterialKind::Lit, SortType::Translucent));
    let hud = assets
        .materials
        .add(material("Hud", MaterialKind::Unlit, SortType::Overlay));

    let mut scene = Scene::new();
    scene.add(MeshRenderer::new(mesh, sky, in_front(0)));
    scene.add(MeshRenderer::new(mesh, glass, in_front(1)));
    scene.add(MeshRenderer::new(mesh, glass, in_front(2)));
    scene.add(MeshRenderer::new(mesh, hud, in_front(3)));

    let mut builder = RenderSetBuilder::new();
    builder.sort(collect(&scene, &assets).entities());

    assert!(builder.is_empty(SortType::Opaque));
    assert_eq!(builder.bucket(SortType::Sky).len(), 1);
    assert_eq!(builder.bucket(SortType::Translucent).len(), 2);
    assert_eq!(builder.bucket(SortType::Overlay).len(), 1);
    assert_eq!(builder.build(&[SortType::Translucent]).len(), 1);
}

#[test]
fn non_instanced_contexts_are_flagged() {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(unit_mesh("Cube"));
    let single = assets.materials.add(
        Material::new("Single", MaterialKind::Lit, SortType::Opaque)
            .with_pass(PassType::Ambient, MaterialPass::new(ShaderHandle(2))),
    );

    let mut scene = Scene::new();
    for i in 0..4 {
        scene.add(MeshRenderer::new(mesh, single, in_front(i)));
    }

    let mut builder = RenderSetBuilder::new();
    builder.sort(collect(&scene, &assets).entities());
    let set = builder.build(&[SortType::Opaque]);

    assert!(set.iter().all(|c| !c.instanced));
    assert_eq!(set.iter().map(|c| c.instance_count()).sum::<usize>(), 4);
}

// ============================================================================
// Ordering Tests
// ============================================================================

#[test]
fn batch_order_is_a_strict_weak_ordering() {
    let (assets, scene, _, _) = scattered_scene(12);
    let collector = collect(&scene, &assets);
    let entities = collector.entities();

    for a in entities {
        assert_eq!(batch_order(a, a), Ordering::Equal, "irreflexive");
        for b in entities {
            assert_eq!(
                batch_order(a, b),
                batch_order(b, a).reverse(),
                "antisymmetric"
            );
            for c in entities {
                if batch_order(a, b) == Ordering::Less && batch_order(b, c) == Ordering::Less {
                    assert_eq!(batch_order(a, c), Ordering::Less, "transitive");
                }
            }
        }
    }
}
