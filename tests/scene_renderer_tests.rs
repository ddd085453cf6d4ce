//! Scene Renderer Tests
//!
//! Tests for:
//! - Camera validation (viewport, viewport size, projection) before any GPU work
//! - Per-camera failure isolation in `render`
//! - Fixed stage order and stage skipping
//! - Present path with and without post-processing
//! - Beveled normals and camera effects inside the frame
//! - Per-object transform slots across passes and cameras of a frame
//! - Debug camera override and debug shape suppression
//! - End-of-frame temporal target discipline

use glam::{Mat4, Vec3};

use lumen::assets::Assets;
use lumen::renderer::debug_shapes::DebugShape;
use lumen::renderer::device::{
    BufferHandle, DeviceCommand, InputLayoutHandle, RecordingDevice, ShaderHandle, TextureDesc,
    TextureHandle,
};
use lumen::renderer::graph::FrameStage;
use lumen::renderer::graph::passes::{FullscreenEffect, PostProcessEffect};
use lumen::renderer::graph::executor::INSTANCE_BUFFER_NAME;
use lumen::renderer::viewport::ViewportId;
use lumen::resources::uniforms::{BaseVsData, GlobalData};
use lumen::resources::{
    BoundingBox, DrawRange, Material, MaterialFlags, MaterialKind, MaterialPass, Mesh,
    MeshSection, PassType, SortType,
};
use lumen::scene::{CameraKey, DirectionalLight, MeshRenderer, ParticleSystem};
use lumen::{Camera, RenderError, RendererSettings, Scene, SceneRenderer, ShaderLibrary};

// ============================================================================
// Fixtures
// ============================================================================

const MAIN: ViewportId = ViewportId(0);
const SIDE: ViewportId = ViewportId(1);

fn shaders() -> ShaderLibrary {
    ShaderLibrary {
        final_composite: ShaderHandle(100),
        bloom: ShaderHandle(101),
        normal_bevel: ShaderHandle(102),
        particle_compute: ShaderHandle(103),
        particle_render: ShaderHandle(104),
        debug_shapes: ShaderHandle(105),
        particle_layout: InputLayoutHandle(100),
        debug_shape_layout: InputLayoutHandle(101),
    }
}

fn renderer(settings: RendererSettings) -> SceneRenderer<RecordingDevice> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut renderer = SceneRenderer::new(RecordingDevice::new(), shaders(), settings);
    renderer.create_viewport(MAIN, wgpu::TextureFormat::Bgra8Unorm);
    renderer.resize_viewport(MAIN, 640, 360);
    renderer.device_mut().clear_commands();
    renderer
}

fn camera(name: &str, viewport: ViewportId) -> Camera {
    Camera::new_perspective(name, 60.0, 0.1, 100.0).with_viewport(viewport)
}

/// One lit cube in front of the default camera.
fn cube_scene(sort_type: SortType) -> (Scene, Assets) {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(
        Mesh::new("Cube", InputLayoutHandle(1))
            .with_bounds(BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5)))
            .with_section(MeshSection::new(0, DrawRange::new(0, 36))),
    );
    let material = assets.materials.add(
        Material::new("Lit", MaterialKind::Lit, sort_type)
            .with_flags(MaterialFlags::INSTANCED)
            .with_pass(PassType::Depth, MaterialPass::new(ShaderHandle(1)))
            .with_pass(PassType::Ambient, MaterialPass::new(ShaderHandle(2))),
    );

    let mut scene = Scene::new();
    scene.add(MeshRenderer::new(
        mesh,
        material,
        Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
    ));
    (scene, assets)
}

fn blits(device: &RecordingDevice) -> Vec<&DeviceCommand> {
    device
        .commands()
        .iter()
        .filter(|c| matches!(c, DeviceCommand::Blit { .. }))
        .collect()
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn camera_without_viewport_is_rejected_before_gpu_work() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(Camera::new_perspective("Detached", 60.0, 0.1, 100.0));

    let result = renderer.render_camera(&scene, &assets, key);
    assert!(matches!(
        result,
        Err(RenderError::MissingViewport { ref camera }) if camera == "Detached"
    ));
    assert!(
        renderer.device().commands().is_empty(),
        "No device call may precede the validation error"
    );
}

#[test]
fn viewport_without_size_is_not_ready() {
    let mut renderer = renderer(RendererSettings::default());
    renderer.create_viewport(SIDE, wgpu::TextureFormat::Bgra8Unorm);
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let unsized_key = scene.add(camera("Unsized", SIDE));
    let unknown_key = scene.add(camera("Unknown", ViewportId(7)));

    for key in [unsized_key, unknown_key] {
        let err = renderer
            .render_camera(&scene, &assets, key)
            .expect_err("camera should be rejected");
        assert!(matches!(err, RenderError::ViewportNotReady { .. }), "got {err}");
        assert!(err.is_camera_error());
    }
    assert!(renderer.device().commands().is_empty());
}

#[test]
fn camera_without_projection_is_rejected() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(Camera::new("Flat").with_viewport(MAIN));

    let err = renderer
        .render_camera(&scene, &assets, key)
        .expect_err("camera should be rejected");
    assert_eq!(
        err.to_string(),
        "Cannot render camera Flat because it has no projection"
    );
    assert!(renderer.device().commands().is_empty());
}

#[test]
fn unknown_camera_key_is_an_error() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Gone", MAIN));
    scene.remove::<Camera>(key);

    assert!(matches!(
        renderer.render_camera(&scene, &assets, key),
        Err(RenderError::UnknownCamera(k)) if k == key
    ));
}

#[test]
fn inactive_camera_renders_nothing() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let mut off = camera("Off", MAIN);
    off.active = false;
    let key = scene.add(off);

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();
    assert!(stats.stages.is_empty());
    assert!(renderer.device().commands().is_empty());

    let summary = renderer.render(&scene, &assets);
    assert!(summary.rendered.is_empty() && summary.skipped.is_empty());
}

#[test]
fn failing_camera_does_not_stop_the_others() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let broken = scene.add(Camera::new_perspective("Broken", 60.0, 0.1, 100.0));
    let main = scene.add(camera("Main", MAIN));

    let summary = renderer.render(&scene, &assets);

    assert_eq!(summary.skipped, vec![broken]);
    let stats = summary.stats(main).expect("main camera should render");
    assert_eq!(stats.visible_entities, 1);
    assert!(renderer.device().draw_call_count() > 0);
    assert!(renderer.try_end_frame().is_ok());
}

// ============================================================================
// Stage Order
// ============================================================================

#[test]
fn stages_run_in_fixed_order() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    scene.add(DirectionalLight::new(Vec3::new(0.0, -1.0, -0.5)).with_shadows());
    let key = scene.add(camera("Main", MAIN));

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();

    assert_eq!(
        stats.stages,
        vec![
            FrameStage::ClearVisibility,
            FrameStage::ShadowDepth,
            FrameStage::DepthPrePass,
            FrameStage::Ambient,
            FrameStage::PostProcess,
            FrameStage::Present,
        ]
    );
    assert!(stats.stages.windows(2).all(|w| w[0] < w[1]));
    assert!(stats.shadow_cascades > 0);
    assert_eq!(stats.contexts[SortType::Opaque.index()], 1);
    assert_eq!(stats.ambient.draw_calls, 1);
    assert_eq!(stats.depth_prepass.draw_calls, 1);
}

#[test]
fn camera_work_is_wrapped_in_a_named_group() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Main", MAIN));

    renderer.render_camera(&scene, &assets, key).unwrap();

    let device = renderer.device();
    let groups = device.debug_groups();
    assert_eq!(groups.first(), Some(&"Main"));
    assert!(groups.contains(&FrameStage::Ambient.name()));
    assert_eq!(
        device.count(|c| matches!(c, DeviceCommand::PushDebugGroup(_))),
        device.count(|c| matches!(c, DeviceCommand::PopDebugGroup)),
        "Debug groups must be balanced"
    );
    assert!(matches!(device.commands().first(), Some(DeviceCommand::InvalidateState)));
}

#[test]
fn disabled_features_skip_their_stages() {
    let settings = RendererSettings {
        shadows: false,
        depth_prepass: false,
        post_processing: false,
        ..RendererSettings::default()
    };
    let mut renderer = renderer(settings);
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    scene.add(DirectionalLight::new(Vec3::NEG_Y).with_shadows());
    let key = scene.add(camera("Main", MAIN));

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();
    assert_eq!(
        stats.stages,
        vec![
            FrameStage::ClearVisibility,
            FrameStage::Ambient,
            FrameStage::Present,
        ]
    );
}

#[test]
fn bucket_sets_run_their_stages() {
    let mut renderer = renderer(RendererSettings::default());
    for (sort_type, stage) in [
        (SortType::Sky, FrameStage::Sky),
        (SortType::Translucent, FrameStage::Translucent),
        (SortType::Overlay, FrameStage::Overlay),
    ] {
        let (mut scene, assets) = cube_scene(sort_type);
        let key = scene.add(camera("Main", MAIN));
        let stats = renderer.render_camera(&scene, &assets, key).unwrap();
        assert!(stats.ran(stage), "{stage:?} should run for {sort_type:?} materials");
        assert_eq!(stats.ambient.draw_calls, 0);
    }
}

#[test]
fn overlay_clears_depth_first() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Overlay);
    let key = scene.add(camera("Main", MAIN));

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();
    assert_eq!(stats.overlay.draw_calls, 1);
    assert!(renderer.device().commands().iter().any(|c| matches!(
        c,
        DeviceCommand::ClearTextureFloat { value, .. } if *value == 1.0
    )));
}

#[test]
fn particles_stage_needs_a_live_system() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Main", MAIN));
    scene.add(ParticleSystem::new(BufferHandle(50), 0));

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();
    assert!(!stats.ran(FrameStage::Particles), "Empty systems are skipped");

    scene.add(ParticleSystem::new(BufferHandle(51), 1000));
    let stats = renderer.render_camera(&scene, &assets, key).unwrap();
    assert!(stats.ran(FrameStage::Particles));
    assert_eq!(stats.particle_systems, 1);
}

// ============================================================================
// Present
// ============================================================================

#[test]
fn without_post_processing_color_is_blitted_to_the_viewport() {
    let settings = RendererSettings {
        post_processing: false,
        ..RendererSettings::default()
    };
    let mut renderer = renderer(settings);
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Main", MAIN));
    let target = renderer.viewport(MAIN).and_then(|v| v.target());

    renderer.render_camera(&scene, &assets, key).unwrap();

    let blits = blits(renderer.device());
    assert_eq!(blits.len(), 1);
    assert!(matches!(blits[0], DeviceCommand::Blit { dst, .. } if *dst == target));
    assert_eq!(
        renderer
            .device()
            .count(|c| matches!(c, DeviceCommand::Dispatch { .. })),
        0
    );
}

#[test]
fn bloom_and_tone_mapping_composite_into_the_viewport() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Main", MAIN));
    let target = renderer.viewport(MAIN).and_then(|v| v.target());

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();

    assert!(stats.bloom && stats.tone_mapped);
    let device = renderer.device();
    assert!(blits(device).is_empty(), "The composite writes the viewport target");
    assert!(device.count(|c| matches!(c, DeviceCommand::Dispatch { .. })) > 0);
    assert!(device.commands().iter().any(|c| matches!(
        c,
        DeviceCommand::BindRenderTargets(targets)
            if targets.colors.first().map(|t| t.texture) == target
    )));
}

#[test]
fn no_bloom_and_no_tone_mapping_falls_back_to_blit() {
    let mut renderer = renderer(RendererSettings::default());
    renderer.bloom_settings_mut().set_enabled(false);
    *renderer.tone_mapping_mut() = lumen::ToneMappingSettings::disabled();
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Main", MAIN));

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();

    assert!(stats.ran(FrameStage::PostProcess));
    assert!(!stats.bloom && !stats.tone_mapped);
    assert_eq!(blits(renderer.device()).len(), 1);
}

#[test]
fn frame_targets_are_released_after_each_camera() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    scene.add(camera("A", MAIN));
    scene.add(camera("B", MAIN));

    let summary = renderer.render(&scene, &assets);
    assert_eq!(summary.rendered.len(), 2);
    assert_eq!(renderer.temporal_targets().in_use_count(), 0);
    assert!(renderer.try_end_frame().is_ok());
}

#[test]
fn cameras_own_their_uniform_blocks() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    scene.add(camera("A", MAIN));
    scene.add(camera("B", MAIN));

    renderer.render(&scene, &assets);
    renderer.render(&scene, &assets);

    let created = renderer.device().count(|c| {
        matches!(c, DeviceCommand::CreateBuffer { label, .. } if label == "BaseVSData")
    });
    assert_eq!(created, 2, "One block per camera, kept across frames");
}

// ============================================================================
// Post-Process Inputs
// ============================================================================

fn created_texture(device: &RecordingDevice, name: &str) -> Option<TextureHandle> {
    device.commands().iter().find_map(|c| match c {
        DeviceCommand::CreateTexture { handle, label, .. } if label == name => Some(*handle),
        _ => None,
    })
}

#[test]
fn beveled_normals_replace_raw_normals_for_lighting() {
    let mut renderer = renderer(RendererSettings::default());
    renderer.normal_bevel_mut().set_enabled(true);
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Main", MAIN));

    renderer.render_camera(&scene, &assets, key).unwrap();

    let device = renderer.device();
    let raw = created_texture(device, "SceneNormals").expect("pre-pass normals");
    let beveled = created_texture(device, "BeveledNormals").expect("bevel output");
    assert_ne!(raw, beveled);

    // The ambient pass is the one binding the shadow map slot
    let ambient = device
        .commands()
        .iter()
        .find_map(|c| match c {
            DeviceCommand::BindShaderResources(r) if r.textures.get("g_ShadowmapTexture").is_some() => {
                Some(r)
            }
            _ => None,
        })
        .expect("ambient resources should be bound");
    let normals = ambient.textures.get("g_NormalTexture").map(|b| b.texture);
    assert_eq!(normals, Some(Some(beveled)));
}

#[test]
fn without_bevel_the_normal_slot_is_null() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Main", MAIN));

    renderer.render_camera(&scene, &assets, key).unwrap();

    let device = renderer.device();
    assert!(created_texture(device, "BeveledNormals").is_none());
    let ambient = device.commands().iter().find_map(|c| match c {
        DeviceCommand::BindShaderResources(r) if r.textures.get("g_ShadowmapTexture").is_some() => {
            Some(r)
        }
        _ => None,
    });
    let normals = ambient.and_then(|r| r.textures.get("g_NormalTexture"));
    assert_eq!(normals.map(|b| b.texture), Some(None));
}

#[test]
fn camera_effects_run_on_the_composited_image() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let mut main = camera("Main", MAIN);
    main.add_effect(Box::new(FullscreenEffect::new("Grain", ShaderHandle(200))));
    let key = scene.add(main);
    let target = renderer.viewport(MAIN).and_then(|v| v.target());

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();
    assert_eq!(stats.post_effects, 1);
    assert!(stats.bloom && stats.tone_mapped);

    let device = renderer.device();
    let composited = created_texture(device, "Composited").expect("composited image");
    assert_eq!(
        device.texture_desc(composited).map(|d| d.format),
        Some(wgpu::TextureFormat::Bgra8Unorm),
        "Effects see the presentable format"
    );

    let position = |shader: ShaderHandle| {
        device
            .commands()
            .iter()
            .position(|c| matches!(c, DeviceCommand::SetShader(s) if *s == shader))
    };
    let composite = position(shaders().final_composite).expect("composite pass");
    let effect = position(ShaderHandle(200)).expect("effect pass");
    assert!(composite < effect, "Effects follow bloom and tone mapping");

    let blits = blits(device);
    assert!(matches!(
        blits.last(),
        Some(DeviceCommand::Blit { src, dst }) if *src == composited && *dst == target
    ));
    assert_eq!(renderer.temporal_targets().in_use_count(), 0);
}

#[test]
fn without_effects_the_composite_writes_the_viewport_directly() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let mut main = camera("Main", MAIN);
    let mut grain = FullscreenEffect::new("Grain", ShaderHandle(200));
    grain.set_enabled(false);
    main.add_effect(Box::new(grain));
    let key = scene.add(main);

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();
    assert_eq!(stats.post_effects, 0);
    assert!(created_texture(renderer.device(), "Composited").is_none());
    assert!(blits(renderer.device()).is_empty());
}

// ============================================================================
// Instance Transforms
// ============================================================================

/// Three non-instanced cubes side by side in front of the default camera.
fn row_of_cubes() -> (Scene, Assets) {
    let mut assets = Assets::new();
    let mesh = assets.meshes.add(
        Mesh::new("Cube", InputLayoutHandle(1))
            .with_bounds(BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5)))
            .with_section(MeshSection::new(0, DrawRange::new(0, 36))),
    );
    let material = assets.materials.add(
        Material::new("Plain", MaterialKind::Lit, SortType::Opaque)
            .with_pass(PassType::Depth, MaterialPass::new(ShaderHandle(1)))
            .with_pass(PassType::Ambient, MaterialPass::new(ShaderHandle(2))),
    );

    let mut scene = Scene::new();
    for x in 0..3 {
        scene.add(MeshRenderer::new(
            mesh,
            material,
            Mat4::from_translation(Vec3::new(x as f32, 0.0, -5.0)),
        ));
    }
    (scene, assets)
}

fn instance_writes(device: &RecordingDevice, blocks: &[BufferHandle]) -> Vec<(BufferHandle, u64)> {
    device
        .commands()
        .iter()
        .filter_map(|c| match c {
            DeviceCommand::WriteBuffer { buffer, offset, .. } if blocks.contains(buffer) => {
                Some((*buffer, *offset))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn objects_of_a_frame_never_share_a_transform_slot() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = row_of_cubes();
    scene.add(camera("A", MAIN));
    scene.add(camera("B", MAIN));

    renderer.render(&scene, &assets);

    let blocks: Vec<BufferHandle> = renderer
        .device()
        .commands()
        .iter()
        .filter_map(|c| match c {
            DeviceCommand::CreateBuffer { handle, label, .. } if label == INSTANCE_BUFFER_NAME => {
                Some(*handle)
            }
            _ => None,
        })
        .collect();
    let mut regions = instance_writes(renderer.device(), &blocks);
    // 3 cubes × (pre-pass + ambient) × 2 cameras
    assert_eq!(regions.len(), 12);
    regions.sort();
    regions.dedup();
    assert_eq!(regions.len(), 12, "Queued writes of one frame must not overlap");

    renderer.end_frame();
    renderer.device_mut().clear_commands();
    renderer.render(&scene, &assets);

    let writes = instance_writes(renderer.device(), &blocks);
    assert_eq!(writes.len(), 12, "Blocks are reused by the next frame");
    assert_eq!(writes[0].1, 0);
    assert_eq!(
        renderer.device().count(
            |c| matches!(c, DeviceCommand::CreateBuffer { label, .. } if label == INSTANCE_BUFFER_NAME)
        ),
        0
    );
}

// ============================================================================
// Debug Camera and Shapes
// ============================================================================

fn with_side_viewport(renderer: &mut SceneRenderer<RecordingDevice>) {
    renderer.create_viewport(SIDE, wgpu::TextureFormat::Bgra8Unorm);
    renderer.resize_viewport(SIDE, 320, 240);
    renderer.device_mut().clear_commands();
}

#[test]
fn debug_shapes_draw_in_their_stage() {
    let mut renderer = renderer(RendererSettings::default());
    renderer
        .debug_shapes_mut()
        .add(DebugShape::line(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0)));
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let key = scene.add(camera("Main", MAIN));

    let stats = renderer.render_camera(&scene, &assets, key).unwrap();
    assert!(stats.ran(FrameStage::DebugShapes));
    assert!(stats.debug_draws > 0);
}

#[test]
fn debug_camera_replaces_the_view_and_hides_debug_shapes() {
    let settings = RendererSettings {
        post_processing: false,
        ..RendererSettings::default()
    };
    let mut renderer = renderer(settings);
    with_side_viewport(&mut renderer);
    renderer
        .debug_shapes_mut()
        .add(DebugShape::line(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0)));

    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let main = scene.add(camera("Main", MAIN));
    let debug: CameraKey = scene.add(camera("Debug", SIDE));
    renderer.set_debug_camera(Some(debug));

    let summary = renderer.render(&scene, &assets);

    assert_eq!(summary.rendered.len(), 1, "The debug camera is not rendered itself");
    let stats = summary.stats(main).expect("main camera should render");
    assert!(!stats.ran(FrameStage::DebugShapes));

    let side_target = renderer.viewport(SIDE).and_then(|v| v.target());
    let blits = blits(renderer.device());
    assert!(matches!(blits[0], DeviceCommand::Blit { dst, .. } if *dst == side_target));
}

#[test]
fn debug_camera_does_not_excuse_an_invalid_camera() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let detached = scene.add(Camera::new_perspective("Detached", 60.0, 0.1, 100.0));
    let flat = scene.add(Camera::new("Flat").with_viewport(MAIN));
    let debug = scene.add(camera("Debug", MAIN));
    renderer.set_debug_camera(Some(debug));

    assert!(matches!(
        renderer.render_camera(&scene, &assets, detached),
        Err(RenderError::MissingViewport { ref camera }) if camera == "Detached"
    ));
    assert!(matches!(
        renderer.render_camera(&scene, &assets, flat),
        Err(RenderError::MissingProjection { ref camera }) if camera == "Flat"
    ));
    assert!(
        renderer.device().commands().is_empty(),
        "No device call may precede the validation error"
    );
}

/// Last value written to the buffer created with `label`.
fn written<T: bytemuck::AnyBitPattern>(device: &RecordingDevice, label: &str) -> T {
    let buffer = device
        .commands()
        .iter()
        .find_map(|c| match c {
            DeviceCommand::CreateBuffer { handle, label: l, .. } if l == label => Some(*handle),
            _ => None,
        })
        .expect("buffer should be created");
    let data = device
        .commands()
        .iter()
        .rev()
        .find_map(|c| match c {
            DeviceCommand::WriteBuffer { buffer: b, data, .. } if *b == buffer => Some(data),
            _ => None,
        })
        .expect("buffer should be written");
    bytemuck::pod_read_unaligned(data)
}

#[test]
fn debug_camera_keeps_culling_and_globals_on_the_rendered_camera() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let main = scene.add(camera("Main", MAIN));
    // Behind the cube, looking away from it
    let debug_camera =
        camera("Debug", MAIN).looking_at(Vec3::new(0.0, 2.0, 3.0), Vec3::new(0.0, 2.0, 10.0), Vec3::Y);
    let debug_view = debug_camera.view_matrix();
    let debug = scene.add(debug_camera);
    renderer.set_debug_camera(Some(debug));

    let stats = renderer.render_camera(&scene, &assets, main).unwrap();
    assert_eq!(stats.visible_entities, 1, "Culling uses the rendered camera's frustum");

    let globals: GlobalData = written(renderer.device(), "GLOB_Data");
    assert!(globals.camera_position.truncate().abs_diff_eq(Vec3::ZERO, 1e-5));
    let matrices: BaseVsData = written(renderer.device(), "BaseVSData");
    assert!(matrices.view.abs_diff_eq(debug_view, 1e-5), "Draws use the debug camera's view");
}

#[test]
fn unusable_debug_camera_is_ignored() {
    let mut renderer = renderer(RendererSettings::default());
    let (mut scene, assets) = cube_scene(SortType::Opaque);
    let main = scene.add(camera("Main", MAIN));
    let debug = scene.add(Camera::new_perspective("NoViewport", 60.0, 0.1, 100.0));
    renderer.set_debug_camera(Some(debug));

    let stats = renderer.render_camera(&scene, &assets, main).unwrap();
    assert_eq!(stats.visible_entities, 1);
}

// ============================================================================
// End of Frame
// ============================================================================

#[test]
#[should_panic(expected = "cannot live outside a frame")]
fn leaked_temporal_target_is_fatal() {
    let mut renderer = renderer(RendererSettings::default());
    let desc = TextureDesc::render_target(16, 16, wgpu::TextureFormat::Rgba16Float);
    let _held = renderer
        .temporal_targets()
        .acquire(&mut RecordingDevice::new(), "Leaked", &desc);

    renderer.end_frame();
}

#[test]
fn try_end_frame_reports_the_leak() {
    let mut renderer = renderer(RendererSettings::default());
    let desc = TextureDesc::render_target(16, 16, wgpu::TextureFormat::Rgba16Float);
    let held = renderer
        .temporal_targets()
        .acquire(&mut RecordingDevice::new(), "Leaked", &desc);

    assert!(matches!(
        renderer.try_end_frame(),
        Err(RenderError::TemporalTargetLeaked { ref name }) if name == "Leaked"
    ));
    held.free();
    assert!(renderer.try_end_frame().is_ok());
}

#[test]
fn debug_shapes_age_at_end_of_frame() {
    let mut renderer = renderer(RendererSettings::default());
    renderer
        .debug_shapes_mut()
        .add(DebugShape::line(Vec3::ZERO, Vec3::X));
    renderer
        .debug_shapes_mut()
        .add(DebugShape::line(Vec3::ZERO, Vec3::Y).with_lifetime(3));

    renderer.end_frame();
    assert_eq!(renderer.debug_shapes_mut().len(), 1);
}
