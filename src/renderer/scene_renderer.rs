//! Scene Renderer
//!
//! Records one frame per active camera. Every camera walks the fixed stage
//! order of [`FrameStage`]; stages with nothing to draw are skipped but the
//! order never changes.
//!
//! ```text
//! ┌─────────────┐   ┌────────┐   ┌──────────┐   ┌─────────┐   ┌──────────────┐
//! │ visibility  │──►│ shadow │──►│ pre-pass │──►│ ambient │──►│ sky/particles│
//! └─────────────┘   └────────┘   └──────────┘   └─────────┘   └──────┬───────┘
//!                                                                    │
//! ┌─────────┐   ┌──────────────────────┐   ┌─────────┐   ┌───────────▼───────┐
//! │ present │◄──│ bloom/tonemap/effects│◄──│ overlay │◄──│ translucent/debug │
//! └─────────┘   └──────────────────────┘   └─────────┘   └───────────────────┘
//! ```
//!
//! Scene color is rendered into a pooled HDR target and composited into the
//! camera's viewport target at the end. A camera that cannot be rendered
//! (no viewport, viewport without a size, no projection) is reported as an
//! error before any GPU work is recorded for it; [`SceneRenderer::render`]
//! logs the error and moves on to the next camera.

use glam::{Vec3, Vec4};
use log::{debug, error, info, trace};
use rustc_hash::FxHashMap;

use crate::assets::Assets;
use crate::errors::{RenderError, Result};
use crate::renderer::debug_shapes::{DebugShapeRenderer, DebugShapes};
use crate::renderer::device::{
    BufferDesc, BufferHandle, InputLayoutHandle, RenderDevice, ShaderHandle, TextureDesc,
    TextureHandle,
};
use crate::renderer::graph::passes::shadow::{find_shadow_caster, light_direction};
use crate::renderer::graph::passes::{
    BloomPass, CompositeInputs, DecalBinder, FinalCompositePass, NormalBevelPass, ParticlePass,
    ShadowPass, run_effect_chain,
};
use crate::renderer::graph::{
    CameraView, FrameStage, PassExecutor, RenderSet, RenderSetBuilder, StageTracker,
    StateOverride, VisibilityCollector,
};
use crate::renderer::settings::RendererSettings;
use crate::renderer::state::{DepthStencilState, DrawCallState, SamplerKind, ViewPort};
use crate::renderer::stats::{FrameStats, FrameSummary};
use crate::renderer::temporal_pool::TemporalRenderTargetCache;
use crate::renderer::viewport::{RenderViewport, ViewportId, ViewportManager};
use crate::renderer::{DEPTH_TEXTURE_FORMAT, HDR_TEXTURE_FORMAT};
use crate::resources::uniforms::{BaseVsData, GlobalData};
use crate::resources::{
    BloomSettings, NormalBevelSettings, PassType, SortType, ToneMappingSettings,
};
use crate::scene::{Camera, CameraKey, ParticleSystem, Scene};

/// Shaders and input layouts of the built-in passes. Material shaders are
/// referenced by the materials themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderLibrary {
    pub final_composite: ShaderHandle,
    pub bloom: ShaderHandle,
    pub normal_bevel: ShaderHandle,
    pub particle_compute: ShaderHandle,
    pub particle_render: ShaderHandle,
    pub debug_shapes: ShaderHandle,
    pub particle_layout: InputLayoutHandle,
    pub debug_shape_layout: InputLayoutHandle,
}

/// Per-camera uniform blocks. Each camera owns its own buffers so queued
/// writes of one camera never overwrite another's.
#[derive(Debug, Clone, Copy)]
struct CameraBuffers {
    base_vs: BufferHandle,
    global: BufferHandle,
}

pub struct SceneRenderer<D: RenderDevice> {
    device: D,
    settings: RendererSettings,
    bloom: BloomSettings,
    tone_mapping: ToneMappingSettings,
    normal_bevel: NormalBevelSettings,

    viewports: ViewportManager,
    temporal: TemporalRenderTargetCache,
    camera_buffers: FxHashMap<CameraKey, CameraBuffers>,
    debug_camera: Option<CameraKey>,

    // === Per-camera scratch ===
    collector: VisibilityCollector,
    builder: RenderSetBuilder,
    opaque_set: RenderSet,
    translucent_set: RenderSet,
    sky_set: RenderSet,
    overlay_set: RenderSet,
    stages: StageTracker,

    // === Passes ===
    executor: PassExecutor,
    shadow_pass: ShadowPass,
    decals: DecalBinder,
    particles: ParticlePass,
    normal_bevel_pass: NormalBevelPass,
    bloom_pass: BloomPass,
    composite: FinalCompositePass,
    debug_renderer: DebugShapeRenderer,
    debug_shapes: DebugShapes,
}

impl<D: RenderDevice> SceneRenderer<D> {
    /// Creates a renderer. Instance capacity and temporal target limits are
    /// read from `settings` once, here.
    #[must_use]
    pub fn new(device: D, shaders: ShaderLibrary, settings: RendererSettings) -> Self {
        let capacity = settings.effective_instance_capacity();
        info!(
            "Scene renderer: instance capacity {capacity}, temporal target idle {:?}",
            settings.temporal_target_idle()
        );

        Self {
            device,
            temporal: TemporalRenderTargetCache::with_limits(
                settings.temporal_target_idle(),
                settings.temporal_target_soft_cap,
            ),
            collector: VisibilityCollector::new(settings.unbounded_mesh_policy),
            settings,
            bloom: BloomSettings::default(),
            tone_mapping: ToneMappingSettings::default(),
            normal_bevel: NormalBevelSettings::default(),
            viewports: ViewportManager::new(),
            camera_buffers: FxHashMap::default(),
            debug_camera: None,
            builder: RenderSetBuilder::new(),
            opaque_set: RenderSet::new(),
            translucent_set: RenderSet::new(),
            sky_set: RenderSet::new(),
            overlay_set: RenderSet::new(),
            stages: StageTracker::new(),
            executor: PassExecutor::new(capacity),
            shadow_pass: ShadowPass::new(),
            decals: DecalBinder::new(),
            particles: ParticlePass::new(
                shaders.particle_compute,
                shaders.particle_render,
                shaders.particle_layout,
            ),
            normal_bevel_pass: NormalBevelPass::new(shaders.normal_bevel),
            bloom_pass: BloomPass::new(shaders.bloom),
            composite: FinalCompositePass::new(shaders.final_composite),
            debug_renderer: DebugShapeRenderer::new(
                shaders.debug_shapes,
                shaders.debug_shape_layout,
            ),
            debug_shapes: DebugShapes::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Pass toggles, culling policy and shadow parameters take effect on
    /// the next camera. Instance capacity and cache limits are fixed at
    /// construction.
    #[inline]
    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    #[inline]
    #[must_use]
    pub fn bloom_settings(&self) -> &BloomSettings {
        &self.bloom
    }

    #[inline]
    pub fn bloom_settings_mut(&mut self) -> &mut BloomSettings {
        &mut self.bloom
    }

    #[inline]
    #[must_use]
    pub fn tone_mapping(&self) -> &ToneMappingSettings {
        &self.tone_mapping
    }

    #[inline]
    pub fn tone_mapping_mut(&mut self) -> &mut ToneMappingSettings {
        &mut self.tone_mapping
    }

    #[inline]
    #[must_use]
    pub fn normal_bevel(&self) -> &NormalBevelSettings {
        &self.normal_bevel
    }

    #[inline]
    pub fn normal_bevel_mut(&mut self) -> &mut NormalBevelSettings {
        &mut self.normal_bevel
    }

    /// Shapes drawn by the next frame(s); see [`DebugShapes::reset`].
    #[inline]
    pub fn debug_shapes_mut(&mut self) -> &mut DebugShapes {
        &mut self.debug_shapes
    }

    #[inline]
    #[must_use]
    pub fn temporal_targets(&self) -> &TemporalRenderTargetCache {
        &self.temporal
    }

    pub fn set_decal_texture(&mut self, atlas: Option<TextureHandle>) {
        self.decals.set_atlas(atlas);
    }

    /// Renders every camera through `camera`'s view and viewport instead of
    /// its own. The debug camera itself is not rendered separately.
    pub fn set_debug_camera(&mut self, camera: Option<CameraKey>) {
        self.debug_camera = camera;
    }

    #[inline]
    #[must_use]
    pub fn debug_camera(&self) -> Option<CameraKey> {
        self.debug_camera
    }

    // ========================================================================
    // Viewports
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn viewports(&self) -> &ViewportManager {
        &self.viewports
    }

    /// Registers a viewport. It has no target until the first resize.
    pub fn create_viewport(&mut self, id: ViewportId, format: wgpu::TextureFormat) {
        self.viewports.create(id, format);
    }

    /// Returns `false` for an unknown viewport.
    pub fn resize_viewport(&mut self, id: ViewportId, width: u32, height: u32) -> bool {
        self.viewports.resize(&mut self.device, id, width, height)
    }

    pub fn remove_viewport(&mut self, id: ViewportId) -> bool {
        self.viewports.remove(&mut self.device, id)
    }

    #[must_use]
    pub fn viewport(&self, id: ViewportId) -> Option<&RenderViewport> {
        self.viewports.get(id)
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Renders every active camera. Cameras that fail validation are logged
    /// and skipped; the others still render.
    pub fn render(&mut self, scene: &Scene, assets: &Assets) -> FrameSummary {
        self.shadow_pass.retain_lights(&mut self.device, scene);

        let mut summary = FrameSummary::default();
        for (key, camera) in scene.components::<Camera>() {
            if !camera.active || self.debug_camera == Some(key) {
                continue;
            }
            match self.render_camera(scene, assets, key) {
                Ok(stats) => summary.rendered.push((key, stats)),
                Err(err) => {
                    error!("{err}");
                    summary.skipped.push(key);
                }
            }
        }
        summary
    }

    /// Validates and renders one camera.
    ///
    /// Returns an error, without recording any GPU work, when the camera has
    /// no viewport, a viewport without a size, or no projection. A debug
    /// camera failing the same checks is ignored. Inactive cameras render
    /// nothing.
    pub fn render_camera(
        &mut self,
        scene: &Scene,
        assets: &Assets,
        key: CameraKey,
    ) -> Result<FrameStats> {
        let camera = scene
            .get::<Camera>(key)
            .ok_or(RenderError::UnknownCamera(key))?;
        if !camera.active {
            trace!("Camera '{}' is inactive", camera.name);
            return Ok(FrameStats::default());
        }

        // ─── Validation ─────────────────────────────────────────────────────

        let mut presentation = presentable_viewport(&self.viewports, camera)?;
        let (Some(projection), Some((near, far))) = (
            camera.projection.matrix(presentation.aspect),
            camera.projection.near_far(),
        ) else {
            return Err(RenderError::MissingProjection {
                camera: camera.name.clone(),
            });
        };

        // Culling, shadows and GLOB_Data stay on the rendered camera; a debug
        // camera only replaces the presented viewport and the draw matrices.
        let debug_view = self
            .debug_camera
            .filter(|debug| *debug != key)
            .and_then(|debug| scene.get::<Camera>(debug))
            .and_then(|debug| {
                let presentation = presentable_viewport(&self.viewports, debug).ok()?;
                let projection = debug.projection.matrix(presentation.aspect)?;
                Some((presentation, projection, debug.view_matrix()))
            });
        let mut draw_matrices = (projection, camera.view_matrix());
        if let Some((debug_presentation, debug_projection, debug_matrix)) = debug_view {
            trace!("Camera '{}' is drawn through the debug camera", camera.name);
            presentation = debug_presentation;
            draw_matrices = (debug_projection, debug_matrix);
        }
        let debug_view = debug_view.is_some();
        let Presentation { target, rect, .. } = presentation;

        let view = CameraView {
            projection,
            view: camera.view_matrix(),
            position: camera.position(),
            forward: camera.forward(),
            near,
            far,
            viewport: rect,
        };

        let mut stats = FrameStats::default();
        let device: &mut dyn RenderDevice = &mut self.device;
        device.invalidate_state();
        device.push_debug_group(&camera.name);
        self.stages.reset();

        let color_desc = TextureDesc::render_target(rect.width, rect.height, HDR_TEXTURE_FORMAT);
        let depth_desc = TextureDesc::render_target(rect.width, rect.height, DEPTH_TEXTURE_FORMAT);
        let color = self.temporal.acquire(device, "SceneColor", &color_desc);
        let depth = self.temporal.acquire(device, "SceneDepth", &depth_desc);
        let prepass = self.settings.depth_prepass;
        let normals = if prepass && self.normal_bevel.enabled {
            Some(self.temporal.acquire(device, "SceneNormals", &color_desc))
        } else {
            None
        };

        // ─── ClearVisibility ────────────────────────────────────────────────

        begin_stage(&mut self.stages, device, FrameStage::ClearVisibility);
        self.collector.set_policy(self.settings.unbounded_mesh_policy);
        self.collector.clear();
        self.builder.clear();
        device.pop_debug_group();

        // ─── ShadowDepth ────────────────────────────────────────────────────

        let mut shadow = None;
        if self.settings.shadows {
            if let Some((light_key, light)) = find_shadow_caster(scene) {
                begin_stage(&mut self.stages, device, FrameStage::ShadowDepth);
                let frame = self.shadow_pass.render(
                    device,
                    &mut self.executor,
                    &mut self.collector,
                    &mut self.builder,
                    &mut self.opaque_set,
                    scene,
                    assets,
                    light_key,
                    light,
                    &view,
                    &self.settings,
                );
                stats.shadow = frame.stats;
                stats.shadow_cascades = frame.cascade_count;
                shadow = Some(frame);
                device.pop_debug_group();
            }
        }

        // Main view visibility and render sets
        self.collector.collect(scene, assets, &view.frustum());
        stats.visible_entities = self.collector.len() as u32;
        stats.culled = self.collector.culled();
        self.builder.sort(self.collector.entities());
        for sort_type in SortType::ALL {
            stats.contexts[sort_type.index()] = self.builder.context_count(sort_type) as u32;
        }
        self.builder
            .fill(&mut self.opaque_set, &[SortType::Opaque, SortType::Transparent]);
        self.builder
            .fill(&mut self.translucent_set, &[SortType::Translucent]);
        self.builder.fill(&mut self.sky_set, &[SortType::Sky]);
        self.builder.fill(&mut self.overlay_set, &[SortType::Overlay]);

        let buffers = *self.camera_buffers.entry(key).or_insert_with(|| CameraBuffers {
            base_vs: device.create_buffer(
                "BaseVSData",
                &BufferDesc::uniform(std::mem::size_of::<BaseVsData>() as u64),
            ),
            global: device.create_buffer(
                "GLOB_Data",
                &BufferDesc::uniform(std::mem::size_of::<GlobalData>() as u64),
            ),
        });
        let base_vs = BaseVsData::new(draw_matrices.0, draw_matrices.1);
        let global = GlobalData::new(view.position, view.forward);
        device.write_buffer(buffers.base_vs, 0, bytemuck::bytes_of(&base_vs));
        device.write_buffer(buffers.global, 0, bytemuck::bytes_of(&global));

        let mut base = DrawCallState::new();
        base.resources.bind_uniform_buffer("BaseVSData", buffers.base_vs);
        base.resources.bind_uniform_buffer("GLOB_Data", buffers.global);
        base.resources
            .set_uniform("LightDir", light_direction(scene).unwrap_or(Vec3::NEG_Y));
        base.targets.bind_target(0, color.texture());
        base.targets.bind_depth_target(depth.texture(), 0, 0);
        base.targets.viewport = rect;

        // ─── DepthPrePass ───────────────────────────────────────────────────

        if prepass {
            begin_stage(&mut self.stages, device, FrameStage::DepthPrePass);
            let mut state = base.clone();
            state.targets.colors.clear();
            if let Some(normals) = &normals {
                state.targets.bind_target(0, normals.texture());
                state.targets.clear_color_target = true;
                state.targets.clear_color = Vec4::ZERO;
            }
            state.targets.clear_depth_target = true;
            device.bind_render_targets(&state.targets);
            device.clear_render_targets(&state.targets);
            stats.depth_prepass = self.executor.render_pass(
                device,
                assets,
                PassType::Depth,
                &mut state,
                &self.opaque_set,
                Some(&StateOverride::new(wgpu::CompareFunction::Less, true)),
            );
            device.pop_debug_group();
        }

        // ─── Ambient ────────────────────────────────────────────────────────

        begin_stage(&mut self.stages, device, FrameStage::Ambient);
        let beveled = match &normals {
            Some(normals) => Some(self.normal_bevel_pass.render(
                device,
                &self.temporal,
                &self.normal_bevel,
                normals.texture(),
                depth.texture(),
                rect,
            )),
            None => None,
        };

        let mut state = base.clone();
        stats.decals = self.decals.bind(device, scene, &mut state.resources);
        match &shadow {
            Some(frame) => {
                state
                    .resources
                    .set_uniform("ShadowmapMatrix", frame.matrix_array());
                state
                    .resources
                    .set_uniform("ShadowSplits", frame.matrices.splits);
                state
                    .resources
                    .bind_texture("g_ShadowmapTexture", frame.texture);
            }
            None => state.resources.bind_null_texture("g_ShadowmapTexture"),
        }
        state
            .resources
            .set_uniform("ShadowCascadeCount", stats.shadow_cascades);
        state
            .resources
            .bind_sampler("g_ShadowmapTexture", SamplerKind::LinearShadowCompare);
        match &beveled {
            Some(target) => state.resources.bind_texture("g_NormalTexture", target.texture()),
            None => state.resources.bind_null_texture("g_NormalTexture"),
        }
        state
            .resources
            .bind_sampler("g_NormalTexture", SamplerKind::ClampClampNearestNearest);

        state.targets.clear_color_target = true;
        state.targets.clear_color = camera.clear_color;
        state.targets.clear_depth_target = !prepass;
        let ambient_depth = if prepass {
            StateOverride::new(wgpu::CompareFunction::Equal, false)
        } else {
            StateOverride::new(wgpu::CompareFunction::Less, true)
        };
        device.bind_render_targets(&state.targets);
        device.clear_render_targets(&state.targets);
        stats.ambient = self.executor.render_pass(
            device,
            assets,
            PassType::Ambient,
            &mut state,
            &self.opaque_set,
            Some(&ambient_depth),
        );
        drop(beveled);
        device.pop_debug_group();

        // ─── Sky ────────────────────────────────────────────────────────────

        if !self.sky_set.is_empty() {
            begin_stage(&mut self.stages, device, FrameStage::Sky);
            let mut state = base.clone();
            device.bind_render_targets(&state.targets);
            stats.sky = self.executor.render_pass(
                device,
                assets,
                PassType::Ambient,
                &mut state,
                &self.sky_set,
                Some(&StateOverride::new(wgpu::CompareFunction::LessEqual, false)),
            );
            device.pop_debug_group();
        }

        // ─── Particles ──────────────────────────────────────────────────────

        let has_particles = scene
            .components::<ParticleSystem>()
            .any(|(_, system)| system.active && system.particle_count > 0);
        if self.settings.particles && has_particles {
            begin_stage(&mut self.stages, device, FrameStage::Particles);
            device.bind_render_targets(&base.targets);
            stats.particle_systems = self.particles.render(device, scene, &base);
            device.pop_debug_group();
        }

        // ─── Translucent ────────────────────────────────────────────────────

        if !self.translucent_set.is_empty() {
            begin_stage(&mut self.stages, device, FrameStage::Translucent);
            let mut state = base.clone();
            device.bind_render_targets(&state.targets);
            stats.translucent = self.executor.render_pass(
                device,
                assets,
                PassType::Ambient,
                &mut state,
                &self.translucent_set,
                Some(&StateOverride::new(wgpu::CompareFunction::Less, true)),
            );
            device.pop_debug_group();
        }

        // ─── DebugShapes ────────────────────────────────────────────────────

        if self.settings.debug_shapes && !debug_view && !self.debug_shapes.is_empty() {
            begin_stage(&mut self.stages, device, FrameStage::DebugShapes);
            device.bind_render_targets(&base.targets);
            stats.debug_draws = self.debug_renderer.render(device, &self.debug_shapes, &base);
            device.pop_debug_group();
        }

        // ─── Overlay ────────────────────────────────────────────────────────

        if !self.overlay_set.is_empty() {
            begin_stage(&mut self.stages, device, FrameStage::Overlay);
            device.clear_texture_float(depth.texture(), 1.0);
            let mut state = base.clone();
            device.bind_render_targets(&state.targets);
            stats.overlay = self.executor.render_pass(
                device,
                assets,
                PassType::Ambient,
                &mut state,
                &self.overlay_set,
                Some(&StateOverride::new(wgpu::CompareFunction::Less, true)),
            );
            device.pop_debug_group();
        }

        // ─── PostProcess ────────────────────────────────────────────────────

        let mut presented = false;
        if self.settings.post_processing {
            begin_stage(&mut self.stages, device, FrameStage::PostProcess);
            let has_effects = camera.effects.iter().any(|effect| effect.can_render());
            // Camera effects run on the composited image, held in a pooled target.
            let composited = if has_effects {
                let desc = TextureDesc::render_target(rect.width, rect.height, presentation.format);
                Some(self.temporal.acquire(device, "Composited", &desc))
            } else {
                None
            };
            let output = composited.as_ref().map_or(target, |rt| rt.texture());

            if self.bloom.enabled || self.tone_mapping.enabled() {
                let bloom = if self.bloom.enabled {
                    Some(self.bloom_pass.render(
                        device,
                        &self.temporal,
                        &self.bloom,
                        color.texture(),
                        rect.width,
                        rect.height,
                    ))
                } else {
                    None
                };
                let inputs = CompositeInputs {
                    color: color.texture(),
                    bloom: bloom.as_ref().map(|target| target.texture()),
                    bloom_settings: &self.bloom,
                    tone_mapping: &self.tone_mapping,
                };
                self.composite.render(device, &inputs, output, rect);

                stats.bloom = bloom.is_some();
                stats.tone_mapped = self.tone_mapping.enabled();
                presented = true;
            } else if let Some(composited) = &composited {
                device.blit(color.texture(), Some(composited.texture()));
            }

            if let Some(composited) = composited {
                stats.post_effects =
                    run_effect_chain(device, &self.temporal, &camera.effects, &composited, rect);
                device.blit(composited.texture(), Some(target));
                composited.free();
                presented = true;
            }
            device.pop_debug_group();
        }

        // ─── Present ────────────────────────────────────────────────────────

        begin_stage(&mut self.stages, device, FrameStage::Present);
        if !presented {
            device.blit(color.texture(), Some(target));
        }
        device.set_depth_stencil_state(&DepthStencilState::default());
        if let Some(normals) = normals {
            normals.free();
        }
        depth.free();
        color.free();
        device.pop_debug_group();

        device.pop_debug_group();
        stats.stages = self.stages.executed().to_vec();
        debug!("Camera '{}': {stats}", camera.name);
        Ok(stats)
    }

    /// Finishes the frame: ages debug shapes, rewinds the instance blocks and
    /// sweeps the temporal target cache. Returns an error if a temporal
    /// target is still held.
    pub fn try_end_frame(&mut self) -> Result<()> {
        self.debug_shapes.reset();
        self.executor.reset();
        self.temporal.end_frame(&mut self.device)
    }

    /// Like [`try_end_frame`](Self::try_end_frame), but a leaked temporal
    /// target is fatal.
    pub fn end_frame(&mut self) {
        if let Err(err) = self.try_end_frame() {
            panic!("{err}");
        }
    }
}

/// Where a camera's frame ends up.
#[derive(Debug, Clone, Copy)]
struct Presentation {
    target: TextureHandle,
    rect: ViewPort,
    aspect: f32,
    format: wgpu::TextureFormat,
}

/// The presentable state of `camera`'s viewport.
fn presentable_viewport(viewports: &ViewportManager, camera: &Camera) -> Result<Presentation> {
    let id = camera.viewport.ok_or_else(|| RenderError::MissingViewport {
        camera: camera.name.clone(),
    })?;
    viewports
        .get(id)
        .filter(|viewport| viewport.initialized())
        .and_then(|viewport| {
            Some(Presentation {
                target: viewport.target()?,
                rect: viewport.rect(),
                aspect: viewport.aspect(),
                format: viewport.format(),
            })
        })
        .ok_or_else(|| RenderError::ViewportNotReady {
            camera: camera.name.clone(),
            viewport: id,
        })
}

fn begin_stage(stages: &mut StageTracker, device: &mut dyn RenderDevice, stage: FrameStage) {
    stages.enter(stage);
    device.push_debug_group(stage.name());
}
