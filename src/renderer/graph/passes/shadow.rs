//! Shadow Depth Pass
//!
//! Renders the cascades of the first shadow-casting directional light into
//! a persistent `Depth32Float` array texture, one layer per cascade. Each
//! cascade re-runs visibility with its own culling volume (near plane
//! disabled) and draws the opaque and transparent buckets with the
//! materials' depth pass.
//!
//! ```text
//! for cascade in cascades:
//!   collect(shadow casters, cascade.frustum)
//!   fill(Opaque + Transparent)
//!   BaseVSData[cascade] ← (light projection, identity view)
//!   bind depth layer, clear, render_pass(Depth)
//! ```
//!
//! Shadow maps are created lazily and recreated when the map size or
//! cascade count changes.

use glam::{Mat4, Vec3, Vec4};
use log::info;
use rustc_hash::FxHashMap;

use crate::assets::Assets;
use crate::renderer::DEPTH_TEXTURE_FORMAT;
use crate::renderer::device::{BufferDesc, BufferHandle, RenderDevice, TextureDesc, TextureHandle};
use crate::renderer::graph::CameraView;
use crate::renderer::graph::executor::{PassExecutor, PassStats, StateOverride};
use crate::renderer::graph::render_set::{RenderSet, RenderSetBuilder};
use crate::renderer::graph::shadow_utils::{Cascade, CascadeParams, build_cascades};
use crate::renderer::graph::visibility::{CollectFilter, VisibilityCollector};
use crate::renderer::settings::RendererSettings;
use crate::renderer::state::{DrawCallState, ViewPort};
use crate::resources::uniforms::{BaseVsData, MAX_CASCADES, ShadowMatrices};
use crate::resources::{PassType, SortType};
use crate::scene::{DirectionalLight, DirectionalLightKey, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShadowMap {
    texture: TextureHandle,
    size: u32,
    layers: u32,
}

/// Result of rendering one light's cascades.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowFrame {
    pub texture: TextureHandle,
    pub matrices: ShadowMatrices,
    pub cascade_count: u32,
    pub stats: PassStats,
}

impl ShadowFrame {
    /// Cascade matrices as bound to `ShadowmapMatrix`.
    #[must_use]
    pub fn matrix_array(&self) -> Vec<Mat4> {
        self.matrices.matrices[..self.cascade_count as usize].to_vec()
    }
}

#[derive(Default)]
pub struct ShadowPass {
    maps: FxHashMap<DirectionalLightKey, ShadowMap>,
    cascade_buffers: Vec<BufferHandle>,
}

impl ShadowPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persistent shadow map of `light`, if one was created.
    #[must_use]
    pub fn shadow_map(&self, light: DirectionalLightKey) -> Option<TextureHandle> {
        self.maps.get(&light).map(|map| map.texture)
    }

    fn ensure_map(
        &mut self,
        device: &mut dyn RenderDevice,
        light: DirectionalLightKey,
        size: u32,
        layers: u32,
    ) -> TextureHandle {
        if let Some(map) = self.maps.get(&light) {
            if map.size == size && map.layers == layers {
                return map.texture;
            }
            device.destroy_texture(map.texture);
        }

        info!("Creating {size}x{size} shadow map with {layers} cascades");
        let desc = TextureDesc::render_target(size, size, DEPTH_TEXTURE_FORMAT)
            .with_layers(wgpu::TextureViewDimension::D2Array, layers);
        let texture = device.create_texture("ShadowMap", &desc);
        self.maps.insert(light, ShadowMap { texture, size, layers });
        texture
    }

    fn cascade_buffer(&mut self, device: &mut dyn RenderDevice, index: usize) -> BufferHandle {
        while self.cascade_buffers.len() <= index {
            let size = std::mem::size_of::<BaseVsData>() as u64;
            let buffer = device.create_buffer("ShadowBaseVSData", &BufferDesc::uniform(size));
            self.cascade_buffers.push(buffer);
        }
        self.cascade_buffers[index]
    }

    /// Destroys the maps of lights that no longer cast shadows.
    pub fn retain_lights(&mut self, device: &mut dyn RenderDevice, scene: &Scene) {
        self.maps.retain(|key, map| {
            let keep = scene
                .get::<DirectionalLight>(*key)
                .is_some_and(|light| light.active && light.cast_shadows);
            if !keep {
                device.destroy_texture(map.texture);
            }
            keep
        });
    }

    #[must_use]
    pub fn cascades(
        view: &CameraView,
        light: &DirectionalLight,
        settings: &RendererSettings,
    ) -> Vec<Cascade> {
        let params = CascadeParams {
            count: settings.effective_cascade_count(),
            lambda: settings.effective_cascade_lambda(),
            map_size: settings.shadow_map_size,
            distance: settings.shadow_distance,
        };
        build_cascades(
            light.normalized_direction(),
            &view.projection,
            &view.view,
            view.near,
            view.far,
            &params,
        )
    }

    pub fn render(
        &mut self,
        device: &mut dyn RenderDevice,
        executor: &mut PassExecutor,
        collector: &mut VisibilityCollector,
        builder: &mut RenderSetBuilder,
        render_set: &mut RenderSet,
        scene: &Scene,
        assets: &Assets,
        light_key: DirectionalLightKey,
        light: &DirectionalLight,
        view: &CameraView,
        settings: &RendererSettings,
    ) -> ShadowFrame {
        let cascades = Self::cascades(view, light, settings);
        let size = settings.shadow_map_size.max(1);
        let texture = self.ensure_map(device, light_key, size, cascades.len() as u32);

        let mut matrices = ShadowMatrices {
            matrices: [Mat4::IDENTITY; MAX_CASCADES],
            splits: Vec4::ZERO,
        };
        let mut stats = PassStats::default();
        let depth_only = StateOverride::new(wgpu::CompareFunction::Less, true);

        for cascade in &cascades {
            let layer = cascade.layer as usize;
            matrices.matrices[layer] = cascade.view_projection;
            matrices.splits[layer] = cascade.split_far;

            collector.collect_filtered(
                scene,
                assets,
                &cascade.frustum,
                CollectFilter::ShadowCasters,
            );
            builder.sort(collector.entities());
            builder.fill(render_set, &[SortType::Opaque, SortType::Transparent]);

            let buffer = self.cascade_buffer(device, layer);
            let base = BaseVsData::new(cascade.view_projection, Mat4::IDENTITY);
            device.write_buffer(buffer, 0, bytemuck::bytes_of(&base));

            let mut state = DrawCallState::new();
            state.resources.bind_uniform_buffer("BaseVSData", buffer);
            state.targets.bind_depth_target(texture, cascade.layer, 0);
            state.targets.viewport = ViewPort::from_size(size, size);
            state.targets.clear_depth_target = true;
            state.targets.clear_depth = 1.0;

            device.push_debug_group("ShadowCascade");
            device.bind_render_targets(&state.targets);
            device.clear_render_targets(&state.targets);
            let cascade_stats = executor.render_pass(
                device,
                assets,
                PassType::Depth,
                &mut state,
                render_set,
                Some(&depth_only),
            );
            device.pop_debug_group();
            stats.accumulate(&cascade_stats);
        }

        ShadowFrame {
            texture,
            matrices,
            cascade_count: cascades.len() as u32,
            stats,
        }
    }
}

/// First active shadow-casting directional light, in scene order.
#[must_use]
pub fn find_shadow_caster(scene: &Scene) -> Option<(DirectionalLightKey, &DirectionalLight)> {
    scene
        .components::<DirectionalLight>()
        .find(|(_, light)| light.active && light.cast_shadows)
}

/// Normalized light direction bound as `LightDir`.
#[must_use]
pub fn light_direction(scene: &Scene) -> Option<Vec3> {
    scene
        .components::<DirectionalLight>()
        .find(|(_, light)| light.active)
        .map(|(_, light)| light.normalized_direction())
}
