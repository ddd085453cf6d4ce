//! GPU Particles
//!
//! Each active particle system owns a storage buffer of positions. The pass
//! runs the simulation compute shader over it, then draws the same buffer
//! as a point list.

use glam::UVec3;
use smallvec::smallvec;

use crate::renderer::device::{
    DrawArguments, InputLayoutHandle, RenderDevice, ShaderHandle, ShaderInputs, apply_draw_state,
};
use crate::renderer::state::{DispatchState, DrawCallState};
use crate::scene::{ParticleSystem, Scene};

/// Threads per particle compute group.
pub const PARTICLE_GROUP_SIZE: u32 = 128;

/// Groups dispatched for `count` particles.
#[inline]
#[must_use]
pub fn particle_groups(count: u32) -> u32 {
    count / PARTICLE_GROUP_SIZE + 1
}

pub struct ParticlePass {
    compute_shader: ShaderHandle,
    render_shader: ShaderHandle,
    input_layout: InputLayoutHandle,
}

impl ParticlePass {
    #[must_use]
    pub fn new(
        compute_shader: ShaderHandle,
        render_shader: ShaderHandle,
        input_layout: InputLayoutHandle,
    ) -> Self {
        Self {
            compute_shader,
            render_shader,
            input_layout,
        }
    }

    /// Simulates and draws every active system. `base` carries the targets
    /// and camera bindings. Returns the number of systems drawn.
    pub fn render(
        &self,
        device: &mut dyn RenderDevice,
        scene: &Scene,
        base: &DrawCallState,
    ) -> u32 {
        let mut drawn = 0;

        for (_, system) in scene.components::<ParticleSystem>() {
            if !system.active || system.particle_count == 0 {
                continue;
            }

            let mut dispatch = DispatchState::new(self.compute_shader);
            dispatch
                .resources
                .bind_storage_buffer("Pos", system.position_buffer);
            dispatch
                .resources
                .set_uniform("ParticleCount", system.particle_count);
            device.dispatch(&dispatch, UVec3::new(particle_groups(system.particle_count), 1, 1));

            let mut state = base.clone();
            state.shader = Some(self.render_shader);
            state.raster.cull_mode = None;
            state.depth_stencil.depth_write = false;
            state
                .resources
                .set_uniform("ParticleCount", system.particle_count);
            apply_draw_state(device, &state);
            device.bind_shader_inputs(&ShaderInputs {
                topology: wgpu::PrimitiveTopology::PointList,
                layout: self.input_layout,
                index_buffer: None,
                vertex_buffers: smallvec![system.position_buffer],
            });
            device.draw(&[DrawArguments::vertices(system.particle_count)]);
            drawn += 1;
        }

        drawn
    }
}
