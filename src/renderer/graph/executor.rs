//! Pass Executor
//!
//! Issues the state changes and draws of one pass over a [`RenderSet`],
//! skipping redundant work the same way a tracked render pass does:
//!
//! ```text
//! for context in render_set:
//!   material changed?       → end_pass(previous), begin_pass(next), apply state
//!   (mesh, section) changed → bind_shader_inputs
//!   instanced?              → upload ≤ capacity transforms, one instanced draw per batch
//!   otherwise               → upload one transform, one draw per instance
//! ```
//!
//! Buffer writes are queued until the frame is submitted, so no two batches
//! of a frame share instance storage. Each batch takes the next free region
//! of an `Instances` block and addresses it through `first_instance`; a batch
//! that does not fit moves on to a fresh block. [`PassExecutor::reset`]
//! rewinds the blocks once the frame is done.
//!
//! A section with a single range takes the single-draw path. Sections with
//! several ranges submit every enabled, non-empty range in one multi-draw.
//!
//! [`RenderSet`]: crate::renderer::graph::render_set::RenderSet

use glam::Mat4;
use log::{trace, warn};
use smallvec::SmallVec;

use crate::assets::{Assets, MaterialKey, MeshKey};
use crate::renderer::device::{
    BufferDesc, BufferHandle, DrawArguments, RenderDevice, apply_draw_state,
};
use crate::renderer::graph::render_set::ModelContext;
use crate::renderer::state::{DepthStencilState, DrawCallState};
use crate::resources::{DrawRange, Material, MeshSection, PassType};

/// Binding name of the per-instance transform buffer.
pub const INSTANCE_BUFFER_NAME: &str = "Instances";

/// Default capacity of the instance buffer, in transforms.
pub const MAX_INSTANCES: u32 = 1024;

const MATRIX_SIZE: u64 = std::mem::size_of::<Mat4>() as u64;

/// Per-pass depth state applied on top of each material's own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateOverride {
    pub compare: wgpu::CompareFunction,
    pub depth_write: bool,
}

impl StateOverride {
    #[must_use]
    pub const fn new(compare: wgpu::CompareFunction, depth_write: bool) -> Self {
        Self {
            compare,
            depth_write,
        }
    }

    pub fn apply(&self, state: &mut DepthStencilState) {
        state.depth_enable = true;
        state.compare = self.compare;
        state.depth_write = self.depth_write;
    }
}

/// Counters of one [`PassExecutor::render_pass`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    pub contexts: u32,
    pub draw_calls: u32,
    pub instances: u32,
    pub material_changes: u32,
    pub geometry_changes: u32,
    /// Contexts skipped because the material lacks the pass or an asset is
    /// missing.
    pub skipped: u32,
}

impl PassStats {
    pub fn accumulate(&mut self, other: &PassStats) {
        self.contexts += other.contexts;
        self.draw_calls += other.draw_calls;
        self.instances += other.instances;
        self.material_changes += other.material_changes;
        self.geometry_changes += other.geometry_changes;
        self.skipped += other.skipped;
    }
}

/// Region of an instance block reserved for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceSlot {
    pub buffer: BufferHandle,
    /// First transform of the region; the draw's `first_instance`.
    pub first: u32,
}

impl InstanceSlot {
    #[inline]
    #[must_use]
    pub fn byte_offset(&self) -> u64 {
        u64::from(self.first) * MATRIX_SIZE
    }
}

pub struct PassExecutor {
    /// Blocks of `capacity` transforms each, kept across frames.
    instance_blocks: Vec<BufferHandle>,
    block: usize,
    cursor: u32,
    capacity: u32,
}

impl Default for PassExecutor {
    fn default() -> Self {
        Self::new(MAX_INSTANCES)
    }
}

impl PassExecutor {
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            instance_blocks: Vec::new(),
            block: 0,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of instance blocks created so far.
    #[inline]
    #[must_use]
    pub fn instance_block_count(&self) -> usize {
        self.instance_blocks.len()
    }

    /// Makes every instance block available again. Call once the frame's
    /// writes have been submitted.
    pub fn reset(&mut self) {
        self.block = 0;
        self.cursor = 0;
    }

    /// The block new batches are written to, created on first use.
    fn current_block(&mut self, device: &mut dyn RenderDevice) -> BufferHandle {
        if let Some(&buffer) = self.instance_blocks.get(self.block) {
            return buffer;
        }
        let desc = BufferDesc::uniform(u64::from(self.capacity) * MATRIX_SIZE);
        let buffer = device.create_buffer(INSTANCE_BUFFER_NAME, &desc);
        trace!("Instance block {} created", self.instance_blocks.len());
        self.instance_blocks.push(buffer);
        buffer
    }

    /// Reserves `count` transforms (at most the capacity) for one batch.
    pub fn allocate(&mut self, device: &mut dyn RenderDevice, count: u32) -> InstanceSlot {
        let count = count.min(self.capacity);
        if self.cursor + count > self.capacity {
            self.block += 1;
            self.cursor = 0;
        }
        let buffer = self.current_block(device);
        let first = self.cursor;
        self.cursor += count;
        InstanceSlot { buffer, first }
    }

    /// Uploads `transforms` into a fresh slot and rebinds the instance block
    /// if the slot lives in a different one.
    fn upload(
        &mut self,
        device: &mut dyn RenderDevice,
        state: &mut DrawCallState,
        bound: &mut BufferHandle,
        transforms: &[Mat4],
    ) -> InstanceSlot {
        let slot = self.allocate(device, transforms.len() as u32);
        if slot.buffer != *bound {
            state
                .resources
                .bind_uniform_buffer(INSTANCE_BUFFER_NAME, slot.buffer);
            device.bind_shader_resources(&state.resources);
            *bound = slot.buffer;
        }
        device.write_buffer(slot.buffer, slot.byte_offset(), bytemuck::cast_slice(transforms));
        slot
    }

    /// Draws `contexts` for `pass`.
    ///
    /// `state` carries the pass-level targets and bindings; materials layer
    /// their own resources on top and remove them again when their run ends.
    pub fn render_pass(
        &mut self,
        device: &mut dyn RenderDevice,
        assets: &Assets,
        pass: PassType,
        state: &mut DrawCallState,
        contexts: &[ModelContext],
        overrides: Option<&StateOverride>,
    ) -> PassStats {
        let mut stats = PassStats::default();
        if contexts.is_empty() {
            return stats;
        }

        let mut bound = self.current_block(device);
        state
            .resources
            .bind_uniform_buffer(INSTANCE_BUFFER_NAME, bound);

        let mut last_material: Option<MaterialKey> = None;
        let mut active: Option<&Material> = None;
        let mut last_geometry: Option<(MeshKey, u32)> = None;

        for context in contexts {
            stats.contexts += 1;

            if last_material != Some(context.material) {
                if let Some(previous) = active.take() {
                    previous.end_pass(pass, state);
                }
                last_material = Some(context.material);

                match assets.material(context.material) {
                    Some(material) if material.begin_pass(pass, state) => {
                        if let Some(overrides) = overrides {
                            overrides.apply(&mut state.depth_stencil);
                        }
                        apply_draw_state(device, state);
                        stats.material_changes += 1;
                        active = Some(material);
                    }
                    Some(_) => {}
                    None => warn!("Render set references a missing material {:?}", context.material),
                }
            }

            if active.is_none() {
                stats.skipped += 1;
                continue;
            }

            let Some((mesh, section)) = assets
                .mesh(context.mesh)
                .and_then(|mesh| mesh.section(context.section).map(|s| (mesh, s)))
            else {
                warn!(
                    "Render set references a missing mesh section {:?}/{}",
                    context.mesh, context.section
                );
                stats.skipped += 1;
                continue;
            };

            let geometry = (context.mesh, context.section);
            if last_geometry != Some(geometry) {
                device.bind_shader_inputs(&mesh.shader_inputs(section));
                stats.geometry_changes += 1;
                last_geometry = Some(geometry);
            }
            let indexed = mesh.index_buffers.get(section.buffer_index).is_some();

            let batch_size = if context.instanced {
                self.capacity as usize
            } else {
                1
            };
            for batch in context.instances.chunks(batch_size) {
                let slot = self.upload(device, state, &mut bound, batch);
                let count = batch.len() as u32;
                stats.draw_calls += issue_draws(device, section, indexed, slot.first, count);
                stats.instances += count;
            }
        }

        if let Some(previous) = active {
            previous.end_pass(pass, state);
        }

        trace!(
            "{pass:?} pass: {} contexts, {} draws, {} instances",
            stats.contexts, stats.draw_calls, stats.instances
        );
        stats
    }
}

/// Draws the drawable ranges of `section`; returns the number of draw
/// submissions issued.
fn issue_draws(
    device: &mut dyn RenderDevice,
    section: &MeshSection,
    indexed: bool,
    first_instance: u32,
    instance_count: u32,
) -> u32 {
    let arguments = |range: &DrawRange| DrawArguments {
        first_instance,
        ..range.to_arguments(instance_count)
    };
    let submit = |device: &mut dyn RenderDevice, args: &[DrawArguments]| {
        if indexed {
            device.draw_indexed(args);
        } else {
            device.draw(args);
        }
    };

    if let [range] = section.ranges.as_slice() {
        if !range.is_drawable() {
            return 0;
        }
        submit(device, &[arguments(range)]);
        return 1;
    }

    let args: SmallVec<[DrawArguments; 8]> = section
        .ranges
        .iter()
        .filter(|range| range.is_drawable())
        .map(arguments)
        .collect();
    if args.is_empty() {
        return 0;
    }
    submit(device, &args);
    1
}
