//! Recording Device
//!
//! A [`RenderDevice`] that executes nothing and records every call as a
//! [`DeviceCommand`]. Used by tests and tooling to inspect exactly what a
//! frame submits.

use glam::UVec3;
use rustc_hash::FxHashMap;

use super::{
    BufferDesc, BufferHandle, DrawArguments, RenderDevice, ShaderHandle, ShaderInputs,
    TextureDesc, TextureHandle,
};
use crate::renderer::state::{
    DepthStencilState, DispatchState, RasterState, RenderTargets, ShaderResources,
};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateTexture {
        handle: TextureHandle,
        label: String,
        desc: TextureDesc,
    },
    DestroyTexture(TextureHandle),
    CreateBuffer {
        handle: BufferHandle,
        label: String,
        desc: BufferDesc,
    },
    WriteBuffer {
        buffer: BufferHandle,
        offset: u64,
        data: Vec<u8>,
    },
    WriteTexture {
        texture: TextureHandle,
        mip: u32,
        layer: u32,
        len: usize,
    },
    SetShader(ShaderHandle),
    BindShaderResources(ShaderResources),
    BindShaderInputs(ShaderInputs),
    SetRasterState(RasterState),
    SetDepthStencilState(DepthStencilState),
    BindRenderTargets(RenderTargets),
    ClearRenderTargets(RenderTargets),
    ClearTextureFloat {
        texture: TextureHandle,
        value: f32,
    },
    Draw(Vec<DrawArguments>),
    DrawIndexed(Vec<DrawArguments>),
    Dispatch {
        state: DispatchState,
        groups: UVec3,
    },
    GenerateMipmaps(TextureHandle),
    Blit {
        src: TextureHandle,
        dst: Option<TextureHandle>,
    },
    InvalidateState,
    PushDebugGroup(String),
    PopDebugGroup,
}

impl DeviceCommand {
    /// `true` for commands that submit GPU work (draws, dispatches, blits, clears).
    #[must_use]
    pub fn is_submission(&self) -> bool {
        matches!(
            self,
            Self::Draw(_)
                | Self::DrawIndexed(_)
                | Self::Dispatch { .. }
                | Self::Blit { .. }
                | Self::ClearRenderTargets(_)
                | Self::ClearTextureFloat { .. }
        )
    }
}

/// Device that records commands instead of executing them.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    next_handle: u64,
    live_textures: FxHashMap<TextureHandle, TextureDesc>,
}

impl RecordingDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Drains the command log, keeping resource bookkeeping.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    /// Number of draw submissions (a multi-draw counts once).
    #[must_use]
    pub fn draw_call_count(&self) -> usize {
        self.count(|c| matches!(c, DeviceCommand::Draw(_) | DeviceCommand::DrawIndexed(_)))
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.count(DeviceCommand::is_submission)
    }

    #[must_use]
    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    #[must_use]
    pub fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.live_textures.get(&texture)
    }

    /// Debug group labels in submission order.
    #[must_use]
    pub fn debug_groups(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::PushDebugGroup(label) => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    fn issue(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderDevice for RecordingDevice {
    fn create_texture(&mut self, label: &str, desc: &TextureDesc) -> TextureHandle {
        let handle = TextureHandle(self.issue());
        self.live_textures.insert(handle, *desc);
        self.commands.push(DeviceCommand::CreateTexture {
            handle,
            label: label.to_owned(),
            desc: *desc,
        });
        handle
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.live_textures.remove(&texture);
        self.commands.push(DeviceCommand::DestroyTexture(texture));
    }

    fn create_buffer(&mut self, label: &str, desc: &BufferDesc) -> BufferHandle {
        let handle = BufferHandle(self.issue());
        self.commands.push(DeviceCommand::CreateBuffer {
            handle,
            label: label.to_owned(),
            desc: *desc,
        });
        handle
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        self.commands.push(DeviceCommand::WriteBuffer {
            buffer,
            offset,
            data: data.to_vec(),
        });
    }

    fn write_texture(&mut self, texture: TextureHandle, mip: u32, layer: u32, data: &[u8]) {
        self.commands.push(DeviceCommand::WriteTexture {
            texture,
            mip,
            layer,
            len: data.len(),
        });
    }

    fn set_shader(&mut self, shader: ShaderHandle) {
        self.commands.push(DeviceCommand::SetShader(shader));
    }

    fn bind_shader_resources(&mut self, resources: &ShaderResources) {
        self.commands
            .push(DeviceCommand::BindShaderResources(resources.clone()));
    }

    fn bind_shader_inputs(&mut self, inputs: &ShaderInputs) {
        self.commands
            .push(DeviceCommand::BindShaderInputs(inputs.clone()));
    }

    fn set_raster_state(&mut self, state: &RasterState) {
        self.commands.push(DeviceCommand::SetRasterState(*state));
    }

    fn set_depth_stencil_state(&mut self, state: &DepthStencilState) {
        self.commands.push(DeviceCommand::SetDepthStencilState(*state));
    }

    fn bind_render_targets(&mut self, targets: &RenderTargets) {
        self.commands
            .push(DeviceCommand::BindRenderTargets(targets.clone()));
    }

    fn clear_render_targets(&mut self, targets: &RenderTargets) {
        self.commands
            .push(DeviceCommand::ClearRenderTargets(targets.clone()));
    }

    fn clear_texture_float(&mut self, texture: TextureHandle, value: f32) {
        self.commands
            .push(DeviceCommand::ClearTextureFloat { texture, value });
    }

    fn draw(&mut self, args: &[DrawArguments]) {
        self.commands.push(DeviceCommand::Draw(args.to_vec()));
    }

    fn draw_indexed(&mut self, args: &[DrawArguments]) {
        self.commands.push(DeviceCommand::DrawIndexed(args.to_vec()));
    }

    fn dispatch(&mut self, state: &DispatchState, groups: UVec3) {
        self.commands.push(DeviceCommand::Dispatch {
            state: state.clone(),
            groups,
        });
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) {
        self.commands.push(DeviceCommand::GenerateMipmaps(texture));
    }

    fn blit(&mut self, src: TextureHandle, dst: Option<TextureHandle>) {
        self.commands.push(DeviceCommand::Blit { src, dst });
    }

    fn invalidate_state(&mut self) {
        self.commands.push(DeviceCommand::InvalidateState);
    }

    fn push_debug_group(&mut self, label: &str) {
        self.commands
            .push(DeviceCommand::PushDebugGroup(label.to_owned()));
    }

    fn pop_debug_group(&mut self) {
        self.commands.push(DeviceCommand::PopDebugGroup);
    }
}
