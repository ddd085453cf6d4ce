//! Viewports
//!
//! A viewport owns the presentable target a camera renders into. Cameras
//! reference viewports by [`ViewportId`]; the editor or window layer creates
//! and resizes them.
//!
//! Resizes smaller than [`RESIZE_THRESHOLD`] pixels in both axes are
//! ignored, so dragging a window edge does not recreate the target every
//! frame.

use log::info;
use rustc_hash::FxHashMap;

use crate::renderer::device::{RenderDevice, TextureDesc, TextureHandle};
use crate::renderer::state::ViewPort;

/// Minimum per-axis size change (pixels) that recreates the target.
pub const RESIZE_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u8);

#[derive(Debug, Clone, PartialEq)]
pub struct RenderViewport {
    id: ViewportId,
    rect: ViewPort,
    format: wgpu::TextureFormat,
    target: Option<TextureHandle>,
}

impl RenderViewport {
    #[inline]
    #[must_use]
    pub fn id(&self) -> ViewportId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn rect(&self) -> ViewPort {
        self.rect
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.rect.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.rect.height
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Presentable target, `None` until the first resize.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<TextureHandle> {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.rect.width > 0 && self.rect.height > 0 && self.target.is_some()
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.rect.height == 0 {
            1.0
        } else {
            self.rect.width as f32 / self.rect.height as f32
        }
    }

    fn resize(&mut self, device: &mut dyn RenderDevice, width: u32, height: u32) -> bool {
        if self.rect.width == width && self.rect.height == height {
            return false;
        }

        if self.initialized() {
            let dx = width.abs_diff(self.rect.width);
            let dy = height.abs_diff(self.rect.height);
            if dx < RESIZE_THRESHOLD && dy < RESIZE_THRESHOLD {
                return false;
            }
        }

        info!("Viewport {} resized to {width}x{height}", self.id.0);
        if let Some(old) = self.target.take() {
            device.destroy_texture(old);
        }
        self.rect = ViewPort::from_size(width, height);
        if width > 0 && height > 0 {
            let desc = TextureDesc::render_target(width, height, self.format);
            self.target = Some(device.create_texture(&format!("ViewPort{}", self.id.0), &desc));
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct ViewportManager {
    viewports: FxHashMap<ViewportId, RenderViewport>,
}

impl ViewportManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the viewport, or returns the existing one with that id.
    pub fn create(&mut self, id: ViewportId, format: wgpu::TextureFormat) -> &mut RenderViewport {
        self.viewports.entry(id).or_insert_with(|| RenderViewport {
            id,
            rect: ViewPort::default(),
            format,
            target: None,
        })
    }

    #[must_use]
    pub fn get(&self, id: ViewportId) -> Option<&RenderViewport> {
        self.viewports.get(&id)
    }

    /// Resizes the viewport. Returns `false` for an unknown id; returns
    /// `true` otherwise, whether or not the change passed the threshold.
    pub fn resize(&mut self, device: &mut dyn RenderDevice, id: ViewportId, width: u32, height: u32) -> bool {
        match self.viewports.get_mut(&id) {
            Some(viewport) => {
                viewport.resize(device, width, height);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, device: &mut dyn RenderDevice, id: ViewportId) -> bool {
        match self.viewports.remove(&id) {
            Some(viewport) => {
                if let Some(target) = viewport.target {
                    device.destroy_texture(target);
                }
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderViewport> {
        self.viewports.values()
    }
}
