//! Temporal Render Target Cache
//!
//! Pools render-target textures across frames. Passes acquire a target for
//! the duration of a frame, release it (explicitly or by dropping the guard)
//! and the texture goes back to the pool for the next request with the same
//! key.
//!
//! # Design
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              TemporalRenderTargetCache                  │
//! │                                                         │
//! │  slots: SlotMap<SlotKey, Slot>   (Rc<RefCell<..>>)      │
//! │    Slot { key, texture, name, in_use, last_use }        │
//! │                                                         │
//! │  acquire(desc) → TemporalRenderTarget  (guard)          │
//! │  guard.free() / drop(guard)  → slot.in_use = false      │
//! │  end_frame()   → leak check, idle eviction, soft cap    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Rules
//!
//! - A slot is reused only when its key equals the request **and** it is
//!   free. Two targets held at the same time never share a texture.
//! - Acquire, free, acquire with the same key in one frame returns the same
//!   texture.
//! - A slot still in use at [`TemporalRenderTargetCache::end_frame`] is a
//!   resource discipline violation ([`RenderError::TemporalTargetLeaked`]).
//! - Slots idle for longer than the idle threshold are destroyed.

use std::cell::RefCell;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};
#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

use log::{error, info, warn};
use slotmap::{SlotMap, new_key_type};

use crate::errors::{RenderError, Result};
use crate::renderer::device::{RenderDevice, TextureDesc, TextureHandle};

// ─── Internal Types ───────────────────────────────────────────────────────────

new_key_type! {
    struct SlotKey;
}

struct Slot {
    key: TextureDesc,
    texture: TextureHandle,
    name: String,
    in_use: bool,
    last_use: Instant,
}

struct CacheInner {
    slots: SlotMap<SlotKey, Slot>,
}

impl CacheInner {
    fn release(&mut self, slot: SlotKey) {
        if let Some(slot) = self.slots.get_mut(slot) {
            slot.in_use = false;
        }
    }
}

// ─── Guard ────────────────────────────────────────────────────────────────────

/// Frame-scoped handle to a pooled render target.
///
/// Releases its slot when freed or dropped, on every exit path.
pub struct TemporalRenderTarget {
    cache: Rc<RefCell<CacheInner>>,
    slot: SlotKey,
    texture: TextureHandle,
    desc: TextureDesc,
}

impl TemporalRenderTarget {
    #[inline]
    #[must_use]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Returns the target to the pool.
    pub fn free(self) {
        drop(self);
    }
}

impl Drop for TemporalRenderTarget {
    fn drop(&mut self) {
        self.cache.borrow_mut().release(self.slot);
    }
}

impl std::fmt::Debug for TemporalRenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalRenderTarget")
            .field("texture", &self.texture)
            .field("desc", &self.desc)
            .finish_non_exhaustive()
    }
}

// ─── Cache ────────────────────────────────────────────────────────────────────

pub struct TemporalRenderTargetCache {
    inner: Rc<RefCell<CacheInner>>,
    idle_threshold: Duration,
    soft_cap: usize,
}

impl Default for TemporalRenderTargetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalRenderTargetCache {
    pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(10);
    pub const DEFAULT_SOFT_CAP: usize = 50;

    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_IDLE_THRESHOLD, Self::DEFAULT_SOFT_CAP)
    }

    #[must_use]
    pub fn with_limits(idle_threshold: Duration, soft_cap: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CacheInner {
                slots: SlotMap::with_key(),
            })),
            idle_threshold,
            soft_cap,
        }
    }

    /// Acquires a target matching `desc`, reusing a free pooled texture when
    /// one exists.
    pub fn acquire<D: RenderDevice + ?Sized>(
        &self,
        device: &mut D,
        name: &str,
        desc: &TextureDesc,
    ) -> TemporalRenderTarget {
        self.acquire_at(device, name, desc, Instant::now())
    }

    pub fn acquire_at<D: RenderDevice + ?Sized>(
        &self,
        device: &mut D,
        name: &str,
        desc: &TextureDesc,
        now: Instant,
    ) -> TemporalRenderTarget {
        let mut inner = self.inner.borrow_mut();

        let reused = inner
            .slots
            .iter_mut()
            .find(|(_, slot)| !slot.in_use && slot.key == *desc)
            .map(|(key, slot)| {
                slot.in_use = true;
                slot.last_use = now;
                if slot.name != name {
                    slot.name.clear();
                    slot.name.push_str(name);
                }
                (key, slot.texture)
            });

        let (slot, texture) = if let Some(found) = reused {
            found
        } else {
            let texture = device.create_texture(name, desc);
            let key = inner.slots.insert(Slot {
                key: *desc,
                texture,
                name: name.to_owned(),
                in_use: true,
                last_use: now,
            });
            (key, texture)
        };

        TemporalRenderTarget {
            cache: Rc::clone(&self.inner),
            slot,
            texture,
            desc: *desc,
        }
    }

    /// End-of-frame sweep at the current time.
    pub fn end_frame<D: RenderDevice + ?Sized>(&self, device: &mut D) -> Result<()> {
        self.end_frame_at(device, Instant::now())
    }

    /// End-of-frame sweep.
    ///
    /// Fails with [`RenderError::TemporalTargetLeaked`] if any target is
    /// still held; nothing is evicted in that case.
    pub fn end_frame_at<D: RenderDevice + ?Sized>(&self, device: &mut D, now: Instant) -> Result<()> {
        let mut inner = self.inner.borrow_mut();

        if let Some(leaked) = inner.slots.values().find(|slot| slot.in_use) {
            error!(
                "Temporal render target '{}' is still in use at frame end",
                leaked.name
            );
            return Err(RenderError::TemporalTargetLeaked {
                name: leaked.name.clone(),
            });
        }

        let idle_threshold = self.idle_threshold;
        inner.slots.retain(|_, slot| {
            let idle = now.saturating_duration_since(slot.last_use);
            if idle > idle_threshold {
                info!(
                    "Deleting temporal render target '{}' ({}x{} {:?})",
                    slot.name, slot.key.width, slot.key.height, slot.key.format
                );
                device.destroy_texture(slot.texture);
                false
            } else {
                true
            }
        });

        if inner.slots.len() > self.soft_cap {
            warn!(
                "Temporal render target cache holds {} entries (soft cap {})",
                inner.slots.len(),
                self.soft_cap
            );
        }

        Ok(())
    }

    /// Destroys every pooled texture that is not in use.
    pub fn clear<D: RenderDevice + ?Sized>(&self, device: &mut D) {
        self.inner.borrow_mut().slots.retain(|_, slot| {
            if slot.in_use {
                true
            } else {
                device.destroy_texture(slot.texture);
                false
            }
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn in_use_count(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .values()
            .filter(|slot| slot.in_use)
            .count()
    }

    #[must_use]
    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }
}
