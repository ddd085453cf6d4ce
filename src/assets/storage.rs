use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};

/// Handle-indexed resource container with optional name lookup.
///
/// Single-threaded: the render core reads it by shared reference for the
/// whole frame, the resource manager mutates it between frames.
pub struct AssetStorage<H: Key, T> {
    map: SlotMap<H, T>,
    lookup: FxHashMap<String, H>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: SlotMap::default(),
            lookup: FxHashMap::default(),
        }
    }

    /// Adds a resource and returns its handle.
    pub fn add(&mut self, asset: impl Into<T>) -> H {
        self.map.insert(asset.into())
    }

    /// Adds a resource under `name`; an existing entry with that name wins.
    pub fn add_named(&mut self, name: impl Into<String>, asset: impl Into<T>) -> H {
        let name = name.into();
        if let Some(&handle) = self.lookup.get(&name) {
            return handle;
        }
        let handle = self.map.insert(asset.into());
        self.lookup.insert(name, handle);
        handle
    }

    #[must_use]
    pub fn get(&self, handle: H) -> Option<&T> {
        self.map.get(handle)
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.map.get_mut(handle)
    }

    #[must_use]
    pub fn handle_by_name(&self, name: &str) -> Option<H> {
        self.lookup.get(name).copied()
    }

    pub fn remove(&mut self, handle: H) -> Option<T> {
        self.lookup.retain(|_, h| *h != handle);
        self.map.remove(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.map.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
