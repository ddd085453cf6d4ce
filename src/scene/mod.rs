//! Component Arena
//!
//! A minimal scene: one slotmap per component type, queried through typed
//! views. Iteration follows slot order, which is stable for a given
//! insertion/removal history, so visibility collection and batching are
//! deterministic.
//!
//! ```rust,ignore
//! let mut scene = Scene::new();
//! let cam = scene.add(Camera::new_perspective("Main", 60.0, 0.1, 500.0));
//! scene.add(MeshRenderer::new(mesh, material, Mat4::IDENTITY));
//!
//! for (key, renderer) in scene.components::<MeshRenderer>() { /* ... */ }
//! ```

pub mod camera;
pub mod components;

pub use camera::{Camera, Frustum, Projection};
pub use components::{Decal, DirectionalLight, MeshRenderer, ParticleSystem};

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct CameraKey;
    pub struct MeshRendererKey;
    pub struct DirectionalLightKey;
    pub struct ParticleSystemKey;
    pub struct DecalKey;
}

/// A component type stored in its own [`Scene`] arena.
pub trait Component: Sized + 'static {
    type Key: slotmap::Key;

    fn storage(scene: &Scene) -> &SlotMap<Self::Key, Self>;
    fn storage_mut(scene: &mut Scene) -> &mut SlotMap<Self::Key, Self>;
}

macro_rules! impl_component {
    ($($ty:ty => $key:ty, $field:ident;)*) => {
        $(impl Component for $ty {
            type Key = $key;

            #[inline]
            fn storage(scene: &Scene) -> &SlotMap<Self::Key, Self> {
                &scene.$field
            }

            #[inline]
            fn storage_mut(scene: &mut Scene) -> &mut SlotMap<Self::Key, Self> {
                &mut scene.$field
            }
        })*
    };
}

#[derive(Default)]
pub struct Scene {
    cameras: SlotMap<CameraKey, Camera>,
    mesh_renderers: SlotMap<MeshRendererKey, MeshRenderer>,
    directional_lights: SlotMap<DirectionalLightKey, DirectionalLight>,
    particle_systems: SlotMap<ParticleSystemKey, ParticleSystem>,
    decals: SlotMap<DecalKey, Decal>,
}

impl_component! {
    Camera => CameraKey, cameras;
    MeshRenderer => MeshRendererKey, mesh_renderers;
    DirectionalLight => DirectionalLightKey, directional_lights;
    ParticleSystem => ParticleSystemKey, particle_systems;
    Decal => DecalKey, decals;
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T: Component>(&mut self, component: T) -> T::Key {
        T::storage_mut(self).insert(component)
    }

    #[must_use]
    pub fn get<T: Component>(&self, key: T::Key) -> Option<&T> {
        T::storage(self).get(key)
    }

    pub fn get_mut<T: Component>(&mut self, key: T::Key) -> Option<&mut T> {
        T::storage_mut(self).get_mut(key)
    }

    pub fn remove<T: Component>(&mut self, key: T::Key) -> Option<T> {
        T::storage_mut(self).remove(key)
    }

    /// Typed view over every component of type `T`, in slot order.
    pub fn components<T: Component>(&self) -> impl Iterator<Item = (T::Key, &T)> {
        T::storage(self).iter()
    }

    pub fn components_mut<T: Component>(&mut self) -> impl Iterator<Item = (T::Key, &mut T)> {
        T::storage_mut(self).iter_mut()
    }

    #[must_use]
    pub fn count<T: Component>(&self) -> usize {
        T::storage(self).len()
    }
}
