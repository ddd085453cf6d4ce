//! Shadow Cascade Math
//!
//! Pure functions behind the shadow depth pass:
//!
//! - cascade split distances (practical split scheme)
//! - world-space corners of a view-frustum slice
//! - texel-snapped orthographic light matrix per cascade
//!
//! Kept free of renderer state so they can be tested in isolation.

use glam::{Mat4, Vec3};

use crate::resources::uniforms::MAX_CASCADES;
use crate::scene::Frustum;

// ============================================================================
// Splits
// ============================================================================

/// Far distance of each cascade (view space), blending a uniform
/// (`lambda = 0`) and a logarithmic (`lambda = 1`) distribution. The last
/// active cascade always ends at `far`; unused entries stay zero.
#[must_use]
pub fn compute_cascade_splits(
    cascade_count: u32,
    near: f32,
    far: f32,
    lambda: f32,
) -> [f32; MAX_CASCADES] {
    let mut splits = [0.0f32; MAX_CASCADES];
    let n = (cascade_count as usize).min(MAX_CASCADES);
    let near = near.max(1e-3);

    for (i, split) in splits.iter_mut().enumerate().take(n) {
        let p = (i + 1) as f32 / n as f32;
        let log_split = near * (far / near).powf(p);
        let uniform_split = near + (far - near) * p;
        *split = lambda * log_split + (1.0 - lambda) * uniform_split;
    }

    if n > 0 {
        splits[n - 1] = far;
    }
    splits
}

// ============================================================================
// Frustum Slice Corners
// ============================================================================

/// World-space corners of the `[slice_near, slice_far]` slice of a camera
/// frustum, near face first (counter-clockwise from bottom-left).
///
/// Works for both perspective and orthographic right-handed projections.
#[must_use]
pub fn compute_frustum_corners_world(
    projection: &Mat4,
    view: &Mat4,
    slice_near: f32,
    slice_far: f32,
) -> [Vec3; 8] {
    let orthographic = (projection.w_axis.w - 1.0).abs() < 1e-6;
    let half_extents = |depth: f32| {
        if orthographic {
            (1.0 / projection.x_axis.x, 1.0 / projection.y_axis.y)
        } else {
            (depth / projection.x_axis.x, depth / projection.y_axis.y)
        }
    };

    let (wn, hn) = half_extents(slice_near);
    let (wf, hf) = half_extents(slice_far);
    let corners_view = [
        Vec3::new(-wn, -hn, -slice_near),
        Vec3::new(wn, -hn, -slice_near),
        Vec3::new(wn, hn, -slice_near),
        Vec3::new(-wn, hn, -slice_near),
        Vec3::new(-wf, -hf, -slice_far),
        Vec3::new(wf, -hf, -slice_far),
        Vec3::new(wf, hf, -slice_far),
        Vec3::new(-wf, hf, -slice_far),
    ];

    let inverse_view = view.inverse();
    corners_view.map(|corner| inverse_view.transform_point3(corner))
}

// ============================================================================
// Cascade Matrix
// ============================================================================

/// Orthographic view-projection for one cascade.
///
/// The light-space bounds of the slice are snapped to the shadow-map texel
/// grid so shadows do not shimmer while the camera moves. Depth is extended
/// towards the light by at least `caster_extension` to keep off-screen
/// casters.
#[must_use]
pub fn build_cascade_vp(
    light_direction: Vec3,
    corners: &[Vec3; 8],
    shadow_map_size: u32,
    caster_extension: f32,
) -> Mat4 {
    let direction = light_direction.try_normalize().unwrap_or(Vec3::NEG_Z);
    let center = corners.iter().copied().sum::<Vec3>() / 8.0;
    let up = if direction.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let light_view = Mat4::look_at_rh(center - direction, center, up);

    let (mut min, mut max) = corners.iter().fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), corner| {
            let p = light_view.transform_point3(*corner);
            (min.min(p), max.max(p))
        },
    );

    // Light looks down -Z: max.z faces the light.
    let depth_range = (max.z - min.z).max(1.0);
    max.z += caster_extension.max(depth_range);
    min.z -= depth_range;

    let texel = shadow_map_size.max(1) as f32;
    for axis in 0..2 {
        let units_per_texel = (max[axis] - min[axis]) / texel;
        if units_per_texel > 0.0 {
            min[axis] = (min[axis] / units_per_texel).floor() * units_per_texel;
            max[axis] = (max[axis] / units_per_texel).ceil() * units_per_texel;
        }
    }

    let projection = Mat4::orthographic_rh(min.x, max.x, min.y, max.y, -max.z, -min.z);
    projection * light_view
}

// ============================================================================
// Cascade Set
// ============================================================================

/// One shadow cascade: the layer it renders into and how it was derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cascade {
    pub layer: u32,
    pub view_projection: Mat4,
    /// Culling volume with the near plane disabled, so casters between the
    /// slice and the light are kept.
    pub frustum: Frustum,
    pub split_far: f32,
}

/// Parameters of [`build_cascades`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    pub count: u32,
    pub lambda: f32,
    pub map_size: u32,
    /// Shadowed distance from the camera; clamped to the camera's far plane.
    pub distance: f32,
}

/// Builds every cascade for a directional light seen from a camera.
#[must_use]
pub fn build_cascades(
    light_direction: Vec3,
    projection: &Mat4,
    view: &Mat4,
    near: f32,
    far: f32,
    params: &CascadeParams,
) -> Vec<Cascade> {
    let count = params.count.clamp(1, MAX_CASCADES as u32);
    let shadow_far = params.distance.min(far).max(near + 1e-3);
    let splits = compute_cascade_splits(count, near, shadow_far, params.lambda);

    let mut previous = near;
    (0..count as usize)
        .map(|index| {
            let corners = compute_frustum_corners_world(projection, view, previous, splits[index]);
            previous = splits[index];
            let view_projection =
                build_cascade_vp(light_direction, &corners, params.map_size, shadow_far);
            Cascade {
                layer: index as u32,
                view_projection,
                frustum: Frustum::from_matrix_shadow_caster(view_projection),
                split_far: splits[index],
            }
        })
        .collect()
}
