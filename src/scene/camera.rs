use glam::{Mat4, Vec3, Vec4};

use crate::renderer::graph::passes::post_effects::PostProcessEffect;
use crate::renderer::viewport::ViewportId;
use crate::resources::geometry::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Projection {
    /// The camera cannot be rendered.
    #[default]
    None,
    /// Right-handed perspective, depth in `[0, 1]`. `fov_y` in radians.
    Perspective { fov_y: f32, near: f32, far: f32 },
    /// Right-handed orthographic with a fixed vertical extent.
    Orthographic { height: f32, near: f32, far: f32 },
}

impl Projection {
    #[must_use]
    pub fn near_far(&self) -> Option<(f32, f32)> {
        match *self {
            Self::None => None,
            Self::Perspective { near, far, .. } | Self::Orthographic { near, far, .. } => {
                Some((near, far))
            }
        }
    }

    /// Projection matrix for a target of the given aspect ratio.
    #[must_use]
    pub fn matrix(&self, aspect: f32) -> Option<Mat4> {
        match *self {
            Self::None => None,
            Self::Perspective { fov_y, near, far } => {
                Some(Mat4::perspective_rh(fov_y, aspect, near, far))
            }
            Self::Orthographic { height, near, far } => {
                let half_h = height * 0.5;
                let half_w = half_h * aspect;
                Some(Mat4::orthographic_rh(
                    -half_w, half_w, -half_h, half_h, near, far,
                ))
            }
        }
    }
}

pub struct Camera {
    pub name: String,
    pub active: bool,
    pub projection: Projection,
    pub viewport: Option<ViewportId>,
    /// Camera-to-world transform. The camera looks down its local -Z.
    pub world_transform: Mat4,
    pub clear_color: Vec4,
    /// Ordered effects run after the built-in post-process chain.
    pub effects: Vec<Box<dyn PostProcessEffect>>,
}

impl Camera {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            projection: Projection::None,
            viewport: None,
            world_transform: Mat4::IDENTITY,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            effects: Vec::new(),
        }
    }

    /// Perspective camera; `fov_y_degrees` is the vertical field of view.
    #[must_use]
    pub fn new_perspective(name: impl Into<String>, fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Perspective {
                fov_y: fov_y_degrees.to_radians(),
                near,
                far,
            },
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: ViewportId) -> Self {
        self.viewport = Some(viewport);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, world_transform: Mat4) -> Self {
        self.world_transform = world_transform;
        self
    }

    #[must_use]
    pub fn looking_at(mut self, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        self.world_transform = Mat4::look_at_rh(eye, target, up).inverse();
        self
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.world_transform.inverse()
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world_transform.w_axis.truncate()
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (-self.world_transform.z_axis.truncate()).normalize_or_zero()
    }

    /// Projection-view matrix, `None` without a projection.
    #[must_use]
    pub fn projection_view(&self, aspect: f32) -> Option<Mat4> {
        Some(self.projection.matrix(aspect)? * self.view_matrix())
    }

    #[must_use]
    pub fn frustum(&self, aspect: f32) -> Option<Frustum> {
        self.projection_view(aspect).map(Frustum::from_matrix)
    }

    pub fn add_effect(&mut self, effect: Box<dyn PostProcessEffect>) {
        self.effects.push(effect);
    }
}

impl std::fmt::Debug for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("projection", &self.projection)
            .field("viewport", &self.viewport)
            .field("effects", &self.effects.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Frustum
// ============================================================================

/// Six normalized planes `(n, d)` with `n · p + d >= 0` inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    /// Gribb-Hartmann extraction for a `[0, 1]` depth range projection.
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0], // Left
            rows[3] - rows[0], // Right
            rows[3] + rows[1], // Bottom
            rows[3] - rows[1], // Top
            rows[2],           // Near
            rows[3] - rows[2], // Far
        ];

        for plane in &mut planes {
            let length = plane.truncate().length();
            if length > 0.0 {
                *plane /= length;
            }
        }

        Self { planes }
    }

    /// Like [`from_matrix`](Self::from_matrix) with the near plane disabled,
    /// so casters between the light and the cascade are kept.
    #[must_use]
    pub fn from_matrix_shadow_caster(m: Mat4) -> Self {
        let mut frustum = Self::from_matrix(m);
        frustum.planes[4] = Vec4::new(0.0, 0.0, 0.0, 1.0);
        frustum
    }

    #[must_use]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            let dist = plane.truncate().dot(center) + plane.w;
            if dist < -radius {
                return false;
            }
        }
        true
    }

    /// Conservative AABB test: a box is rejected only when it lies entirely
    /// behind one plane.
    #[must_use]
    pub fn intersects_box(&self, min: Vec3, max: Vec3) -> bool {
        for plane in &self.planes {
            let normal = plane.truncate();
            // Corner furthest along the plane normal.
            let p = Vec3::new(
                if normal.x >= 0.0 { max.x } else { min.x },
                if normal.y >= 0.0 { max.y } else { min.y },
                if normal.z >= 0.0 { max.z } else { min.z },
            );
            if normal.dot(p) + plane.w < 0.0 {
                return false;
            }
        }
        true
    }

    #[inline]
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &BoundingBox) -> bool {
        self.intersects_box(aabb.min, aabb.max)
    }
}
