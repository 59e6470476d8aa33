//! Pointer-to-world projection
//!
//! Only what the simulation needs from a camera: turning a screen position
//! into a world ray. Right-handed, y-up.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use serde::{Deserialize, Serialize};

use super::query::Ray;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub near: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 20.0, 20.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            near: 0.1,
        }
    }
}

impl Camera {
    pub fn look_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            ..Default::default()
        }
    }

    fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_infinite_rh(self.fov_y, aspect, self.near);
        proj * view
    }

    /// Ray from the eye through a screen point
    ///
    /// `screen` is in pixels with the origin at the top-left corner and y
    /// pointing down; `viewport` is the viewport size in pixels.
    pub fn screen_point_to_ray(&self, screen: Vec2, viewport: Vec2) -> Ray {
        let viewport = viewport.max(Vec2::ONE);
        let ndc = Vec2::new(
            screen.x / viewport.x * 2.0 - 1.0,
            1.0 - screen.y / viewport.y * 2.0,
        );
        let inv = self.view_projection(viewport.x / viewport.y).inverse();
        // Depth 0 is the near plane; the far plane is at infinity.
        let near = inv * ndc.extend(0.0).extend(1.0);
        let near = near.xyz() / near.w;
        Ray::new(self.eye, near - self.eye)
    }
}
