//! Orbit camera and perspective projection for 3D scenes.
//!
//! Particles live in world space; a [`Canvas`](crate::Canvas) draws in
//! pixels. When a canvas has a camera attached, every disc is projected
//! through it: the center goes through view and projection, and the radius
//! shrinks with distance.

use crate::vector::Vector;
use glam::{Mat4, Vec3, Vec4};

/// Orbit camera for viewing particle simulations.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

/// A world-space point mapped onto the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Pixel coordinates in `x`/`y`, depth in `[0, 1]` in `z`.
    pub position: Vector,
    /// Pixels per world unit at this depth.
    pub scale: f32,
}

impl Camera {
    /// Create a new camera with default positioning.
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: 3.0,
            target: Vec3::ZERO,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 100.0,
        }
    }

    /// A camera orbiting `target` at `distance`, with a far plane that keeps
    /// the whole orbit sphere visible.
    pub fn looking_at(target: impl Into<Vec3>, distance: f32) -> Self {
        Self {
            target: target.into(),
            distance,
            far: distance * 4.0,
            ..Self::new()
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    /// Rotate around the target. Pitch is clamped short of the poles.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        const LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-LIMIT, LIMIT);
    }

    /// Move toward (`factor < 1`) or away from the target.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).min(self.far * 0.5).max(self.near * 2.0);
    }

    /// Project `point` onto a `width` x `height` pixel viewport.
    ///
    /// Returns `None` for points behind the camera or outside the depth
    /// range. Screen `y` grows downward.
    pub fn project(&self, point: Vector, width: u32, height: u32) -> Option<Projected> {
        if width == 0 || height == 0 {
            return None;
        }
        let (w, h) = (width as f32, height as f32);
        let view_proj = self.projection_matrix(w / h) * self.view_matrix();
        let clip = view_proj * Vec4::from((Vec3::from(point), 1.0));

        if clip.w <= self.near {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }

        let focal = h * 0.5 / (self.fov_y * 0.5).tan();
        Some(Projected {
            position: Vector::new((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h, ndc.z),
            scale: focal / clip.w,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
