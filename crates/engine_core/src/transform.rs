//! Transform component for animated scene bodies.

use glam::{Mat4, Quat, Vec3};

/// Position, orientation and uniform-or-not scale of one scene body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Model matrix for upload to the host scene.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Set an absolute spin about an arbitrary (tilted) axis.
    pub fn set_spin_about(&mut self, axis: Vec3, angle: f32) {
        let axis = axis.normalize_or_zero();
        self.rotation = if axis == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(axis, angle)
        };
    }
}
