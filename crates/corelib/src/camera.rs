use std::f32::consts::FRAC_PI_2;

use crate::{Mat4, Vec3};

/// Radians of yaw/pitch per pixel of mouse motion.
const MOUSE_SENSITIVITY: f32 = 0.002;
/// Keep pitch just short of straight up/down so the view basis never
/// degenerates.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Free-look fly camera (right-handed, +Y up).
///
/// Orientation is yaw/pitch; roll is fixed. Starts at the origin facing −Z.
#[derive(Clone, Copy, Debug)]
pub struct FlyCamera {
    pub eye: Vec3,
    /// Yaw in radians around +Y; −π/2 faces −Z.
    pub yaw: f32,
    /// Pitch in radians, clamped to (−π/2, π/2).
    pub pitch: f32,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl FlyCamera {
    pub fn new(fov_y_rad: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            eye: Vec3::ZERO,
            yaw: -FRAC_PI_2,
            pitch: 0.0,
            fov_y_rad,
            z_near,
            z_far,
            aspect,
        }
    }

    /// Unit view direction from yaw/pitch.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn move_forward(&mut self, amount: f32) {
        self.eye += self.forward() * amount;
    }

    pub fn move_backward(&mut self, amount: f32) {
        self.eye -= self.forward() * amount;
    }

    pub fn move_left(&mut self, amount: f32) {
        self.eye -= self.right() * amount;
    }

    pub fn move_right(&mut self, amount: f32) {
        self.eye += self.right() * amount;
    }

    /// Apply relative mouse motion (pixels) to yaw/pitch.
    pub fn mouse_look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch - dy * MOUSE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.eye + self.forward(), Vec3::Y)
    }

    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }

    #[inline]
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam() -> FlyCamera {
        FlyCamera::new(45f32.to_radians(), 16.0 / 9.0, 0.1, 100.0)
    }

    #[test]
    fn starts_facing_negative_z() {
        let c = cam();
        let f = c.forward();
        assert!((f - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn forward_movement_follows_view_direction() {
        let mut c = cam();
        c.move_forward(2.0);
        assert!((c.eye - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
        c.move_right(1.0);
        assert!((c.eye.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut c = cam();
        c.mouse_look(0.0, -1e6);
        assert!(c.pitch <= PITCH_LIMIT);
        c.mouse_look(0.0, 1e6);
        assert!(c.pitch >= -PITCH_LIMIT);
        // view stays well-formed at the limit
        assert!(c.view().to_cols_array().iter().all(|f| f.is_finite()));
    }
}
