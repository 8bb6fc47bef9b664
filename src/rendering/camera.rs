use glam::Vec3;
use serde::Serialize;

/// Perspective camera for thumbnail renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Three-quarter view framing a full avatar.
    pub fn thumbnail() -> Self {
        Self {
            eye: Vec3::new(0.75, 0.85, 2.0),
            center: Vec3::new(0.0, 0.06, 0.0),
            up: Vec3::Y,
            fovy: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::thumbnail()
    }
}
