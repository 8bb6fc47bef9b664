use crate::world::HexColor;
use glam::Vec3;
use serde::Serialize;

/// Single directional light plus ambient term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Light {
    /// Unit vector pointing towards the light.
    pub direction: Vec3,
    pub color: HexColor,
    pub ambient: HexColor,
}

impl Light {
    pub fn thumbnail() -> Self {
        Self {
            direction: Vec3::new(0.0, 6.0, 4.0).normalize(),
            color: HexColor::new("777777"),
            ambient: HexColor::new("AAAAAA"),
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::thumbnail()
    }
}
