use crate::scene::camera::Trackball;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use std::f32::consts::PI;

/// Distance of the light from the origin.
pub const LIGHT_DISTANCE: f32 = 4.0;

/// Rotation applied per arrow press.
pub const NUDGE_ANGLE: f32 = PI / 12.0;

/// Arrow keys that steer the flashlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

impl Arrow {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!(
                "Unknown arrow '{}' (expected up, down, left or right)",
                other
            )),
        }
    }
}

/// A point light circling the object at a fixed distance.
///
/// It starts straight above (+y) and is rotated about axes that follow the
/// current trackball orientation, so "left" always means left on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flashlight {
    pub orientation: UnitQuaternion<f32>,
}

impl Default for Flashlight {
    fn default() -> Self {
        Self {
            orientation: UnitQuaternion::identity(),
        }
    }
}

impl Flashlight {
    pub fn nudge(&mut self, arrow: Arrow, trackball: &Trackball) {
        let axis = match arrow {
            Arrow::Up | Arrow::Down => trackball.to_object(&Vector3::x()),
            Arrow::Left | Arrow::Right => trackball.to_object(&Vector3::y()),
        };
        let angle = match arrow {
            Arrow::Left | Arrow::Down => -NUDGE_ANGLE,
            Arrow::Right | Arrow::Up => NUDGE_ANGLE,
        };
        let spin = UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), angle);
        self.orientation = spin * self.orientation;
    }

    /// Light position in object space.
    pub fn position(&self) -> Point3<f32> {
        Point3::from(self.orientation * Vector3::y() * LIGHT_DISTANCE)
    }
}
