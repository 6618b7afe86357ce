use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point2, Point3, Unit, UnitQuaternion, Vector2, Vector3};

/// Orientation of the object, driven by mouse drags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trackball {
    pub orientation: UnitQuaternion<f32>,
}

impl Default for Trackball {
    fn default() -> Self {
        Self {
            orientation: UnitQuaternion::identity(),
        }
    }
}

impl Trackball {
    /// Spins the ball for a drag between two points of the trackball plane.
    ///
    /// The axis lies in the screen plane, perpendicular to the drag, and the
    /// angle is `asin` of the drag length (capped at a quarter turn).
    pub fn drag(&mut self, from: Point2<f32>, to: Point2<f32>) {
        let d: Vector2<f32> = to - from;
        let length = d.norm();
        if length < 1e-6 {
            return;
        }
        let axis = Unit::new_normalize(Vector3::new(-d.y, d.x, 0.0));
        let spin = UnitQuaternion::from_axis_angle(&axis, length.min(1.0).asin());
        self.orientation = spin * self.orientation;
    }

    /// Expresses a view-space direction in object space.
    pub fn to_object(&self, direction: &Vector3<f32>) -> Vector3<f32> {
        self.orientation.inverse() * direction
    }

    pub fn model_view(&self) -> Matrix4<f32> {
        TransformFactory::rotation(&self.orientation)
    }

    /// Eye position in object space (the viewer sits on +z).
    pub fn eye(&self) -> Point3<f32> {
        Point3::from(self.to_object(&Vector3::z()))
    }
}

/// Window size plus the trackball: everything that fixes the view.
#[derive(Debug, Clone)]
pub struct Camera {
    pub width: usize,
    pub height: usize,
    pub trackball: Trackball,
}

impl Camera {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            trackball: Trackball::default(),
        }
    }

    /// Orthographic projection keeping a [-1, 1] square visible along the
    /// shorter window side, with a depth range of [-10, 10].
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        if w > h {
            TransformFactory::orthographic(-w / h, w / h, -1.0, 1.0, -10.0, 10.0)
        } else {
            TransformFactory::orthographic(-1.0, 1.0, -h / w, h / w, -10.0, 10.0)
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.trackball.model_view()
    }

    pub fn eye(&self) -> Point3<f32> {
        self.trackball.eye()
    }

    /// Maps a window pixel (y down) to the trackball plane (y up, unit radius
    /// on the shorter side).
    pub fn window_to_plane(&self, x: f32, y: f32) -> Point2<f32> {
        let w = self.width as f32;
        let h = self.height as f32;
        let span = w.min(h).max(1.0);
        Point2::new(2.0 * (x - w / 2.0) / span, 2.0 * (h / 2.0 - y) / span)
    }

    /// Replays a mouse drag given in window pixels.
    pub fn drag_window(&mut self, from: (f32, f32), to: (f32, f32)) {
        let a = self.window_to_plane(from.0, from.1);
        let b = self.window_to_plane(to.0, to.1);
        self.trackball.drag(a, b);
    }
}
