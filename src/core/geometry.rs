use nalgebra::{Point3, Vector3};

/// Barycentric labels given to the three corners of every drawn triangle.
/// Interpolated across the face, each component falls to zero on the edge
/// opposite its corner, which is what the wireframe test looks for.
pub const CORNER_LABELS: [Vector3<f32>; 3] = [
    Vector3::new(1.0, 0.0, 0.0),
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(0.0, 0.0, 1.0),
];

/// Attributes of a single vertex as fed to the vertex stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Location on the surface.
    pub position: Point3<f32>,
    /// Normal direction of the surface at `position`.
    pub normal: Vector3<f32>,
    /// Material color (linear RGB).
    pub color: Vector3<f32>,
    /// Barycentric label of this triangle corner.
    pub bary: Vector3<f32>,
}

impl Vertex {
    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        color: Vector3<f32>,
        bary: Vector3<f32>,
    ) -> Self {
        Self {
            position,
            normal,
            color,
            bary,
        }
    }
}
