use crate::core::geometry::Vertex;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Trait for types that can be linearly interpolated across a triangle's surface.
///
/// Requirements:
/// - Copy: cheaply duplicable values for per-vertex storage and interpolation.
/// - Add + Mul<f32>: support linear combination (a + b * t) used by barycentric interpolation
///   and by the finite differences that build screen-space derivatives.
/// - Send + Sync: safe to use from multiple threads during parallel rasterization.
pub trait Interpolatable:
    Copy + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

impl Interpolatable for Vector3<f32> {}

/// Everything a fragment stage sees for one pixel.
///
/// `ddx` and `ddy` are the partial derivatives of the varying with respect to
/// window x and y, measured per output pixel (coarse forward differences, like
/// the 2x2 quads of a GPU).
#[derive(Debug, Clone, Copy)]
pub struct Fragment<V> {
    pub varying: V,
    pub ddx: V,
    pub ddy: V,
}

#[cfg(test)]
impl<V: Interpolatable> Fragment<V> {
    /// A fragment with zero derivatives (a varying that is constant on screen).
    pub fn flat(varying: V) -> Self {
        Self {
            varying,
            ddx: varying * 0.0,
            ddy: varying * 0.0,
        }
    }
}

/// Shader represents the programmable stages of the pipeline.
///
/// Implementations must be thread-safe (Send + Sync) because shading is invoked
/// concurrently across fragments. Neither stage may keep state between
/// invocations: evaluating a stage twice with the same inputs gives the same bits.
pub trait Shader: Send + Sync {
    /// Per-vertex outputs of the vertex stage, interpolated for each fragment.
    type Varying: Interpolatable;

    /// Vertex stage.
    ///
    /// Returns the homogeneous clip-space position used by clipping and the
    /// perspective divide, together with the varying for this vertex.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Fragment stage.
    ///
    /// Returns the final RGBA color of the fragment (linear, alpha in `w`).
    fn fragment(&self, fragment: &Fragment<Self::Varying>) -> Vector4<f32>;
}

/// Sum of absolute screen-space partial derivatives.
#[inline]
pub fn fwidth(ddx: &Vector3<f32>, ddy: &Vector3<f32>) -> Vector3<f32> {
    ddx.abs() + ddy.abs()
}

/// Wireframe edge test: true when some barycentric component is below half
/// its local rate of change, i.e. within about one pixel of a triangle edge
/// regardless of triangle size or zoom.
#[inline]
pub fn wire_edge(bcoord: &Vector3<f32>, width: &Vector3<f32>) -> bool {
    bcoord.x < width.x * 0.5 || bcoord.y < width.y * 0.5 || bcoord.z < width.z * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fwidth_sums_absolute_derivatives() {
        let w = fwidth(
            &Vector3::new(-0.1, 0.2, 0.0),
            &Vector3::new(0.05, -0.05, -0.3),
        );
        assert_relative_eq!(w, Vector3::new(0.15, 0.25, 0.3), epsilon = 1e-6);
    }

    #[test]
    fn edge_detected_when_component_below_half_width() {
        let width = Vector3::new(0.02, 0.02, 0.02);
        assert!(wire_edge(&Vector3::new(0.0, 0.5, 0.5), &width));
        assert!(wire_edge(&Vector3::new(0.5, 0.495, 0.009), &width));
        assert!(!wire_edge(&Vector3::new(0.34, 0.33, 0.33), &width));
    }

    #[test]
    fn zero_width_never_flags_interior_points() {
        // A strict less-than: exactly on the edge with no derivative is not an edge.
        assert!(!wire_edge(&Vector3::new(0.0, 0.5, 0.5), &Vector3::zeros()));
    }

    #[test]
    fn flat_fragment_has_zero_derivatives() {
        let f = Fragment::flat(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(f.ddx, Vector3::zeros());
        assert_eq!(f.ddy, Vector3::zeros());
    }
}
