use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Per-triangle edge-function setup in screen space.
///
/// Screen-space barycentrics are affine in (x, y), so once the gradients are
/// known they can be evaluated at any point, inside the triangle or not. The
/// rasterizer relies on that to evaluate neighbouring pixels for derivatives.
#[derive(Debug, Clone, Copy)]
pub struct TriangleSetup {
    origin: Point2<f32>,
    /// d(beta)/dx, d(beta)/dy
    beta_grad: (f32, f32),
    /// d(gamma)/dx, d(gamma)/dy
    gamma_grad: (f32, f32),
    /// Twice the signed area. Negative for triangles that run counter-clockwise
    /// in NDC, because the viewport flips y.
    area_x2: f32,
}

impl TriangleSetup {
    /// Returns `None` if the triangle is degenerate (area near zero).
    pub fn new(v0: Point2<f32>, v1: Point2<f32>, v2: Point2<f32>) -> Option<Self> {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let area_x2 = e1.x * e2.y - e1.y * e2.x;
        if area_x2.abs() < EPSILON {
            return None;
        }
        let inv = 1.0 / area_x2;

        Some(Self {
            origin: v0,
            beta_grad: (e2.y * inv, -e2.x * inv),
            gamma_grad: (-e1.y * inv, e1.x * inv),
            area_x2,
        })
    }

    /// Barycentric coordinates (alpha, beta, gamma) of `p`, weights of v0, v1, v2.
    #[inline(always)]
    pub fn barycentric(&self, p: Point2<f32>) -> Vector3<f32> {
        let d = p - self.origin;
        let beta = self.beta_grad.0 * d.x + self.beta_grad.1 * d.y;
        let gamma = self.gamma_grad.0 * d.x + self.gamma_grad.1 * d.y;
        Vector3::new(1.0 - beta - gamma, beta, gamma)
    }

    #[inline]
    pub fn signed_area_x2(&self) -> f32 {
        self.area_x2
    }
}

/// Checks if the barycentric coordinates represent a point inside the triangle.
#[inline(always)]
pub fn is_inside_triangle(bary: &Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Turns screen-space barycentrics into perspective-correct weights.
///
/// `inv_w` holds 1/w of the three clip-space corners. The corrected weights are
/// `bary_i * inv_w_i / sum_j(bary_j * inv_w_j)`.
///
/// Returns `None` when the denominator vanishes.
#[inline]
pub fn perspective_correct(bary: &Vector3<f32>, inv_w: &Vector3<f32>) -> Option<Vector3<f32>> {
    let weighted = bary.component_mul(inv_w);
    let sum = weighted.x + weighted.y + weighted.z;
    if sum.abs() < EPSILON {
        return None;
    }
    Some(weighted / sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup() -> TriangleSetup {
        TriangleSetup::new(
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        )
        .unwrap()
    }

    #[test]
    fn corners_get_unit_weights() {
        let t = setup();
        assert_relative_eq!(t.barycentric(Point2::new(0.0, 0.0)), Vector3::x(), epsilon = 1e-6);
        assert_relative_eq!(t.barycentric(Point2::new(4.0, 0.0)), Vector3::y(), epsilon = 1e-6);
        assert_relative_eq!(t.barycentric(Point2::new(0.0, 4.0)), Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn weights_sum_to_one_and_extrapolate_outside() {
        let t = setup();
        let inside = t.barycentric(Point2::new(1.0, 1.0));
        assert_relative_eq!(inside.sum(), 1.0, epsilon = 1e-6);
        assert!(is_inside_triangle(&inside));

        let outside = t.barycentric(Point2::new(5.0, 5.0));
        assert_relative_eq!(outside.sum(), 1.0, epsilon = 1e-6);
        assert!(!is_inside_triangle(&outside));
    }

    #[test]
    fn degenerate_triangle_is_rejected() {
        let t = TriangleSetup::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        );
        assert!(t.is_none());
    }

    #[test]
    fn equal_depths_leave_weights_unchanged() {
        let bary = Vector3::new(0.2, 0.3, 0.5);
        let corrected = perspective_correct(&bary, &Vector3::new(0.5, 0.5, 0.5)).unwrap();
        assert_relative_eq!(corrected, bary, epsilon = 1e-6);
    }

    #[test]
    fn nearer_corner_gains_weight() {
        let bary = Vector3::new(0.5, 0.5, 0.0);
        // Corner 0 is closer (larger 1/w).
        let corrected = perspective_correct(&bary, &Vector3::new(1.0, 0.5, 0.5)).unwrap();
        assert!(corrected.x > corrected.y);
        assert_relative_eq!(corrected.sum(), 1.0, epsilon = 1e-6);
    }
}
