use nalgebra::{Matrix4, Point2, Point3, UnitQuaternion, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the handful of matrices the viewer needs.
/// Written out by hand so the conventions (right-handed, column vectors,
/// OpenGL-style NDC in [-1, 1]) stay explicit.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Rotation matrix of a unit quaternion.
    pub fn rotation(orientation: &UnitQuaternion<f32>) -> Matrix4<f32> {
        orientation.to_homogeneous()
    }

    /// Orthographic projection, same matrix as `glOrtho`.
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        Matrix4::new(
            2.0 * rl,      0.0,           0.0,          -(right + left) * rl,
            0.0,           2.0 * tb,      0.0,          -(top + bottom) * tb,
            0.0,           0.0,           2.0 * nf,     (far + near) * nf,
            0.0,           0.0,           0.0,          1.0,
        )
    }

    /// Projects geometry from a point light onto a plane.
    ///
    /// With the plane as a 4-vector `pi = (n, -n.p0)` and the light as the
    /// homogeneous point `L`, the matrix is `(pi.L) I - L pi^T`. Every point maps
    /// onto the plane; points level with or above the light get w <= 0 and are
    /// removed by clipping.
    pub fn planar_projection(
        light: &Point3<f32>,
        plane_point: &Point3<f32>,
        plane_normal: &Vector3<f32>,
    ) -> Matrix4<f32> {
        let n = plane_normal.normalize();
        let plane = Vector4::new(n.x, n.y, n.z, -n.dot(&plane_point.coords));
        let l = light.to_homogeneous();
        Matrix4::identity() * plane.dot(&l) - l * plane.transpose()
    }
}

//=================================
// Core Transformation Functions
//=================================

/// Performs perspective division: Clip Space -> NDC.
#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Point3<f32> {
    let w = clip.w;
    if w.abs() > 1e-6 {
        Point3::new(clip.x / w, clip.y / w, clip.z / w)
    } else {
        Point3::origin()
    }
}

/// Converts NDC coordinates to Screen coordinates (Viewport Transform).
/// Note: Y-axis is flipped (NDC +Y is up, Screen +Y is down).
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn project(m: &Matrix4<f32>, p: Point3<f32>) -> Point3<f32> {
        apply_perspective_division(&(m * p.to_homogeneous()))
    }

    #[test]
    fn orthographic_maps_box_to_unit_cube() {
        // Eye looks down -z, so z = +10 is the near plane.
        let m = TransformFactory::orthographic(-2.0, 2.0, -1.0, 1.0, -10.0, 10.0);
        assert_relative_eq!(
            project(&m, Point3::new(2.0, 1.0, -10.0)),
            Point3::new(1.0, 1.0, 1.0),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            project(&m, Point3::new(-2.0, -1.0, 10.0)),
            Point3::new(-1.0, -1.0, -1.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn planar_projection_drops_points_onto_plane() {
        let light = Point3::new(0.0, 4.0, 0.0);
        let m = TransformFactory::planar_projection(
            &light,
            &Point3::new(0.0, -0.5, 0.0),
            &Vector3::y(),
        );

        // Straight below the light.
        assert_relative_eq!(
            project(&m, Point3::new(0.0, 1.0, 0.0)),
            Point3::new(0.0, -0.5, 0.0),
            epsilon = 1e-5
        );

        // Off-axis: the ray from (0,4,0) through (1,2,0) reaches y=-0.5 at x=2.25.
        assert_relative_eq!(
            project(&m, Point3::new(1.0, 2.0, 0.0)),
            Point3::new(2.25, -0.5, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn points_above_the_light_get_negative_w() {
        let m = TransformFactory::planar_projection(
            &Point3::new(0.0, 4.0, 0.0),
            &Point3::new(0.0, -0.5, 0.0),
            &Vector3::y(),
        );
        let clip = m * Point3::new(0.3, 5.0, 0.0).to_homogeneous();
        assert!(clip.w < 0.0);
    }

    #[test]
    fn viewport_flips_y() {
        let top_left = ndc_to_screen(-1.0, 1.0, 100.0, 50.0);
        assert_relative_eq!(top_left, Point2::new(0.0, 0.0));
        let bottom_right = ndc_to_screen(1.0, -1.0, 100.0, 50.0);
        assert_relative_eq!(bottom_right, Point2::new(100.0, 50.0));
    }
}
