use crate::core::geometry::Vertex;
use crate::core::math::transform::TransformFactory;
use crate::core::pipeline::{Fragment, Shader, fwidth, wire_edge};
use crate::pipeline::shaders::mesh::AMBIENT_COLOR;
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Color of wireframe edges inside the shadow.
pub const SHADOW_WIRE_COLOR: Vector3<f32> = Vector3::new(0.5, 0.5, 0.55);
/// Fraction of the ambient color left in the shadow.
pub const SHADOW_DARKNESS: f32 = 0.25;

/// The plane shadows are cast onto, in object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowPlane {
    pub point: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Default for ShadowPlane {
    /// A floor just under a reboxed object.
    fn default() -> Self {
        Self {
            point: Point3::new(0.0, -0.5, 0.0),
            normal: Vector3::y(),
        }
    }
}

/// Flattens the mesh onto a plane as seen from the light and paints it dark.
///
/// Only the barycentric label is carried to the fragment stage.
pub struct ShadowShader {
    /// Projection * model-view * planar projection.
    pub mvp: Matrix4<f32>,
    pub wires: bool,
}

impl ShadowShader {
    pub fn new(
        model_view: Matrix4<f32>,
        projection: Matrix4<f32>,
        plane: &ShadowPlane,
        light: &Point3<f32>,
        wires: bool,
    ) -> Self {
        let flatten = TransformFactory::planar_projection(light, &plane.point, &plane.normal);
        Self {
            mvp: projection * model_view * flatten,
            wires,
        }
    }
}

impl Shader for ShadowShader {
    type Varying = Vector3<f32>;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        (self.mvp * vertex.position.to_homogeneous(), vertex.bary)
    }

    fn fragment(&self, fragment: &Fragment<Self::Varying>) -> Vector4<f32> {
        let width = fwidth(&fragment.ddx, &fragment.ddy);
        shade_shadow(&fragment.varying, &width, self.wires)
    }
}

/// Fragment computation of the shadow pass.
pub fn shade_shadow(bcoord: &Vector3<f32>, width: &Vector3<f32>, wires: bool) -> Vector4<f32> {
    if wires && wire_edge(bcoord, width) {
        SHADOW_WIRE_COLOR.push(1.0)
    } else {
        (AMBIENT_COLOR * SHADOW_DARKNESS).push(1.0)
    }
}
