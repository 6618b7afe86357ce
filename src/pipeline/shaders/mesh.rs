use crate::core::geometry::Vertex;
use crate::core::pipeline::{Fragment, Interpolatable, Shader, fwidth, wire_edge};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Color of wireframe edges over the shaded surface.
pub const WIRE_COLOR: Vector3<f32> = Vector3::new(0.8, 0.8, 0.3);
/// Ambient scene color.
pub const AMBIENT_COLOR: Vector3<f32> = Vector3::new(0.5, 0.6, 0.55);
/// Color of the point light.
pub const LIGHT_COLOR: Vector3<f32> = Vector3::new(0.75, 0.7, 0.8);
/// Brightness of the highlight.
pub const GLOSS: f32 = 0.5;
/// Sharpness of the highlight.
pub const SHININESS: f32 = 10.0;

/// Per-draw values shared by every invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshUniforms {
    /// Position of the point light.
    pub light: Point3<f32>,
    /// Position of the eye.
    pub eye: Point3<f32>,
    /// Draw triangle edges in `WIRE_COLOR`.
    pub wires: bool,
}

/// Interpolated from the vertex stage to the fragment stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVarying {
    pub normal: Vector3<f32>,
    pub position: Point3<f32>,
    pub material: Vector3<f32>,
    pub bcoord: Vector3<f32>,
}

// nalgebra points don't add, so go through their coordinates.
impl Add for MeshVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            position: Point3::from(self.position.coords + other.position.coords),
            material: self.material + other.material,
            bcoord: self.bcoord + other.bcoord,
        }
    }
}

impl Mul<f32> for MeshVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            position: Point3::from(self.position.coords * scalar),
            material: self.material * scalar,
            bcoord: self.bcoord * scalar,
        }
    }
}

impl Interpolatable for MeshVarying {}

/// Phong-style surface shading with an optional wireframe overlay.
pub struct MeshShader {
    /// Projection * model-view.
    pub mvp: Matrix4<f32>,
    pub uniforms: MeshUniforms,
}

impl MeshShader {
    pub fn new(model_view: Matrix4<f32>, projection: Matrix4<f32>, uniforms: MeshUniforms) -> Self {
        Self {
            mvp: projection * model_view,
            uniforms,
        }
    }
}

impl Shader for MeshShader {
    type Varying = MeshVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let clip = self.mvp * vertex.position.to_homogeneous();
        let varying = MeshVarying {
            normal: vertex.normal,
            position: vertex.position,
            material: vertex.color,
            bcoord: vertex.bary,
        };
        (clip, varying)
    }

    fn fragment(&self, fragment: &Fragment<Self::Varying>) -> Vector4<f32> {
        let width = fwidth(&fragment.ddx.bcoord, &fragment.ddy.bcoord);
        shade_mesh(&fragment.varying, &width, &self.uniforms)
    }
}

/// Fragment computation of the mesh pass.
///
/// `width` is the fwidth of the barycentric coordinate. The normal is used as
/// interpolated, without renormalising. The reflection vector is
/// `-l + 2 (l.n) n`.
pub fn shade_mesh(
    varying: &MeshVarying,
    width: &Vector3<f32>,
    uniforms: &MeshUniforms,
) -> Vector4<f32> {
    if uniforms.wires && wire_edge(&varying.bcoord, width) {
        return WIRE_COLOR.push(1.0);
    }

    let n = varying.normal;
    let material = varying.material;
    let l = (uniforms.light - varying.position).normalize();
    let e = (uniforms.eye - varying.position).normalize();
    let l_dot_n = l.dot(&n);
    let r = -l + n * (2.0 * l_dot_n);

    let ambient = AMBIENT_COLOR.component_mul(&material);
    let diffuse = LIGHT_COLOR.component_mul(&material) * l_dot_n.max(0.0);
    let specular = LIGHT_COLOR * GLOSS * l_dot_n.max(0.0) * e.dot(&r).max(0.0).powf(SHININESS);

    (ambient + diffuse + specular).push(1.0)
}
