use crate::core::geometry::Vertex;
use crate::scene::camera::Camera;
use crate::scene::light::Flashlight;
use crate::scene::mesh::Mesh;

/// Holds all scene resources required for rendering.
pub struct RenderContext {
    pub camera: Camera,
    pub flashlight: Flashlight,
    /// The (possibly refined) mesh being viewed.
    pub mesh: Mesh,
    /// `mesh` flattened into a triangle list, three vertices per face.
    pub vertices: Vec<Vertex>,
}
