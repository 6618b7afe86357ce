use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::Rasterizer;
use nalgebra::Vector4;

/// Owns the render target and drives triangles through the pipeline stages.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    /// `samples` is the supersampling factor per axis: 1 for none, 2 for 2x2, etc.
    pub fn new(width: usize, height: usize, samples: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, samples),
        }
    }

    /// Fills color with `color` and depth with the far value.
    pub fn clear(&mut self, color: Vector4<f32>) {
        self.framebuffer.clear(color, f32::INFINITY);
    }

    /// Draws consecutive vertex triples as independent triangles. A trailing
    /// partial triple is ignored.
    pub fn draw_arrays<S: Shader>(&mut self, vertices: &[Vertex], shader: &S) {
        for triangle in vertices.chunks_exact(3) {
            let (p0, v0) = shader.vertex(&triangle[0]);
            let (p1, v1) = shader.vertex(&triangle[1]);
            let (p2, v2) = shader.vertex(&triangle[2]);

            self.rasterizer
                .rasterize_triangle(&self.framebuffer, shader, &[p0, p1, p2], &[v0, v1, v2]);
        }
    }
}
