use crate::core::color::{opaque, to_rgba8};
use crate::core::framebuffer::FrameBuffer;
use crate::io::config::Config;
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::mesh::{MeshShader, MeshUniforms};
use crate::pipeline::shaders::shadow::{ShadowPlane, ShadowShader};
use crate::scene::context::RenderContext;
use image::RgbaImage;
use log::debug;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

/// Draws the lit mesh.
pub fn render_mesh_pass(config: &Config, context: &RenderContext, renderer: &mut Renderer) {
    let uniforms = MeshUniforms {
        light: context.flashlight.position(),
        eye: context.camera.eye(),
        wires: config.render.wires,
    };
    let shader = MeshShader::new(
        context.camera.view_matrix(),
        context.camera.projection_matrix(),
        uniforms,
    );
    renderer.draw_arrays(&context.vertices, &shader);
    debug!("Mesh pass: {} triangles", context.vertices.len() / 3);
}

/// Draws the mesh flattened onto the shadow plane.
///
/// Depth testing stays on, so the mesh hides any shadow behind it.
pub fn render_shadow_pass(config: &Config, context: &RenderContext, renderer: &mut Renderer) {
    if !config.shadow.enabled {
        return;
    }

    let plane = ShadowPlane {
        point: Point3::from(config.shadow.plane_point),
        normal: Vector3::from(config.shadow.plane_normal),
    };
    let shader = ShadowShader::new(
        context.camera.view_matrix(),
        context.camera.projection_matrix(),
        &plane,
        &context.flashlight.position(),
        config.shadow.wires,
    );
    renderer.draw_arrays(&context.vertices, &shader);
    debug!("Shadow pass on plane {:?}", plane);
}

/// Clears the target, then draws the mesh and its shadow, in that order.
pub fn render_frame(config: &Config, context: &RenderContext, renderer: &mut Renderer) {
    renderer.clear(opaque(config.render.background));
    render_mesh_pass(config, context, renderer);
    render_shadow_pass(config, context, renderer);
}

/// Resolves the framebuffer and quantizes it to 8-bit RGBA, row by row.
pub fn frame_to_image(framebuffer: &FrameBuffer) -> RgbaImage {
    let width = framebuffer.width;
    let pixels = framebuffer.resolve();

    let mut bytes = vec![0u8; pixels.len() * 4];
    bytes
        .par_chunks_mut(width * 4)
        .zip(pixels.par_chunks(width))
        .for_each(|(row, colors)| {
            for (out, color) in row.chunks_exact_mut(4).zip(colors) {
                out.copy_from_slice(&to_rgba8(color));
            }
        });

    // The buffer length always matches the dimensions.
    RgbaImage::from_raw(width as u32, framebuffer.height as u32, bytes)
        .unwrap_or_else(|| RgbaImage::new(width as u32, framebuffer.height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::shaders::mesh::AMBIENT_COLOR;
    use crate::scene::loader::build_context;
    use crate::scene::mesh::tests::octahedron;
    use nalgebra::Vector4;

    #[test]
    fn background_shows_where_nothing_is_drawn() {
        let mut config = Config::default();
        config.render.width = 32;
        config.render.height = 32;
        config.render.background = [0.2, 0.4, 0.6];
        let context = build_context(&config, octahedron()).unwrap();

        let mut renderer = Renderer::new(32, 32, 1);
        render_frame(&config, &context, &mut renderer);
        let img = frame_to_image(&renderer.framebuffer);

        assert_eq!(img.dimensions(), (32, 32));
        assert_eq!(img.get_pixel(0, 0).0, [51, 102, 153, 255]);
        assert_ne!(img.get_pixel(16, 16).0, [51, 102, 153, 255]);
    }

    #[test]
    fn disabled_shadow_pass_draws_nothing() {
        let mut config = Config::default();
        config.shadow.enabled = false;
        config.view.drags = vec![[256.0, 256.0, 256.0, 356.0]];
        let context = build_context(&config, octahedron()).unwrap();

        let mut renderer = Renderer::new(16, 16, 1);
        renderer.clear(Vector4::new(0.0, 0.0, 0.0, 1.0));
        render_shadow_pass(&config, &context, &mut renderer);

        let shadow = to_rgba8(&(AMBIENT_COLOR * 0.25).push(1.0));
        let img = frame_to_image(&renderer.framebuffer);
        assert!(img.pixels().all(|p| p.0 != shadow));
    }

    #[test]
    fn image_rows_follow_the_framebuffer() {
        let mut fb = FrameBuffer::new(3, 2, 2);
        fb.clear(Vector4::new(1.0, 0.0, 0.0, 1.0), f32::INFINITY);
        for y in 2..4 {
            for x in 4..6 {
                fb.set_pixel_safe(x, y, Vector4::new(0.0, 0.0, 1.0, 1.0));
            }
        }
        let img = frame_to_image(&fb);
        assert_eq!(img.get_pixel(2, 1).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }
}
