use crate::core::rasterizer::CullMode;
use crate::io::config::Config;
use crate::io::image::save_image;
use crate::pipeline::passes::{frame_to_image, render_frame};
use crate::pipeline::renderer::Renderer;
use crate::scene::loader::init_scene;
use log::info;
use std::time::Instant;

/// Loads the mesh, renders a single frame and writes it to the configured output.
pub fn run(config: &Config) -> Result<(), String> {
    config.validate()?;
    let context = init_scene(config)?;
    let start_time = Instant::now();

    let mut renderer = Renderer::new(
        config.render.width,
        config.render.height,
        config.render.samples,
    );
    renderer
        .rasterizer
        .set_cull_mode(CullMode::from_name(&config.render.cull_mode)?);

    render_frame(config, &context, &mut renderer);
    info!("Render completed in {:.2?}", start_time.elapsed());

    info!("Saving output to '{}'...", config.render.output);
    let image = frame_to_image(&renderer.framebuffer);
    save_image(&image, &config.render.output)?;
    info!("Done.");
    Ok(())
}
