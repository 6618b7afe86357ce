use crate::io::config::Config;
use crate::io::obj_loader::load_obj;
use crate::scene::camera::Camera;
use crate::scene::context::RenderContext;
use crate::scene::light::{Arrow, Flashlight};
use crate::scene::mesh::Mesh;
use crate::scene::subdivision::refine_n;
use log::{debug, info};

/// Replays the configured trackball drags on `camera`.
pub fn apply_view(config: &Config, camera: &mut Camera) {
    for drag in &config.view.drags {
        camera.drag_window((drag[0], drag[1]), (drag[2], drag[3]));
    }
    debug!("Trackball orientation: {:?}", camera.trackball.orientation);
}

/// Replays the configured arrow presses on `flashlight`, relative to the
/// camera's final orientation.
pub fn apply_light(
    config: &Config,
    camera: &Camera,
    flashlight: &mut Flashlight,
) -> Result<(), String> {
    for name in &config.light.arrows {
        let arrow = Arrow::from_name(name)?;
        flashlight.nudge(arrow, &camera.trackball);
    }
    debug!("Light position: {:?}", flashlight.position());
    Ok(())
}

/// Sets up camera and light from the configuration around an already loaded
/// mesh, refining it as configured.
pub fn build_context(config: &Config, mesh: Mesh) -> Result<RenderContext, String> {
    let mesh = refine_n(&mesh, config.mesh.refine);

    let mut camera = Camera::new(config.render.width, config.render.height);
    apply_view(config, &mut camera);

    let mut flashlight = Flashlight::default();
    apply_light(config, &camera, &mut flashlight)?;

    let vertices = mesh.compile();
    info!(
        "Scene ready: {} faces, {} vertices to draw",
        mesh.face_count(),
        vertices.len()
    );

    Ok(RenderContext {
        camera,
        flashlight,
        mesh,
        vertices,
    })
}

/// Initial resource loading (heavy I/O). Returns a RenderContext.
pub fn init_scene(config: &Config) -> Result<RenderContext, String> {
    let path = config
        .mesh
        .path
        .as_deref()
        .ok_or_else(|| "No mesh given: pass an OBJ file or set [mesh] path".to_string())?;
    let mesh = load_obj(path)?;
    build_context(config, mesh)
}
