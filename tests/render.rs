use meshview::app;
use meshview::core::color::to_rgba8;
use meshview::io::config::Config;
use meshview::pipeline::passes::{frame_to_image, render_frame};
use meshview::pipeline::renderer::Renderer;
use meshview::pipeline::shaders::mesh::{AMBIENT_COLOR, WIRE_COLOR};
use meshview::scene::loader::build_context;
use meshview::scene::mesh::Mesh;
use nalgebra::Point3;
use std::io::Write;

const OCTAHEDRON_OBJ: &str = "\
v 1 0 0
v -1 0 0
v 0 1 0
v 0 -1 0
v 0 0 1
v 0 0 -1
f 1 3 5
f 3 2 5
f 2 4 5
f 4 1 5
f 3 1 6
f 2 3 6
f 4 2 6
f 1 4 6
";

fn octahedron() -> Mesh {
    let positions = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let faces = [
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    let mut mesh = Mesh::from_triangles(&positions, None, &faces).unwrap();
    mesh.rebox();
    mesh
}

/// A small frame, tilted so the floor under the mesh faces the viewer.
fn tilted_config(wires: bool) -> Config {
    let mut config = Config::default();
    config.render.width = 64;
    config.render.height = 64;
    config.render.wires = wires;
    config.view.drags = vec![[32.0, 32.0, 32.0, 44.0]];
    config
}

fn render(config: &Config) -> image::RgbaImage {
    let context = build_context(config, octahedron()).unwrap();
    let mut renderer = Renderer::new(config.render.width, config.render.height, 1);
    render_frame(config, &context, &mut renderer);
    frame_to_image(&renderer.framebuffer)
}

fn count(img: &image::RgbaImage, color: [u8; 4]) -> usize {
    img.pixels().filter(|p| p.0 == color).count()
}

#[test]
fn wireframe_appears_only_when_enabled() {
    let wire = to_rgba8(&WIRE_COLOR.push(1.0));
    assert!(count(&render(&tilted_config(true)), wire) > 0);
    assert_eq!(count(&render(&tilted_config(false)), wire), 0);
}

#[test]
fn shadow_lands_on_the_floor() {
    let img = render(&tilted_config(false));
    let shadow = to_rgba8(&(AMBIENT_COLOR * 0.25).push(1.0));
    assert!(count(&img, shadow) > 0);

    // Below the object, not in the top corner.
    assert_ne!(img.get_pixel(32, 50).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

#[test]
fn object_covers_the_middle_of_the_frame() {
    let img = render(&tilted_config(false));
    assert_ne!(img.get_pixel(32, 24).0, [0, 0, 0, 255]);
}

#[test]
fn rendering_twice_gives_identical_frames() {
    let config = tilted_config(true);
    assert_eq!(render(&config).into_raw(), render(&config).into_raw());
}

#[test]
fn run_writes_the_configured_image() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = dir.path().join("octahedron.obj");
    std::fs::File::create(&obj_path)
        .unwrap()
        .write_all(OCTAHEDRON_OBJ.as_bytes())
        .unwrap();
    let out_path = dir.path().join("frame.png");

    let mut config = tilted_config(true);
    config.render.samples = 2;
    config.mesh.path = Some(obj_path.to_str().unwrap().to_string());
    config.mesh.refine = 1;
    config.render.output = out_path.to_str().unwrap().to_string();

    app::run(&config).unwrap();

    let img = image::open(&out_path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (64, 64));
    // Refinement shrinks the mesh toward its limit surface, but it and its
    // shadow still cover a good part of the frame.
    let drawn = img.pixels().filter(|p| p.0 != [0, 0, 0, 255]).count();
    assert!(drawn > 100, "only {} pixels drawn", drawn);
}

#[test]
fn run_rejects_unknown_cull_modes() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = dir.path().join("octahedron.obj");
    std::fs::write(&obj_path, OCTAHEDRON_OBJ).unwrap();

    let mut config = tilted_config(false);
    config.mesh.path = Some(obj_path.to_str().unwrap().to_string());
    config.render.cull_mode = "sideways".to_string();
    config.render.output = dir.path().join("x.png").to_str().unwrap().to_string();
    assert!(app::run(&config).is_err());
}
