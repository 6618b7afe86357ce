use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Everything a render needs, read from TOML. Every field has a default, so an
/// empty file (or no file) is a valid configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub mesh: MeshConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub shadow: ShadowConfig,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    // --- Output ---
    #[serde(default = "default_size")]
    pub width: usize,
    #[serde(default = "default_size")]
    pub height: usize,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_background")]
    pub background: [f32; 3],

    // --- Pipeline ---
    #[serde(default)]
    pub wires: bool,
    #[serde(default = "default_cull_mode")]
    pub cull_mode: String, // "back", "front", "none"
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_size(),
            height: default_size(),
            samples: default_samples(),
            output: default_output(),
            background: default_background(),
            wires: false,
            cull_mode: default_cull_mode(),
        }
    }
}

fn default_size() -> usize {
    512
}
fn default_samples() -> usize {
    1
}
fn default_output() -> String {
    "meshview.png".to_string()
}
fn default_background() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}
fn default_cull_mode() -> String {
    "none".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct MeshConfig {
    /// OBJ file to view.
    #[serde(default)]
    pub path: Option<String>,
    /// Rounds of Loop subdivision applied after loading.
    #[serde(default)]
    pub refine: usize,
}

/// Trackball drags replayed before rendering, in window pixels.
#[derive(Debug, Default, Deserialize)]
pub struct ViewConfig {
    /// Each entry is `[from_x, from_y, to_x, to_y]`.
    #[serde(default)]
    pub drags: Vec<[f32; 4]>,
}

/// Flashlight arrow presses replayed before rendering.
#[derive(Debug, Default, Deserialize)]
pub struct LightConfig {
    /// "up", "down", "left" or "right".
    #[serde(default)]
    pub arrows: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShadowConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub wires: bool,
    #[serde(default = "default_plane_point")]
    pub plane_point: [f32; 3],
    #[serde(default = "default_plane_normal")]
    pub plane_normal: [f32; 3],
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wires: false,
            plane_point: default_plane_point(),
            plane_normal: default_plane_normal(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_plane_point() -> [f32; 3] {
    [0.0, -0.5, 0.0]
}
fn default_plane_normal() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Rejects settings no render can be made from.
    pub fn validate(&self) -> Result<(), String> {
        if self.render.width == 0 || self.render.height == 0 {
            return Err(format!(
                "Image size must be positive, got {}x{}",
                self.render.width, self.render.height
            ));
        }
        if self.render.samples == 0 {
            return Err("Sample factor must be at least 1".to_string());
        }
        let n = self.shadow.plane_normal;
        if n.iter().all(|c| *c == 0.0) {
            return Err("Shadow plane normal must not be zero".to_string());
        }
        Ok(())
    }
}
