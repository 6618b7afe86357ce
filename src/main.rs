use clap::Parser;
use log::info;
use meshview::app;
use meshview::io::config::Config;

/// Renders a triangle mesh to an image: lit, optionally wireframed, with a
/// planar shadow underneath.
#[derive(Parser, Debug)]
#[command(name = "meshview", version, about)]
struct Cli {
    /// OBJ file to render (overrides `[mesh] path`)
    #[arg(value_name = "OBJ")]
    obj: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Draw triangle edges over the surface
    #[arg(short, long)]
    wires: bool,

    /// Rounds of Loop subdivision
    #[arg(short, long)]
    refine: Option<usize>,

    /// Output image path
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Supersampling factor per axis
    #[arg(short, long)]
    samples: Option<usize>,
}

impl Cli {
    fn into_config(self) -> Result<Config, String> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config file: {}", path);
                Config::load(path)?
            }
            None => Config::default(),
        };

        if let Some(obj) = self.obj {
            config.mesh.path = Some(obj);
        }
        if self.wires {
            config.render.wires = true;
        }
        if let Some(levels) = self.refine {
            config.mesh.refine = levels;
        }
        if let Some(output) = self.output {
            config.render.output = output;
        }
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
        if let Some(samples) = self.samples {
            config.render.samples = samples;
        }
        Ok(config)
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = Cli::parse().into_config()?;
    app::run(&config)
}
