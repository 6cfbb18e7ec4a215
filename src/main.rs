use std::convert::TryFrom;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{ Parser, ValueEnum };
use log::error;

use phong_tracer::Result;
use phong_tracer::consts::OUT_FILE;
use phong_tracer::color::Color;
use phong_tracer::scene::{ Scene, SceneJson };
use phong_tracer::tracer::BasicRayTracer;
use phong_tracer::canvas::Canvas;
use phong_tracer::render::{ Render, Supersampling };

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliSupersampling {
    None,
    Uniform,
    Adaptive,
}

impl From<CliSupersampling> for Supersampling {
    fn from(mode: CliSupersampling) -> Supersampling {
        match mode {
            CliSupersampling::None => Supersampling::None,
            CliSupersampling::Uniform => Supersampling::Uniform,
            CliSupersampling::Adaptive => Supersampling::Adaptive,
        }
    }
}

/// Renders a JSON scene description to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// The JSON scene to render.
    #[clap(value_parser)]
    scene: PathBuf,

    /// Where to write the PPM image.
    #[clap(short, long, value_parser, default_value = OUT_FILE)]
    output: PathBuf,

    /// Render threads; 0 picks automatically.
    #[clap(short, long, value_parser)]
    threads: Option<usize>,

    /// Supersampling mode, overriding the scene's.
    #[clap(short, long, value_enum)]
    supersampling: Option<CliSupersampling>,

    /// Rays per side of the uniform supersampling grid.
    #[clap(long, value_parser)]
    grid_size: Option<usize>,

    /// Maximum subdivision level of adaptive supersampling.
    #[clap(long, value_parser)]
    adaptive_level: Option<u32>,

    /// Print progress percentages while rendering.
    #[clap(short, long, action)]
    progress: bool,

    /// Overlay grid lines every INTERVAL pixels.
    #[clap(long, value_parser, value_name = "INTERVAL")]
    grid: Option<usize>,
}

fn run(args: Args) -> Result<()> {
    let scene_json = SceneJson::from_path(&args.scene)?;
    let (width, height) = (scene_json.width, scene_json.height);
    let mut render_config = scene_json.render;
    let tracer_config = scene_json.tracer;
    let scene = Scene::try_from(scene_json)?;

    if let Some(threads) = args.threads {
        render_config.threads = threads;
    }
    if let Some(mode) = args.supersampling {
        render_config.supersampling = mode.into();
    }
    if let Some(grid_size) = args.grid_size {
        render_config.grid_size = grid_size;
    }
    if let Some(level) = args.adaptive_level {
        render_config.adaptive_max_level = level;
    }
    if args.progress {
        render_config.print_percent = true;
    }

    let canvas = Arc::new(Canvas::new(&args.output, width, height));
    let render = Render::new()
        .with_image_writer(canvas)
        .with_ray_tracer(Box::new(
            BasicRayTracer::new(scene).with_config(tracer_config)
        ))
        .with_config(render_config);

    render.render_image()?;
    if let Some(interval) = args.grid {
        render.print_grid(interval, Color::white())?;
    }
    render.write_to_image()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        process::exit(1);
    }
}
