use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{ Duration, Instant };

use log::{ debug, info };
use serde::{ Serialize, Deserialize };

use crate::consts::{
    SUPERSAMPLING_GRID_SIZE, ADAPTIVE_MAX_LEVEL, ADAPTIVE_LEVEL_LIMIT,
    PROGRESS_POLL_MS,
};
use crate::error::{ Error, Resource, Result };
use crate::color::Color;
use crate::tuple::Point3D;
use crate::ray::Ray;
use crate::camera::Camera;
use crate::canvas::ImageSink;
use crate::tracer::RayTracer;
use crate::parallel::{ PixelCursor, Progress, worker_count };

/// How many rays are traced for each pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Supersampling {
    /// One ray through the pixel center.
    None,

    /// An even `grid_size * grid_size` grid of rays, averaged.
    Uniform,

    /// Rays through the pixel corners, subdividing only where they disagree.
    Adaptive,
}

impl Default for Supersampling {
    fn default() -> Supersampling {
        Supersampling::None
    }
}

/// Tunables of a render.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub supersampling: Supersampling,

    /// Rays per side of the uniform supersampling grid.
    pub grid_size: usize,

    /// How many times adaptive supersampling may split a pixel, counting
    /// the pixel itself.
    pub adaptive_max_level: u32,

    /// Render threads. 0 picks automatically, 1 renders on the calling
    /// thread.
    pub threads: usize,

    /// Print progress percentages to stderr.
    pub print_percent: bool,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            supersampling: Supersampling::None,
            grid_size: SUPERSAMPLING_GRID_SIZE,
            adaptive_max_level: ADAPTIVE_MAX_LEVEL,
            threads: 0,
            print_percent: false,
        }
    }
}

/// Drives a ray tracer over every pixel of an image.
///
/// # Examples
///
/// ```
/// # use std::sync::Arc;
/// # use phong_tracer::color::Color;
/// # use phong_tracer::tuple::{ Point3D, Vector };
/// # use phong_tracer::camera::Camera;
/// # use phong_tracer::canvas::Canvas;
/// # use phong_tracer::scene::Scene;
/// # use phong_tracer::tracer::BasicRayTracer;
/// # use phong_tracer::render::Render;
/// let camera = Camera::new(
///     Point3D::ZERO,
///     Vector::new(0.0, 0.0, -1.0).unwrap(),
///     Vector::new(0.0, 1.0, 0.0).unwrap(),
/// ).unwrap();
/// let scene = Scene::new("sky")
///     .with_background(Color::blue())
///     .with_camera(camera);
///
/// let canvas = Arc::new(Canvas::new("sky.ppm", 4, 4));
/// Render::new()
///     .with_image_writer(canvas.clone())
///     .with_ray_tracer(Box::new(BasicRayTracer::new(scene)))
///     .render_image()
///     .unwrap();
///
/// assert_eq!(canvas.read_pixel(3, 3), Some(Color::blue()));
/// ```
#[derive(Default)]
pub struct Render {
    image_writer: Option<Arc<dyn ImageSink>>,
    ray_tracer: Option<Box<dyn RayTracer>>,
    config: RenderConfig,
}

impl Render {
    pub fn new() -> Render {
        Default::default()
    }

    pub fn with_image_writer(mut self, image_writer: Arc<dyn ImageSink>)
        -> Render {
        self.image_writer = Some(image_writer);
        self
    }

    pub fn with_ray_tracer(mut self, ray_tracer: Box<dyn RayTracer>) -> Render {
        self.ray_tracer = Some(ray_tracer);
        self
    }

    pub fn with_config(mut self, config: RenderConfig) -> Render {
        self.config = config;
        self
    }

    pub fn with_supersampling(mut self, supersampling: Supersampling) -> Render {
        self.config.supersampling = supersampling;
        self
    }

    pub fn with_grid_size(mut self, grid_size: usize) -> Render {
        self.config.grid_size = grid_size;
        self
    }

    pub fn with_adaptive_max_level(mut self, level: u32) -> Render {
        self.config.adaptive_max_level = level;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Render {
        self.config.threads = threads;
        self
    }

    pub fn with_print_percent(mut self, print_percent: bool) -> Render {
        self.config.print_percent = print_percent;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn image_writer(&self) -> Result<&dyn ImageSink> {
        self.image_writer.as_deref()
            .ok_or(Error::MissingResource(Resource::ImageWriter))
    }

    /// Renders every pixel into the image writer.
    ///
    /// Fails before any work is done if the image writer, the ray tracer
    /// or the scene's camera is missing.
    pub fn render_image(&self) -> Result<()> {
        let writer = self.image_writer()?;
        let tracer = self.ray_tracer.as_deref()
            .ok_or(Error::MissingResource(Resource::RayTracer))?;
        let camera = tracer.scene().camera.as_ref()
            .ok_or(Error::MissingResource(Resource::Camera))?;

        let job = RenderJob {
            writer,
            tracer,
            camera,
            config: &self.config,
            nx: writer.width(),
            ny: writer.height(),
        };

        let workers = worker_count(self.config.threads);
        info!(
            "rendering \"{}\" at {}x{} on {} thread(s), supersampling: {:?}",
            tracer.scene().name, job.nx, job.ny, workers,
            self.config.supersampling,
        );

        let start = Instant::now();
        if workers == 1 {
            job.render_sequential();
        } else {
            job.render_parallel(workers);
        }
        info!("rendered in {:.3} seconds", start.elapsed().as_secs_f64());

        Ok(())
    }

    /// Draws grid lines every `interval` pixels, over whatever the image
    /// writer holds.
    pub fn print_grid(&self, interval: usize, color: Color) -> Result<()> {
        let writer = self.image_writer()?;

        if interval == 0 {
            return Err(Error::InvalidArgument("grid interval must be positive"));
        }

        for row in 0..writer.height() {
            for col in 0..writer.width() {
                if row % interval == 0 || col % interval == 0 {
                    writer.write_pixel(col, row, color);
                }
            }
        }

        Ok(())
    }

    /// Flushes the image writer.
    pub fn write_to_image(&self) -> Result<()> {
        self.image_writer()?.flush()
    }
}

/// Everything a render needs, checked to be present.
struct RenderJob<'a> {
    writer: &'a dyn ImageSink,
    tracer: &'a dyn RayTracer,
    camera: &'a Camera,
    config: &'a RenderConfig,
    nx: usize,
    ny: usize,
}

impl<'a> RenderJob<'a> {
    fn render_sequential(&self) {
        let progress = Progress::new(self.nx * self.ny);
        let mut reporter = Reporter::new(self.config.print_percent);

        for row in 0..self.ny {
            for col in 0..self.nx {
                self.render_pixel(col, row);
                progress.tick();
            }

            reporter.report(&progress);
        }

        reporter.finish(&progress);
    }

    fn render_parallel(&self, workers: usize) {
        let cursor = PixelCursor::new(self.nx, self.ny);
        let progress = Progress::new(self.nx * self.ny);
        let mut reporter = Reporter::new(self.config.print_percent);

        thread::scope(|s| {
            let cursor = &cursor;
            let progress = &progress;

            let handles: Vec<_> = (0..workers)
                .map(|_| s.spawn(move || {
                    while let Some((col, row)) = cursor.next_pixel() {
                        self.render_pixel(col, row);
                        progress.tick();
                    }
                }))
                .collect();

            debug!("spawned {} render workers", handles.len());

            if self.config.print_percent {
                while !handles.iter().all(|h| h.is_finished()) {
                    reporter.report(progress);
                    thread::sleep(Duration::from_millis(PROGRESS_POLL_MS));
                }
            }
        });

        reporter.finish(&progress);
    }

    fn render_pixel(&self, col: usize, row: usize) {
        let ray = self.camera.construct_ray_through_pixel(
            self.nx, self.ny, col, row
        );

        let color = match self.config.supersampling {
            Supersampling::None => self.tracer.trace_ray(&ray),
            Supersampling::Uniform => self.uniform_color(&ray),
            Supersampling::Adaptive => self.adaptive_color(&ray),
        };

        self.writer.write_pixel(col, row, color);
    }

    /// Averages an even grid of rays over the pixel.
    fn uniform_color(&self, ray: &Ray) -> Color {
        let grid = self.config.grid_size.max(1);
        let colors: Vec<Color> = self.camera
            .supersampling_rays(ray, grid, self.nx, self.ny)
            .iter()
            .map(|r| self.tracer.trace_ray(r))
            .collect();

        Color::average(&colors)
    }

    fn adaptive_color(&self, ray: &Ray) -> Color {
        let levels = self.config.adaptive_max_level.clamp(1, ADAPTIVE_LEVEL_LIMIT);
        let mut sampler = AdaptiveSampler::new(self, ray, levels);
        let cells = sampler.cells;

        sampler.cell(0, 0, cells, levels)
    }
}

/// Adaptive supersampling of one pixel.
///
/// The pixel is a lattice of `cells * cells` cells, `cells` being
/// `2^(levels - 1)`. A cell traces rays through its four corners; it is
/// done if they agree, or if it is as small as cells get, and otherwise
/// splits into quarters. Corners are memoized by lattice position, so
/// neighbouring cells never trace the same corner twice.
struct AdaptiveSampler<'a, 'b> {
    job: &'b RenderJob<'a>,
    top_left: Point3D,
    cell_width: f64,
    cell_height: f64,
    cells: u32,
    memo: HashMap<(u32, u32), Color>,
}

impl<'a, 'b> AdaptiveSampler<'a, 'b> {
    fn new(job: &'b RenderJob<'a>, ray: &Ray, levels: u32)
        -> AdaptiveSampler<'a, 'b> {
        let camera = job.camera;
        let cells = 1u32 << (levels - 1);

        let pixel_width = camera.width() / job.nx as f64;
        let pixel_height = camera.height() / job.ny as f64;

        let top_left = camera.view_plane_point(ray)
            + camera.right() * (-pixel_width / 2.0)
            + camera.up() * (pixel_height / 2.0);

        AdaptiveSampler {
            job,
            top_left,
            cell_width: pixel_width / cells as f64,
            cell_height: pixel_height / cells as f64,
            cells,
            memo: HashMap::new(),
        }
    }

    /// The color at lattice corner (`i`, `j`), `j` counting down from the
    /// top of the pixel.
    fn sample(&mut self, i: u32, j: u32) -> Color {
        if let Some(color) = self.memo.get(&(i, j)) {
            return *color;
        }

        let camera = self.job.camera;
        let point = self.top_left
            + camera.right() * (i as f64 * self.cell_width)
            + camera.up() * (-(j as f64) * self.cell_height);

        let color = self.job.tracer.trace_ray(
            &camera.construct_ray_through_point(point)
        );
        self.memo.insert((i, j), color);

        color
    }

    /// The color of the cell with top left corner (`i`, `j`) and sides of
    /// `span` lattice steps.
    fn cell(&mut self, i: u32, j: u32, span: u32, level: u32) -> Color {
        let corners = [
            self.sample(i, j),
            self.sample(i + span, j),
            self.sample(i, j + span),
            self.sample(i + span, j + span),
        ];

        if level <= 1 || span < 2 {
            return Color::average(&corners);
        }

        if corners.iter().all(|c| *c == corners[0]) {
            return corners[0];
        }

        let half = span / 2;
        let quarters = [
            self.cell(i, j, half, level - 1),
            self.cell(i + half, j, half, level - 1),
            self.cell(i, j + half, half, level - 1),
            self.cell(i + half, j + half, half, level - 1),
        ];

        Color::average(&quarters)
    }
}

/// Prints progress percentages, only when they change.
struct Reporter {
    enabled: bool,
    last: Option<usize>,
}

impl Reporter {
    fn new(enabled: bool) -> Reporter {
        Reporter { enabled, last: None }
    }

    fn report(&mut self, progress: &Progress) {
        if !self.enabled {
            return;
        }

        let percent = progress.percent();
        if self.last != Some(percent) {
            eprint!("\r{}%", percent);
            self.last = Some(percent);
        }
    }

    fn finish(&mut self, progress: &Progress) {
        if self.enabled {
            self.report(progress);
            eprintln!();
        }
    }
}

/* Tests */

#[cfg(test)]
use std::sync::atomic::{ AtomicUsize, Ordering };

#[cfg(test)]
use crate::scene::Scene;

/// A tracer which colors rays by which side of the camera axis they pass,
/// counting how many it traces.
#[cfg(test)]
struct SplitTracer {
    scene: Scene,
    traced: Arc<AtomicUsize>,
    split: bool,
}

#[cfg(test)]
impl SplitTracer {
    fn new(split: bool) -> (SplitTracer, Arc<AtomicUsize>) {
        use crate::tuple::Vector;

        let camera = Camera::new(
            Point3D::ZERO,
            Vector::new(0.0, 0.0, -1.0).unwrap(),
            Vector::new(0.0, 1.0, 0.0).unwrap(),
        ).unwrap();
        let traced = Arc::new(AtomicUsize::new(0));

        let tracer = SplitTracer {
            scene: Scene::new("split").with_camera(camera),
            traced: traced.clone(),
            split,
        };

        (tracer, traced)
    }
}

#[cfg(test)]
impl RayTracer for SplitTracer {
    fn trace_ray(&self, ray: &Ray) -> Color {
        self.traced.fetch_add(1, Ordering::Relaxed);

        if self.split && ray.direction().x() > 0.0 {
            Color::red()
        } else {
            Color::blue()
        }
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }
}

#[test]
fn missing_resources_are_reported() {
    use crate::canvas::Canvas;
    use crate::tracer::BasicRayTracer;

    let err = Render::new().render_image().unwrap_err();
    assert!(matches!(err, Error::MissingResource(Resource::ImageWriter)));

    let canvas = Arc::new(Canvas::new("unused.ppm", 2, 2));
    let err = Render::new()
        .with_image_writer(canvas.clone())
        .render_image()
        .unwrap_err();
    assert!(matches!(err, Error::MissingResource(Resource::RayTracer)));

    let err = Render::new()
        .with_image_writer(canvas)
        .with_ray_tracer(Box::new(BasicRayTracer::new(Scene::new("no camera"))))
        .render_image()
        .unwrap_err();
    assert!(matches!(err, Error::MissingResource(Resource::Camera)));

    assert!(matches!(
        Render::new().print_grid(10, Color::white()),
        Err(Error::MissingResource(Resource::ImageWriter))
    ));
    assert!(matches!(
        Render::new().write_to_image(),
        Err(Error::MissingResource(Resource::ImageWriter))
    ));
}

#[test]
fn empty_scene_renders_background() {
    use crate::tuple::Vector;
    use crate::canvas::Canvas;
    use crate::tracer::BasicRayTracer;

    let camera = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, -1.0).unwrap(),
        Vector::new(0.0, 1.0, 0.0).unwrap(),
    ).unwrap()
        .with_view_plane_size(4.0, 3.0);

    for &threads in &[1, 3] {
        let scene = Scene::new("empty")
            .with_background(Color::rgb(0.2, 0.4, 0.6))
            .with_camera(camera);
        let canvas = Arc::new(Canvas::new("unused.ppm", 4, 3));

        Render::new()
            .with_image_writer(canvas.clone())
            .with_ray_tracer(Box::new(BasicRayTracer::new(scene)))
            .with_threads(threads)
            .with_supersampling(Supersampling::Adaptive)
            .render_image()
            .unwrap();

        for row in 0..3 {
            for col in 0..4 {
                assert_eq!(canvas.read_pixel(col, row), Some(Color::rgb(0.2, 0.4, 0.6)));
            }
        }
    }
}

#[test]
fn adaptive_stops_on_uniform_pixels() {
    use crate::canvas::Canvas;

    let (tracer, traced) = SplitTracer::new(false);
    let canvas = Arc::new(Canvas::new("unused.ppm", 1, 1));

    Render::new()
        .with_image_writer(canvas.clone())
        .with_ray_tracer(Box::new(tracer))
        .with_threads(1)
        .with_supersampling(Supersampling::Adaptive)
        .with_adaptive_max_level(3)
        .render_image()
        .unwrap();

    assert_eq!(traced.load(Ordering::Relaxed), 4);
    assert_eq!(canvas.read_pixel(0, 0), Some(Color::blue()));
}

#[test]
fn adaptive_splits_disagreeing_pixels() {
    use crate::canvas::Canvas;

    let (tracer, traced) = SplitTracer::new(true);
    let canvas = Arc::new(Canvas::new("unused.ppm", 1, 1));

    Render::new()
        .with_image_writer(canvas.clone())
        .with_ray_tracer(Box::new(tracer))
        .with_threads(1)
        .with_supersampling(Supersampling::Adaptive)
        .with_adaptive_max_level(2)
        .render_image()
        .unwrap();

    // A 3x3 lattice of corners, each traced once.
    assert_eq!(traced.load(Ordering::Relaxed), 9);

    // Left half all blue; the right quarters straddle the split.
    assert_eq!(canvas.read_pixel(0, 0), Some(Color::rgb(0.25, 0.0, 0.75)));
}

#[test]
fn uniform_supersampling_averages() {
    use crate::canvas::Canvas;

    let (tracer, traced) = SplitTracer::new(true);
    let canvas = Arc::new(Canvas::new("unused.ppm", 1, 1));

    Render::new()
        .with_image_writer(canvas.clone())
        .with_ray_tracer(Box::new(tracer))
        .with_threads(1)
        .with_supersampling(Supersampling::Uniform)
        .with_grid_size(2)
        .render_image()
        .unwrap();

    assert_eq!(traced.load(Ordering::Relaxed), 4);
    assert_eq!(canvas.read_pixel(0, 0), Some(Color::rgb(0.5, 0.0, 0.5)));
}

#[test]
fn grid_lines() {
    use crate::canvas::Canvas;

    let canvas = Arc::new(Canvas::new("unused.ppm", 5, 5));
    let render = Render::new().with_image_writer(canvas.clone());

    assert!(matches!(
        render.print_grid(0, Color::white()),
        Err(Error::InvalidArgument(_))
    ));

    render.print_grid(2, Color::white()).unwrap();

    for row in 0..5 {
        for col in 0..5 {
            let expected = if row % 2 == 0 || col % 2 == 0 {
                Color::white()
            } else {
                Color::BLACK
            };
            assert_eq!(canvas.read_pixel(col, row), Some(expected));
        }
    }
}

#[test]
fn parallel_matches_sequential() {
    use crate::tuple::Vector;
    use crate::canvas::Canvas;
    use crate::shape::{ Sphere, Plane };
    use crate::light::{ Material, AmbientLight, PointLight };
    use crate::tracer::BasicRayTracer;

    let build = || {
        let camera = Camera::new(
            Point3D::new(0.0, 0.0, 100.0),
            Vector::new(0.0, 0.0, -1.0).unwrap(),
            Vector::new(0.0, 1.0, 0.0).unwrap(),
        ).unwrap()
            .with_view_plane_size(60.0, 40.0)
            .with_distance(100.0);

        Scene::new("parallel")
            .with_background(Color::rgb(0.0, 0.0, 0.1))
            .with_ambient_light(AmbientLight::new(Color::white(), 0.05))
            .with_camera(camera)
            .add_geometry(Sphere::new(Point3D::new(0.0, 0.0, -20.0), 15.0)
                .with_emission(Color::rgb(0.1, 0.0, 0.0))
                .with_material(Material::default()
                    .with_kd(0.5).with_ks(0.5).with_shininess(30).with_kt(0.3)))
            .add_geometry(Plane::new(Point3D::new(0.0, -15.0, 0.0),
                Vector::new(0.0, 1.0, 0.0).unwrap())
                .with_material(Material::default().with_kd(0.4).with_kr(0.5)))
            .add_light(PointLight::new(Color::white(), Point3D::new(20.0, 30.0, 30.0))
                .with_kl(0.001))
    };

    let sequential = Arc::new(Canvas::new("unused.ppm", 24, 16));
    let parallel = Arc::new(Canvas::new("unused.ppm", 24, 16));

    for (canvas, threads) in vec![(&sequential, 1), (&parallel, 4)] {
        Render::new()
            .with_image_writer(canvas.clone())
            .with_ray_tracer(Box::new(BasicRayTracer::new(build())))
            .with_threads(threads)
            .with_supersampling(Supersampling::Adaptive)
            .with_print_percent(threads > 1)
            .render_image()
            .unwrap();
    }

    for row in 0..16 {
        for col in 0..24 {
            assert_eq!(sequential.read_pixel(col, row), parallel.read_pixel(col, row));
        }
    }
}
