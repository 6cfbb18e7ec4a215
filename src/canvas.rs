use std::fs::{ self, File };
use std::io::{ BufWriter, Write };
use std::path::{ Path, PathBuf };
use std::sync::atomic::{ AtomicU64, Ordering };

use log::info;

use crate::error::Result;
use crate::color::Color;

/// Where rendered pixels go.
///
/// Pixels are written through a shared reference, from many threads at once,
/// each pixel at most once per pass. `flush` is called once everything is
/// written.
pub trait ImageSink: Send + Sync {
    /// The width of the image, in pixels.
    fn width(&self) -> usize;

    /// The height of the image, in pixels.
    fn height(&self) -> usize;

    /// Writes the color of pixel (`x`, `y`); `y` is the row, counted from the
    /// top. Out-of-bounds pixels are ignored.
    fn write_pixel(&self, x: usize, y: usize, color: Color);

    /// Writes the finished image out.
    fn flush(&self) -> Result<()>;
}

/// A canvas for drawing pixels, saved as a PPM image.
///
/// Each channel of each pixel is kept as the bits of an `f64` in an atomic,
/// so worker threads writing different pixels never wait on each other.
/// Colors are kept unclamped; they are only squeezed into 0-255 when the
/// image is written, with 1.0 as full brightness.
#[derive(Debug)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    width: usize,

    /// The height of the canvas, in pixels.
    height: usize,

    /// Where `flush` saves the image.
    path: PathBuf,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<[AtomicU64; 3]>,
}

/// Longest line allowed in a PPM file.
const PPM_LINE_WIDTH: usize = 70;

impl Canvas {
    /// Creates a black canvas which will be saved to `path`.
    pub fn new<P: AsRef<Path>>(path: P, width: usize, height: usize) -> Canvas {
        let black = Color::BLACK;
        let pixels = (0..width * height)
            .map(|_| [
                AtomicU64::new(black.r.to_bits()),
                AtomicU64::new(black.g.to_bits()),
                AtomicU64::new(black.b.to_bits()),
            ])
            .collect();

        Canvas {
            width,
            height,
            path: path.as_ref().to_path_buf(),
            pixels,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// If the specified pixel location is out-of-bounds, `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use phong_tracer::color::Color;
    /// # use phong_tracer::canvas::{ Canvas, ImageSink };
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let canvas = Canvas::new("purple.ppm", 8, 8);
    /// canvas.write_pixel(4, 2, purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// assert_eq!(canvas.read_pixel(8, 2), None);
    /// ```
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let [r, g, b] = &self.pixels[(y * self.width) + x];
        Some(Color::rgb(
            f64::from_bits(r.load(Ordering::Relaxed)),
            f64::from_bits(g.load(Ordering::Relaxed)),
            f64::from_bits(b.load(Ordering::Relaxed)),
        ))
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Every row of pixels starts on a new line, and no line exceeds 70
    /// columns; values which would cross the mark move to the next line.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        for y in 0..self.height {
            let mut col = 0;

            for x in 0..self.width {
                let pixel = self.read_pixel(x, y).unwrap_or_default();

                for channel in &[pixel.r, pixel.g, pixel.b] {
                    let value = (channel * 255.0).clamp(0.0, 255.0).round() as u8;
                    let value = value.to_string();

                    if col > 0 && col + 1 + value.len() > PPM_LINE_WIDTH {
                        writeln!(out)?;
                        col = 0;
                    } else if col > 0 {
                        write!(out, " ")?;
                        col += 1;
                    }

                    write!(out, "{}", value)?;
                    col += value.len();
                }
            }

            writeln!(out)?;
        }

        Ok(())
    }

    /// Saves the canvas to a PPM file, creating missing parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()?;

        info!("saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

impl ImageSink for Canvas {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn write_pixel(&self, x: usize, y: usize, color: Color) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        let [r, g, b] = &self.pixels[(y * self.width) + x];
        r.store(color.r.to_bits(), Ordering::Relaxed);
        g.store(color.g.to_bits(), Ordering::Relaxed);
        b.store(color.b.to_bits(), Ordering::Relaxed);
    }

    fn flush(&self) -> Result<()> {
        self.save(&self.path)
    }
}

/* Tests */

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new("unused.ppm", 10, 20);

    assert_eq!(c.width(), 10);
    assert_eq!(c.height(), 20);
    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(c.read_pixel(x, y), Some(Color::BLACK));
        }
    }
}

#[test]
fn out_of_bounds_writes_are_ignored() {
    let c = Canvas::new("unused.ppm", 2, 2);

    c.write_pixel(2, 0, Color::red());
    c.write_pixel(0, 2, Color::red());
    c.write_pixel(1, 1, Color::red());

    assert_eq!(c.read_pixel(1, 1), Some(Color::red()));
    assert_eq!(c.read_pixel(0, 0), Some(Color::BLACK));
}

#[test]
fn ppm_pixel_data() {
    let c = Canvas::new("unused.ppm", 5, 3);
    c.write_pixel(0, 0, Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "P3\n5 3\n255\n\
        255 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n\
        0 0 0 0 0 0 0 128 0 0 0 0 0 0 0\n\
        0 0 0 0 0 0 0 0 0 0 0 0 0 0 255\n");
}

#[test]
fn ppm_lines_wrap_at_70_columns() {
    let c = Canvas::new("unused.ppm", 10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();

    assert!(ppm.lines().all(|l| l.len() <= 70));
    assert_eq!(ppm.lines().skip(3).collect::<Vec<_>>(), vec![
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204",
        "153 255 204 153 255 204 153 255 204 153 255 204 153",
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204",
        "153 255 204 153 255 204 153 255 204 153 255 204 153",
    ]);
    assert!(ppm.ends_with('\n'));
}

#[test]
fn flush_creates_directories() {
    let dir = std::env::temp_dir()
        .join(format!("phong-tracer-canvas-{}", std::process::id()));
    let path = dir.join("nested").join("out.ppm");

    let c = Canvas::new(&path, 1, 1);
    c.write_pixel(0, 0, Color::white());
    c.flush().unwrap();

    let ppm = std::fs::read_to_string(&path).unwrap();
    assert_eq!(ppm, "P3\n1 1\n255\n255 255 255\n");

    std::fs::remove_dir_all(&dir).unwrap();
}
