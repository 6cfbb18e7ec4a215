use std::ops::{ Add, Mul };

use crate::feq;

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. Channels are
/// not clamped: light intensities routinely exceed 1.0 while shading, and
/// only the image sink squeezes them into a displayable range (where 1.0
/// maps to full brightness).
///
/// # Examples
///
/// Sum a few lights and average them:
///
/// ```
/// # use phong_tracer::color::Color;
/// let warm = Color::rgb(1.0, 0.5, 0.0);
/// let cold = Color::rgb(0.0, 0.5, 1.0);
/// let avg = (warm + cold).reduce(2.0);
/// assert_eq!(avg, Color::rgb(0.5, 0.5, 0.5));
/// assert_eq!(avg + Color::BLACK, avg);
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating
/// point error in comparisons. Adaptive supersampling relies on this to
/// decide whether a cell is uniform.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(v: [f64; 3]) -> Color {
        Color { r: v[0], g: v[1], b: v[2] }
    }
}

impl Color {
    /// The color black; the identity for color addition.
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color white.
    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    /// The color red.
    pub fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    /// The color green.
    pub fn green() -> Color {
        Color::rgb(0.0, 1.0, 0.0)
    }

    /// The color blue.
    pub fn blue() -> Color {
        Color::rgb(0.0, 0.0, 1.0)
    }

    /// Multiplies every channel by a scalar.
    pub fn scale(&self, k: f64) -> Color {
        *self * k
    }

    /// Divides every channel by `count`. Used for averaging samples.
    pub fn reduce(&self, count: f64) -> Color {
        Color {
            r: self.r / count,
            g: self.g / count,
            b: self.b / count,
        }
    }

    /// Computes the Hadamard product of two colors.
    ///
    /// The hadamard product multiplies each component of the two colors, and
    /// yields a new color containing those products.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// Averages a set of colors with equal weight.
    ///
    /// Returns black for an empty slice.
    pub fn average(colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::BLACK;
        }

        colors.iter()
            .fold(Color::BLACK, |acc, c| acc + *c)
            .reduce(colors.len() as f64)
    }
}

/// Adds two colors together.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

/// Multiplies a color by a scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Multiplies a scalar by a color.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Multiplies a color by a color, channel by channel.
///
/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn scale_colors() {
    let c = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(c.scale(2.0), 2.0 * c);
}

#[test]
fn multiply_colors_per_channel() {
    let yellow = Color::rgb(1.0, 1.0, 0.0);
    let purple = Color::rgb(1.0, 0.0, 1.0);

    assert_eq!(yellow * purple, Color::red());
}

#[test]
fn reduce_and_average() {
    let colors = [Color::red(), Color::green(), Color::blue(), Color::BLACK];

    assert_eq!(Color::average(&colors), Color::rgb(0.25, 0.25, 0.25));
    assert_eq!(Color::rgb(3.0, 6.0, 9.0).reduce(3.0), Color::rgb(1.0, 2.0, 3.0));
    assert_eq!(Color::average(&[]), Color::BLACK);
}

#[test]
fn colors_are_unclamped() {
    let bright = Color::rgb(400.0, 240.0, 0.0);

    assert_eq!(bright.reduce(400.0), Color::rgb(1.0, 0.6, 0.0));
}
