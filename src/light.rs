use std::fmt;

use crate::is_zero;
use crate::consts::{ DEFAULT_KC, DEFAULT_KL, DEFAULT_KQ };
use crate::color::Color;
use crate::tuple::{ Point3D, Vector };

/// A material record.
///
/// Materials use attributes from the Phong reflection model (diffuse,
/// specular and shininess) plus the reflection and transmission factors the
/// tracer recurses on. The default material absorbs everything: it is black
/// under any light, opaque and not reflective.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub kd: f64,
    pub ks: f64,
    pub shininess: u32,

    pub kr: f64,
    pub kt: f64,
}

impl Material {
    pub fn with_kd(mut self, kd: f64) -> Material {
        self.kd = kd;
        self
    }

    pub fn with_ks(mut self, ks: f64) -> Material {
        self.ks = ks;
        self
    }

    pub fn with_shininess(mut self, shininess: u32) -> Material {
        self.shininess = shininess;
        self
    }

    pub fn with_kr(mut self, kr: f64) -> Material {
        self.kr = kr;
        self
    }

    pub fn with_kt(mut self, kt: f64) -> Material {
        self.kt = kt;
        self
    }
}

/// Light which reaches every point equally, from nowhere in particular.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AmbientLight {
    intensity: Color,
}

impl AmbientLight {
    /// Creates an ambient light of intensity `ia * ka`.
    pub fn new(ia: Color, ka: f64) -> AmbientLight {
        AmbientLight { intensity: ia * ka }
    }

    pub fn intensity(&self) -> Color {
        self.intensity
    }
}

/// A light which illuminates geometry directly, and may be blocked.
pub trait LightSource: Send + Sync + fmt::Debug {
    /// The intensity of this light arriving at `p`.
    fn intensity_at(&self, p: &Point3D) -> Color;

    /// The unit vector from the light toward `p`.
    ///
    /// `None` if `p` is where the light is.
    fn direction_to(&self, p: &Point3D) -> Option<Vector>;

    /// How far the light is from `p`.
    fn distance_to(&self, p: &Point3D) -> f64;
}

/// A light infinitely far away, shining in one direction (e.g. the sun).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    intensity: Color,
    direction: Vector,
}

impl DirectionalLight {
    pub fn new(intensity: Color, direction: Vector) -> DirectionalLight {
        DirectionalLight { intensity, direction: direction.normalized() }
    }
}

impl LightSource for DirectionalLight {
    fn intensity_at(&self, _p: &Point3D) -> Color {
        self.intensity
    }

    fn direction_to(&self, _p: &Point3D) -> Option<Vector> {
        Some(self.direction)
    }

    fn distance_to(&self, _p: &Point3D) -> f64 {
        f64::INFINITY
    }
}

/// A point light.
///
/// Shines in every direction from a position, fading with distance `d` as
/// `1 / (kc + kl*d + kq*d^2)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    intensity: Color,
    position: Point3D,

    kc: f64,
    kl: f64,
    kq: f64,
}

impl PointLight {
    /// Creates a point light which does not fade.
    pub fn new(intensity: Color, position: Point3D) -> PointLight {
        PointLight {
            intensity,
            position,
            kc: DEFAULT_KC,
            kl: DEFAULT_KL,
            kq: DEFAULT_KQ,
        }
    }

    pub fn with_kc(mut self, kc: f64) -> PointLight {
        self.kc = kc;
        self
    }

    pub fn with_kl(mut self, kl: f64) -> PointLight {
        self.kl = kl;
        self
    }

    pub fn with_kq(mut self, kq: f64) -> PointLight {
        self.kq = kq;
        self
    }

    pub fn position(&self) -> Point3D {
        self.position
    }
}

impl LightSource for PointLight {
    fn intensity_at(&self, p: &Point3D) -> Color {
        let d = self.position.distance(p);
        self.intensity.reduce(self.kc + self.kl * d + self.kq * d * d)
    }

    fn direction_to(&self, p: &Point3D) -> Option<Vector> {
        p.subtract(&self.position).ok().map(|v| v.normalized())
    }

    fn distance_to(&self, p: &Point3D) -> f64 {
        self.position.distance(p)
    }
}

/// A point light aimed in one direction.
///
/// Intensity falls off with the angle away from the aim direction; a higher
/// `concentration` narrows the beam.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpotLight {
    light: PointLight,
    direction: Vector,
    concentration: f64,
}

impl SpotLight {
    pub fn new(intensity: Color, position: Point3D, direction: Vector)
        -> SpotLight {
        SpotLight {
            light: PointLight::new(intensity, position),
            direction: direction.normalized(),
            concentration: 1.0,
        }
    }

    pub fn with_kc(mut self, kc: f64) -> SpotLight {
        self.light = self.light.with_kc(kc);
        self
    }

    pub fn with_kl(mut self, kl: f64) -> SpotLight {
        self.light = self.light.with_kl(kl);
        self
    }

    pub fn with_kq(mut self, kq: f64) -> SpotLight {
        self.light = self.light.with_kq(kq);
        self
    }

    pub fn with_concentration(mut self, concentration: f64) -> SpotLight {
        self.concentration = concentration;
        self
    }
}

impl LightSource for SpotLight {
    fn intensity_at(&self, p: &Point3D) -> Color {
        let cos = match self.light.direction_to(p) {
            Some(l) => self.direction.dot(&l),
            None => return Color::BLACK,
        };

        // Exactly sideways to the beam.
        if is_zero(cos) {
            return Color::BLACK;
        }

        let factor = cos.max(0.0).powf(self.concentration);
        self.light.intensity_at(p) * factor
    }

    fn direction_to(&self, p: &Point3D) -> Option<Vector> {
        self.light.direction_to(p)
    }

    fn distance_to(&self, p: &Point3D) -> f64 {
        self.light.distance_to(p)
    }
}

/* Tests */

#[test]
fn default_material_absorbs_everything() {
    let m = Material::default();

    assert_eq!(m, Material { kd: 0.0, ks: 0.0, shininess: 0, kr: 0.0, kt: 0.0 });

    let m = m.with_kd(0.5).with_ks(0.5).with_shininess(100).with_kt(0.3);
    assert_eq!(m.kd, 0.5);
    assert_eq!(m.shininess, 100);
    assert_eq!(m.kr, 0.0);
    assert_eq!(m.kt, 0.3);
}

#[test]
fn ambient_light_intensity() {
    assert_eq!(AmbientLight::default().intensity(), Color::BLACK);

    let a = AmbientLight::new(Color::rgb(255.0, 191.0, 191.0), 0.1);
    assert_eq!(a.intensity(), Color::rgb(25.5, 19.1, 19.1));
}

#[test]
fn directional_light() {
    let l = DirectionalLight::new(Color::white(), Vector::new(0.0, 0.0, -5.0).unwrap());
    let p = Point3D::new(10.0, 20.0, 30.0);

    assert_eq!(l.intensity_at(&p), Color::white());
    assert_eq!(l.direction_to(&p), Some(Vector::new(0.0, 0.0, -1.0).unwrap()));
    assert_eq!(l.distance_to(&p), f64::INFINITY);
}

#[test]
fn point_light_attenuation() {
    let l = PointLight::new(Color::rgb(2.0, 4.0, 6.0), Point3D::ZERO);
    let p = Point3D::new(0.0, 3.0, 4.0);

    // No fading by default.
    assert_eq!(l.intensity_at(&p), Color::rgb(2.0, 4.0, 6.0));

    let l = l.with_kl(0.2).with_kq(0.04);
    // 1 + 0.2*5 + 0.04*25 = 3
    assert_eq!(l.intensity_at(&p), Color::rgb(2.0 / 3.0, 4.0 / 3.0, 2.0));
    assert_eq!(l.distance_to(&p), 5.0);
    assert_eq!(l.direction_to(&p), Some(Vector::new(0.0, 0.6, 0.8).unwrap()));
}

#[test]
fn point_light_at_query_point() {
    let l = PointLight::new(Color::white(), Point3D::new(1.0, 1.0, 1.0));

    assert_eq!(l.direction_to(&Point3D::new(1.0, 1.0, 1.0)), None);
}

#[test]
fn spot_light_beam() {
    let s = SpotLight::new(Color::white(), Point3D::ZERO,
        Vector::new(0.0, 0.0, -1.0).unwrap());

    // Straight down the beam.
    assert_eq!(s.intensity_at(&Point3D::new(0.0, 0.0, -2.0)), Color::white());

    // At 60 degrees off the beam.
    let p = Point3D::new(3.0f64.sqrt(), 0.0, -1.0);
    assert_eq!(s.intensity_at(&p), Color::rgb(0.5, 0.5, 0.5));

    // Sideways, behind, and at the light itself.
    assert_eq!(s.intensity_at(&Point3D::new(1.0, 0.0, 0.0)), Color::BLACK);
    assert_eq!(s.intensity_at(&Point3D::new(0.0, 0.0, 1.0)), Color::BLACK);
    assert_eq!(s.intensity_at(&Point3D::ZERO), Color::BLACK);

    let narrow = s.with_concentration(2.0);
    assert_eq!(narrow.intensity_at(&p), Color::rgb(0.25, 0.25, 0.25));
}
