use log::{ debug, warn };
use serde::{ Serialize, Deserialize };

use crate::align_zero;
use crate::consts::{ DELTA, MAX_CALC_COLOR_LEVEL, MIN_CALC_COLOR_K };
use crate::color::Color;
use crate::tuple::Vector;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::light::LightSource;
use crate::intersect::{ Geometry, GeoPoint, Intersectable, same_geometry };

/// Turns rays into colors.
pub trait RayTracer: Send + Sync {
    /// The color seen along `ray`.
    fn trace_ray(&self, ray: &Ray) -> Color;

    /// The scene being traced.
    fn scene(&self) -> &Scene;
}

/// Tunables of the shading recursion.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// How many surfaces a ray may bounce between before it goes dark.
    pub max_level: usize,

    /// Contributions weighted below this are dropped.
    pub min_k: f64,

    /// How far secondary rays are moved off the surface they leave.
    pub delta: f64,
}

impl Default for TracerConfig {
    fn default() -> TracerConfig {
        TracerConfig {
            max_level: MAX_CALC_COLOR_LEVEL,
            min_k: MIN_CALC_COLOR_K,
            delta: DELTA,
        }
    }
}

/// A recursive Phong ray tracer.
///
/// Each hit is lit by every light source the point can see (attenuated by
/// any transparent geometry in between), then the tracer follows a
/// reflected ray and a straight-through refracted ray, weighting them by the
/// material's `kr` and `kt`. Recursion stops at `max_level` bounces, or when
/// the accumulated weight `k` falls below `min_k`.
pub struct BasicRayTracer {
    scene: Scene,
    config: TracerConfig,
}

impl BasicRayTracer {
    pub fn new(scene: Scene) -> BasicRayTracer {
        BasicRayTracer { scene, config: TracerConfig::default() }
    }

    pub fn with_config(mut self, config: TracerConfig) -> BasicRayTracer {
        debug!("tracer configured: {:?}", config);
        self.config = config;
        self
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    fn find_closest_intersection(&self, ray: &Ray) -> Option<GeoPoint<'_>> {
        let hits = self.scene.geometries.find_geo_intersections(ray);
        ray.find_closest_geo_point(&hits)
    }

    /// The color at a hit, `level` bounces from the limit, with everything
    /// it contributes weighted by `k`.
    fn calc_color(&self, gp: &GeoPoint<'_>, ray: &Ray, level: usize, k: f64)
        -> Color {
        if level == 0 || k < self.config.min_k {
            return Color::BLACK;
        }

        let mut color = gp.geometry.emission();

        let normal = match gp.geometry.normal(&gp.point) {
            Ok(n) => n,
            Err(e) => {
                warn!("no normal at {:?}: {}", gp.point, e);
                return color;
            },
        };

        color = color + self.calc_local_effects(gp, ray, &normal, k);

        let material = gp.geometry.material();

        let kkr = k * material.kr;
        if kkr > self.config.min_k {
            if let Some(reflected) = self.reflected_ray(gp, ray, &normal) {
                color = color + self.calc_secondary(&reflected, level, kkr)
                    * material.kr;
            }
        }

        let kkt = k * material.kt;
        if kkt > self.config.min_k {
            if let Some(refracted) = self.refracted_ray(gp, ray, &normal) {
                color = color + self.calc_secondary(&refracted, level, kkt)
                    * material.kt;
            }
        }

        color
    }

    /// Follows a secondary ray one level down. A miss contributes nothing.
    fn calc_secondary(&self, ray: &Ray, level: usize, k: f64) -> Color {
        match self.find_closest_intersection(ray) {
            Some(gp) => self.calc_color(&gp, ray, level - 1, k),
            None => Color::BLACK,
        }
    }

    /// Diffuse and specular light from every light source the point sees.
    fn calc_local_effects(&self, gp: &GeoPoint<'_>, ray: &Ray, normal: &Vector,
        k: f64) -> Color {
        let v = ray.direction();
        let nv = align_zero(normal.dot(&v));

        // Looking along the surface.
        if nv == 0.0 {
            return Color::BLACK;
        }

        let material = gp.geometry.material();
        let mut color = Color::BLACK;

        for light in self.scene.lights.iter() {
            let l = match light.direction_to(&gp.point) {
                Some(l) => l,
                None => continue,
            };

            // The light must be on the same side of the surface as the eye.
            let nl = align_zero(normal.dot(&l));
            if nl * nv <= 0.0 {
                continue;
            }

            let ktr = self.transparency(light.as_ref(), &l, normal, gp);
            if ktr * k < self.config.min_k {
                continue;
            }

            let intensity = light.intensity_at(&gp.point) * ktr;
            let diffuse = intensity * (material.kd * nl.abs());

            let r = l.head() - normal.head() * (2.0 * nl);
            let vr = align_zero(-v.head().dot(&r));
            let specular = if vr > 0.0 {
                intensity * (material.ks * vr.powi(material.shininess as i32))
            } else {
                Color::BLACK
            };

            color = color + diffuse + specular;
        }

        color
    }

    /// How much of a light gets through to a point, from 1 (unobstructed) to
    /// 0 (fully shadowed).
    ///
    /// Every distinct geometry between the point and the light multiplies in
    /// its `kt` once, however many times the shadow ray crosses it.
    fn transparency(&self, light: &dyn LightSource, l: &Vector, normal: &Vector,
        gp: &GeoPoint<'_>) -> f64 {
        let shadow_ray = Ray::offset(gp.point, -*l, normal, self.config.delta);
        let light_distance = light.distance_to(&gp.point);

        let hits = self.scene.geometries.find_geo_intersections_within(
            &shadow_ray,
            light.distance_to(&shadow_ray.origin()),
        );

        let mut blockers: Vec<&dyn Geometry> = Vec::new();
        let mut ktr = 1.0;

        for hit in hits.iter() {
            if align_zero(hit.point.distance(&gp.point) - light_distance) > 0.0 {
                continue;
            }

            if blockers.iter().any(|b| same_geometry(*b, hit.geometry)) {
                continue;
            }

            blockers.push(hit.geometry);
            ktr *= hit.geometry.material().kt;

            if ktr < self.config.min_k {
                return 0.0;
            }
        }

        ktr
    }

    /// The mirror reflection of `ray` at the hit, moved off the surface.
    fn reflected_ray(&self, gp: &GeoPoint<'_>, ray: &Ray, normal: &Vector)
        -> Option<Ray> {
        let v = ray.direction();

        if align_zero(v.dot(normal)) == 0.0 {
            return None;
        }

        let r = v.reflect(normal).ok()?;
        Some(Ray::offset(gp.point, r, normal, self.config.delta))
    }

    /// The ray carrying on through the surface, unbent, moved to its far
    /// side.
    fn refracted_ray(&self, gp: &GeoPoint<'_>, ray: &Ray, normal: &Vector)
        -> Option<Ray> {
        let v = ray.direction();

        if align_zero(v.dot(normal)) == 0.0 {
            return None;
        }

        Some(Ray::offset(gp.point, v, normal, self.config.delta))
    }
}

impl RayTracer for BasicRayTracer {
    /// The background where nothing is hit. Otherwise the color of the
    /// closest hit, plus the scene's ambient light.
    fn trace_ray(&self, ray: &Ray) -> Color {
        match self.find_closest_intersection(ray) {
            Some(gp) => {
                self.calc_color(&gp, ray, self.config.max_level, 1.0)
                    + self.scene.ambient_light.intensity()
            },
            None => self.scene.background,
        }
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }
}

/* Tests */

#[cfg(test)]
fn ray(origin: [f64; 3], direction: [f64; 3]) -> Ray {
    Ray::new(
        origin.into(),
        Vector::new(direction[0], direction[1], direction[2]).unwrap(),
    )
}

#[test]
fn empty_scene_shows_background() {
    let scene = Scene::new("empty").with_background(Color::rgb(0.1, 0.2, 0.3));
    let tracer = BasicRayTracer::new(scene);

    assert_eq!(tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0])),
        Color::rgb(0.1, 0.2, 0.3));
}

#[test]
fn emission_and_ambient() {
    use crate::tuple::Point3D;
    use crate::shape::Sphere;
    use crate::light::AmbientLight;

    let scene = Scene::new("glow")
        .with_background(Color::blue())
        .with_ambient_light(AmbientLight::new(Color::white(), 0.1))
        .add_geometry(Sphere::new(Point3D::new(0.0, 0.0, -10.0), 1.0)
            .with_emission(Color::red()));
    let tracer = BasicRayTracer::new(scene);

    assert_eq!(tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0])),
        Color::rgb(1.1, 0.1, 0.1));

    // No recursion at all: only the ambient term is left.
    let tracer = tracer.with_config(TracerConfig { max_level: 0, ..Default::default() });
    assert_eq!(tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0])),
        Color::rgb(0.1, 0.1, 0.1));
}

#[cfg(test)]
fn shadow_scene(blocker_kt: Option<f64>) -> Scene {
    use crate::tuple::Point3D;
    use crate::shape::{ Plane, Sphere };
    use crate::light::{ Material, PointLight };

    let mut scene = Scene::new("shadow")
        .add_geometry(Plane::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap())
            .with_material(Material::default().with_kd(1.0)))
        .add_light(PointLight::new(Color::white(), Point3D::new(0.0, 0.0, 10.0)));

    if let Some(kt) = blocker_kt {
        scene = scene.add_geometry(Sphere::new(Point3D::new(0.5, 0.0, 5.0), 1.0)
            .with_material(Material::default().with_kt(kt)));
    }

    scene
}

#[test]
fn shadows_attenuate_light() {
    let r = ray([1.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
    let lit = 10.0 / 101.0f64.sqrt();

    let tracer = BasicRayTracer::new(shadow_scene(None));
    assert_eq!(tracer.trace_ray(&r), Color::rgb(lit, lit, lit));

    // The shadow ray crosses the sphere twice; it still only counts once.
    let tracer = BasicRayTracer::new(shadow_scene(Some(0.5)));
    assert_eq!(tracer.trace_ray(&r), Color::rgb(lit / 2.0, lit / 2.0, lit / 2.0));

    let tracer = BasicRayTracer::new(shadow_scene(Some(0.0)));
    assert_eq!(tracer.trace_ray(&r), Color::BLACK);
}

#[test]
fn light_behind_surface_does_not_count() {
    use crate::tuple::Point3D;
    use crate::shape::Plane;
    use crate::light::{ Material, PointLight };

    let scene = Scene::new("behind")
        .add_geometry(Plane::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap())
            .with_material(Material::default().with_kd(1.0)))
        .add_light(PointLight::new(Color::white(), Point3D::new(0.0, 0.0, -10.0)));
    let tracer = BasicRayTracer::new(scene);

    assert_eq!(tracer.trace_ray(&ray([0.0, 0.0, 1.0], [0.0, 0.0, -1.0])), Color::BLACK);
}

#[test]
fn specular_highlight() {
    use crate::tuple::Point3D;
    use crate::shape::Plane;
    use crate::light::{ Material, DirectionalLight };

    let scene = Scene::new("shiny")
        .add_geometry(Plane::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap())
            .with_material(Material::default().with_ks(1.0).with_shininess(2)))
        .add_light(DirectionalLight::new(Color::white(),
            Vector::new(0.0, 0.0, -1.0).unwrap()));
    let tracer = BasicRayTracer::new(scene);

    // Looking straight down the reflection.
    assert_eq!(tracer.trace_ray(&ray([0.0, 0.0, 1.0], [0.0, 0.0, -1.0])), Color::white());

    // At 45 degrees: cos = 1/sqrt(2), squared.
    assert_eq!(tracer.trace_ray(&ray([0.0, 0.0, 1.0], [1.0, 0.0, -1.0])),
        Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn mirrors_stop_at_max_level() {
    use crate::tuple::Point3D;
    use crate::shape::Plane;
    use crate::light::Material;

    let mirror = Material::default().with_kr(1.0);
    let glow = Color::rgb(0.1, 0.1, 0.1);

    let scene = Scene::new("mirrors")
        .add_geometry(Plane::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap())
            .with_emission(glow)
            .with_material(mirror))
        .add_geometry(Plane::new(Point3D::new(0.0, 0.0, 10.0),
            Vector::new(0.0, 0.0, -1.0).unwrap())
            .with_emission(glow)
            .with_material(mirror));

    let r = ray([0.0, 0.0, 5.0], [1.0, 0.0, -1.0]);

    // Every level adds one plane's glow.
    let tracer = BasicRayTracer::new(scene)
        .with_config(TracerConfig { max_level: 3, ..Default::default() });
    assert_eq!(tracer.trace_ray(&r), Color::rgb(0.3, 0.3, 0.3));
}

#[test]
fn reflection_miss_adds_nothing() {
    use crate::tuple::Point3D;
    use crate::shape::Plane;
    use crate::light::Material;

    let scene = Scene::new("lonely mirror")
        .with_background(Color::blue())
        .add_geometry(Plane::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap())
            .with_emission(Color::rgb(0.2, 0.2, 0.2))
            .with_material(Material::default().with_kr(1.0)));
    let tracer = BasicRayTracer::new(scene);

    assert_eq!(tracer.trace_ray(&ray([0.0, 0.0, 5.0], [1.0, 0.0, -1.0])),
        Color::rgb(0.2, 0.2, 0.2));
}

#[test]
fn refraction_sees_through() {
    use crate::tuple::Point3D;
    use crate::shape::Plane;
    use crate::light::Material;

    let scene = Scene::new("glass")
        .add_geometry(Plane::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap())
            .with_material(Material::default().with_kt(0.5)))
        .add_geometry(Plane::new(Point3D::new(0.0, 0.0, -5.0),
            Vector::new(0.0, 0.0, 1.0).unwrap())
            .with_emission(Color::red()));
    let tracer = BasicRayTracer::new(scene);

    assert_eq!(tracer.trace_ray(&ray([0.0, 0.0, 5.0], [0.0, 0.0, -1.0])),
        Color::rgb(0.5, 0.0, 0.0));
}

/// Sum of `glow * 0.5^n` for the first `terms` bounces.
#[cfg(test)]
fn halving_series(glow: f64, terms: i32) -> f64 {
    glow * 2.0 * (1.0 - 0.5f64.powi(terms))
}

#[test]
fn weak_mirrors_stop_at_min_k() {
    use crate::tuple::Point3D;
    use crate::shape::Plane;
    use crate::light::Material;

    let half_mirror = Material::default().with_kr(0.5);
    let glow = Color::rgb(0.1, 0.1, 0.1);

    let build = || Scene::new("half mirrors")
        .add_geometry(Plane::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap())
            .with_emission(glow)
            .with_material(half_mirror))
        .add_geometry(Plane::new(Point3D::new(0.0, 0.0, 10.0),
            Vector::new(0.0, 0.0, -1.0).unwrap())
            .with_emission(glow)
            .with_material(half_mirror));

    let r = ray([0.0, 0.0, 5.0], [1.0, 0.0, -1.0]);

    // The bounce limit is far away; the weight runs out first. With the
    // default threshold bounces continue while 0.5^n > 0.001, i.e. 10 hits.
    let tracer = BasicRayTracer::new(build())
        .with_config(TracerConfig { max_level: 100, ..Default::default() });
    let color = tracer.trace_ray(&r);
    let expected = halving_series(0.1, 10);
    assert!(color.r.is_finite());
    assert_eq!(color, Color::rgb(expected, expected, expected));

    // A coarser threshold cuts it after 0.5^3.
    let tracer = BasicRayTracer::new(build())
        .with_config(TracerConfig { max_level: 100, min_k: 0.1, ..Default::default() });
    let expected = halving_series(0.1, 4);
    assert_eq!(tracer.trace_ray(&r), Color::rgb(expected, expected, expected));
}

#[test]
fn stacked_glass_stops_at_min_k() {
    use crate::tuple::Point3D;
    use crate::shape::Plane;
    use crate::light::Material;

    let build = || {
        let mut scene = Scene::new("glass stack");
        for i in 0..20 {
            scene = scene.add_geometry(Plane::new(Point3D::new(0.0, 0.0, -(i as f64)),
                Vector::new(0.0, 0.0, 1.0).unwrap())
                .with_emission(Color::rgb(0.1, 0.1, 0.1))
                .with_material(Material::default().with_kt(0.5)));
        }
        scene
    };

    let r = ray([0.0, 0.0, 5.0], [0.0, 0.0, -1.0]);

    let tracer = BasicRayTracer::new(build())
        .with_config(TracerConfig { max_level: 100, ..Default::default() });
    let color = tracer.trace_ray(&r);
    let expected = halving_series(0.1, 10);
    assert!(color.b.is_finite());
    assert_eq!(color, Color::rgb(expected, expected, expected));

    let tracer = BasicRayTracer::new(build())
        .with_config(TracerConfig { max_level: 100, min_k: 0.1, ..Default::default() });
    let expected = halving_series(0.1, 4);
    assert_eq!(tracer.trace_ray(&r), Color::rgb(expected, expected, expected));
}
