use std::convert::TryFrom;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::error::{ Error, Result };
use crate::color::Color;
use crate::tuple::Vector;
use crate::ray::Ray;
use crate::camera::Camera;
use crate::intersect::{ Geometries, Intersectable };
use crate::shape::{ Plane, Sphere, Triangle, Tube, Cylinder };
use crate::light::{
    Material, AmbientLight, LightSource,
    DirectionalLight, PointLight, SpotLight,
};
use crate::tracer::TracerConfig;
use crate::render::RenderConfig;

/// Everything there is to see: geometry, lights and a camera to see it with.
///
/// A scene is only ever built up and then read; tracing never mutates it.
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    pub background: Color,
    pub ambient_light: AmbientLight,
    pub geometries: Geometries,
    pub lights: Vec<Box<dyn LightSource>>,
    pub camera: Option<Camera>,
}

impl Scene {
    /// Creates an empty scene with a black background and no ambient light.
    pub fn new(name: &str) -> Scene {
        Scene {
            name: name.to_string(),
            background: Color::BLACK,
            ambient_light: AmbientLight::default(),
            geometries: Geometries::new(),
            lights: Vec::new(),
            camera: None,
        }
    }

    pub fn with_background(mut self, background: Color) -> Scene {
        self.background = background;
        self
    }

    pub fn with_ambient_light(mut self, ambient_light: AmbientLight) -> Scene {
        self.ambient_light = ambient_light;
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Scene {
        self.camera = Some(camera);
        self
    }

    pub fn add_geometry<I: Intersectable + 'static>(mut self, geometry: I)
        -> Scene {
        self.geometries.add(geometry);
        self
    }

    pub fn add_light<L: LightSource + 'static>(mut self, light: L) -> Scene {
        self.lights.push(Box::new(light));
        self
    }
}

/// A scene as written in a JSON scene description.
///
/// Besides the scene itself, a description carries the image resolution and
/// the render and tracer tunables to use for it.
#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    #[serde(default)]
    pub name: String,

    pub width: usize,
    pub height: usize,

    #[serde(default)]
    background: [f64; 3],
    #[serde(default)]
    ambient: Option<AmbientJson>,
    #[serde(default)]
    camera: Option<CameraJson>,

    #[serde(default)]
    lights: Vec<LightJson>,
    #[serde(default)]
    geometries: Vec<GeometryJson>,

    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub tracer: TracerConfig,
}

impl SceneJson {
    /// Reads a scene description from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SceneJson> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = Error;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        let mut scene = Scene::new(&scene_json.name)
            .with_background(scene_json.background.into());

        if let Some(ambient) = scene_json.ambient {
            scene = scene.with_ambient_light(
                AmbientLight::new(ambient.intensity.into(), ambient.ka)
            );
        }

        if let Some(camera) = scene_json.camera {
            scene = scene.with_camera(camera.into_camera()?);
        }

        scene.lights = scene_json.lights
            .into_iter()
            .map(LightJson::into_light)
            .collect::<Result<_>>()?;

        let geometries = scene_json.geometries
            .into_iter()
            .map(GeometryJson::into_geometry)
            .collect::<Result<Vec<_>>>()?;
        scene.geometries.extend(geometries);

        Ok(scene)
    }
}

fn vector(v: [f64; 3]) -> Result<Vector> {
    Vector::new(v[0], v[1], v[2])
}

#[derive(Clone, Serialize, Deserialize)]
struct AmbientJson {
    intensity: [f64; 3],
    ka: f64,
}

#[derive(Clone, Serialize, Deserialize)]
struct CameraJson {
    origin: [f64; 3],
    to: [f64; 3],
    up: [f64; 3],
    width: f64,
    height: f64,
    distance: f64,
}

impl CameraJson {
    fn into_camera(self) -> Result<Camera> {
        Ok(Camera::new(self.origin.into(), vector(self.to)?, vector(self.up)?)?
            .with_view_plane_size(self.width, self.height)
            .with_distance(self.distance))
    }
}

fn default_kc() -> f64 {
    crate::consts::DEFAULT_KC
}

fn default_concentration() -> f64 {
    1.0
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LightJson {
    Directional {
        intensity: [f64; 3],
        direction: [f64; 3],
    },
    Point {
        intensity: [f64; 3],
        position: [f64; 3],
        #[serde(default = "default_kc")]
        kc: f64,
        #[serde(default)]
        kl: f64,
        #[serde(default)]
        kq: f64,
    },
    Spot {
        intensity: [f64; 3],
        position: [f64; 3],
        direction: [f64; 3],
        #[serde(default = "default_kc")]
        kc: f64,
        #[serde(default)]
        kl: f64,
        #[serde(default)]
        kq: f64,
        #[serde(default = "default_concentration")]
        concentration: f64,
    },
}

impl LightJson {
    fn into_light(self) -> Result<Box<dyn LightSource>> {
        let light: Box<dyn LightSource> = match self {
            LightJson::Directional { intensity, direction } => Box::new(
                DirectionalLight::new(intensity.into(), vector(direction)?)
            ),
            LightJson::Point { intensity, position, kc, kl, kq } => Box::new(
                PointLight::new(intensity.into(), position.into())
                    .with_kc(kc)
                    .with_kl(kl)
                    .with_kq(kq)
            ),
            LightJson::Spot {
                intensity, position, direction, kc, kl, kq, concentration
            } => Box::new(
                SpotLight::new(intensity.into(), position.into(), vector(direction)?)
                    .with_kc(kc)
                    .with_kl(kl)
                    .with_kq(kq)
                    .with_concentration(concentration)
            ),
        };

        Ok(light)
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct MaterialJson {
    kd: f64,
    ks: f64,
    shininess: u32,
    kr: f64,
    kt: f64,
}

impl From<MaterialJson> for Material {
    fn from(m: MaterialJson) -> Material {
        Material {
            kd: m.kd,
            ks: m.ks,
            shininess: m.shininess,
            kr: m.kr,
            kt: m.kt,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct GeometryJson {
    #[serde(flatten)]
    shape: ShapeJson,

    #[serde(default)]
    emission: [f64; 3],
    #[serde(default)]
    material: MaterialJson,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeJson {
    Plane { point: [f64; 3], normal: [f64; 3] },
    PlaneFromPoints { points: [[f64; 3]; 3] },
    Sphere { center: [f64; 3], radius: f64 },
    Triangle { vertices: [[f64; 3]; 3] },
    Tube { origin: [f64; 3], direction: [f64; 3], radius: f64 },
    Cylinder { origin: [f64; 3], direction: [f64; 3], radius: f64, height: f64 },
}

impl GeometryJson {
    fn into_geometry(self) -> Result<Box<dyn Intersectable>> {
        let emission: Color = self.emission.into();
        let material: Material = self.material.into();

        let geometry: Box<dyn Intersectable> = match self.shape {
            ShapeJson::Plane { point, normal } => Box::new(
                Plane::new(point.into(), vector(normal)?)
                    .with_emission(emission)
                    .with_material(material)
            ),
            ShapeJson::PlaneFromPoints { points: [p1, p2, p3] } => Box::new(
                Plane::from_points(p1.into(), p2.into(), p3.into())?
                    .with_emission(emission)
                    .with_material(material)
            ),
            ShapeJson::Sphere { center, radius } => Box::new(
                Sphere::new(center.into(), radius)
                    .with_emission(emission)
                    .with_material(material)
            ),
            ShapeJson::Triangle { vertices: [p1, p2, p3] } => Box::new(
                Triangle::new(p1.into(), p2.into(), p3.into())?
                    .with_emission(emission)
                    .with_material(material)
            ),
            ShapeJson::Tube { origin, direction, radius } => Box::new(
                Tube::new(Ray::new(origin.into(), vector(direction)?), radius)
                    .with_emission(emission)
                    .with_material(material)
            ),
            ShapeJson::Cylinder { origin, direction, radius, height } => Box::new(
                Cylinder::new(Ray::new(origin.into(), vector(direction)?), radius, height)
                    .with_emission(emission)
                    .with_material(material)
            ),
        };

        Ok(geometry)
    }
}

/* Tests */

#[test]
fn build_scene_with_builders() {
    use crate::tuple::Point3D;

    let scene = Scene::new("builders")
        .with_background(Color::rgb(0.1, 0.2, 0.3))
        .with_ambient_light(AmbientLight::new(Color::white(), 0.15))
        .add_geometry(Sphere::new(Point3D::ZERO, 1.0))
        .add_light(PointLight::new(Color::white(), Point3D::new(0.0, 0.0, 10.0)));

    assert_eq!(scene.name, "builders");
    assert_eq!(scene.background, Color::rgb(0.1, 0.2, 0.3));
    assert_eq!(scene.ambient_light.intensity(), Color::rgb(0.15, 0.15, 0.15));
    assert_eq!(scene.geometries.len(), 1);
    assert_eq!(scene.lights.len(), 1);
    assert!(scene.camera.is_none());
}

#[test]
fn scene_from_json() {
    use crate::tuple::Point3D;

    let json = r#"{
        "name": "json",
        "width": 40,
        "height": 30,
        "background": [0.0, 0.0, 0.2],
        "ambient": { "intensity": [1.0, 1.0, 1.0], "ka": 0.1 },
        "camera": {
            "origin": [0, 0, 100], "to": [0, 0, -1], "up": [0, 1, 0],
            "width": 40, "height": 30, "distance": 100
        },
        "lights": [
            { "type": "directional", "intensity": [0.5, 0.5, 0.5], "direction": [0, 0, -1] },
            { "type": "point", "intensity": [1, 1, 1], "position": [0, 10, 10], "kl": 0.001 },
            { "type": "spot", "intensity": [1, 1, 1], "position": [0, 10, 10],
              "direction": [0, -1, -1], "concentration": 4 }
        ],
        "geometries": [
            { "type": "sphere", "center": [0, 0, -50], "radius": 20,
              "emission": [0.2, 0.0, 0.0],
              "material": { "kd": 0.5, "ks": 0.5, "shininess": 100, "kt": 0.3 } },
            { "type": "triangle", "vertices": [[0, 0, -60], [10, 0, -60], [0, 10, -60]] },
            { "type": "plane_from_points", "points": [[0, 0, -100], [1, 0, -100], [0, 1, -100]] },
            { "type": "cylinder", "origin": [0, -10, -50], "direction": [0, 1, 0],
              "radius": 5, "height": 10 }
        ],
        "render": { "supersampling": "adaptive", "threads": 1 },
        "tracer": { "max_level": 4 }
    }"#;

    let scene_json: SceneJson = serde_json::from_str(json).unwrap();
    assert_eq!(scene_json.width, 40);
    assert_eq!(scene_json.render.threads, 1);
    assert_eq!(scene_json.tracer.max_level, 4);
    assert_eq!(scene_json.tracer.min_k, crate::consts::MIN_CALC_COLOR_K);

    let scene = Scene::try_from(scene_json).unwrap();
    assert_eq!(scene.name, "json");
    assert_eq!(scene.lights.len(), 3);
    assert_eq!(scene.geometries.len(), 4);
    assert_eq!(scene.ambient_light.intensity(), Color::rgb(0.1, 0.1, 0.1));

    let camera = scene.camera.unwrap();
    assert_eq!(camera.distance(), 100.0);
    assert_eq!(camera.right(), Vector::new(1.0, 0.0, 0.0).unwrap());

    // The sphere keeps its material.
    let ray = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, -1.0).unwrap());
    let hits = scene.geometries.find_geo_intersections(&ray);
    let front = ray.find_closest_geo_point(&hits).unwrap();
    assert_eq!(front.point, Point3D::new(0.0, 0.0, -30.0));
    assert_eq!(front.geometry.material().shininess, 100);
    assert_eq!(front.geometry.emission(), Color::rgb(0.2, 0.0, 0.0));
}

#[test]
fn scene_json_rejects_degenerate_shapes() {
    let json = r#"{
        "width": 10,
        "height": 10,
        "geometries": [
            { "type": "triangle", "vertices": [[0, 0, 0], [1, 1, 1], [2, 2, 2]] }
        ]
    }"#;

    let scene_json: SceneJson = serde_json::from_str(json).unwrap();
    assert!(matches!(Scene::try_from(scene_json), Err(Error::DegenerateTriangle)));

    let json = r#"{
        "width": 10,
        "height": 10,
        "camera": {
            "origin": [0, 0, 0], "to": [0, 0, -1], "up": [0, 1, 1],
            "width": 1, "height": 1, "distance": 1
        }
    }"#;

    let scene_json: SceneJson = serde_json::from_str(json).unwrap();
    assert!(matches!(Scene::try_from(scene_json), Err(Error::NonOrthogonalBasis)));
}
