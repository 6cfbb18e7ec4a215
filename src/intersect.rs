use std::fmt;

use crate::error::Result;
use crate::color::Color;
use crate::tuple::{ Point3D, Vector };
use crate::ray::Ray;
use crate::light::Material;

/// Something a ray can hit.
///
/// Implemented by every shape, and by the `Geometries` composite which
/// gathers the hits of its members.
pub trait Intersectable: Send + Sync + fmt::Debug {
    /// Intersects a ray, keeping only hits no further than `max_distance`
    /// along the ray.
    ///
    /// Returns an empty vector when nothing is hit.
    fn find_geo_intersections_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<GeoPoint<'_>>;

    /// Intersects a ray without a distance bound.
    fn find_geo_intersections(&self, ray: &Ray) -> Vec<GeoPoint<'_>> {
        self.find_geo_intersections_within(ray, f64::INFINITY)
    }

    /// Intersects a ray, dropping which geometry was hit.
    fn find_intersections(&self, ray: &Ray) -> Vec<Point3D> {
        self.find_geo_intersections(ray)
            .into_iter()
            .map(|gp| gp.point)
            .collect()
    }
}

/// A shape with a surface: emission, material and a normal at every point.
pub trait Geometry: Intersectable {
    /// The self-luminance of the shape.
    fn emission(&self) -> Color;

    fn material(&self) -> &Material;

    /// The unit normal at a point on the surface.
    ///
    /// Fails only for points where no normal exists (e.g. the center of a
    /// sphere).
    fn normal(&self, point: &Point3D) -> Result<Vector>;
}

/// An intersection: which geometry was hit, and where.
#[derive(Copy, Clone)]
pub struct GeoPoint<'a> {
    pub geometry: &'a dyn Geometry,
    pub point: Point3D,
}

impl<'a> GeoPoint<'a> {
    pub fn new(geometry: &'a dyn Geometry, point: Point3D) -> GeoPoint<'a> {
        GeoPoint { geometry, point }
    }

    /// Checks whether this point lies on `geometry` (by identity).
    pub fn is_on(&self, geometry: &dyn Geometry) -> bool {
        same_geometry(self.geometry, geometry)
    }
}

impl<'a> fmt::Debug for GeoPoint<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoPoint")
            .field("geometry", &self.geometry)
            .field("point", &self.point)
            .finish()
    }
}

/// Two GeoPoints are equal if they sit on the *same* geometry (pointer
/// identity) at equivalent points.
impl<'a> PartialEq for GeoPoint<'a> {
    fn eq(&self, other: &GeoPoint<'a>) -> bool {
        same_geometry(self.geometry, other.geometry) && self.point == other.point
    }
}

/// Compares geometries by address, ignoring vtables.
pub(crate) fn same_geometry(a: &dyn Geometry, b: &dyn Geometry) -> bool {
    std::ptr::eq(
        a as *const dyn Geometry as *const u8,
        b as *const dyn Geometry as *const u8,
    )
}

/// A composite of intersectable items.
///
/// Every member is tested against every ray; there is no spatial index.
#[derive(Debug, Default)]
pub struct Geometries {
    items: Vec<Box<dyn Intersectable>>,
}

impl Geometries {
    pub fn new() -> Geometries {
        Geometries { items: Vec::new() }
    }

    /// Adds one item to the composite.
    pub fn add<I: Intersectable + 'static>(&mut self, item: I) -> &mut Self {
        self.items.push(Box::new(item));
        self
    }

    /// Adds a batch of already boxed items.
    pub fn extend<T>(&mut self, items: T) -> &mut Self
        where T: IntoIterator<Item = Box<dyn Intersectable>> {
        self.items.extend(items);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<Box<dyn Intersectable>>> for Geometries {
    fn from(items: Vec<Box<dyn Intersectable>>) -> Geometries {
        Geometries { items }
    }
}

impl Intersectable for Geometries {
    fn find_geo_intersections_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<GeoPoint<'_>> {
        let mut intersections = Vec::new();
        for item in self.items.iter() {
            intersections.append(
                &mut item.find_geo_intersections_within(ray, max_distance)
            );
        }

        intersections
    }
}

/* Tests */

#[test]
fn empty_composite_has_no_hits() {
    let g = Geometries::new();
    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, -1.0).unwrap());

    assert!(g.is_empty());
    assert!(g.find_geo_intersections(&r).is_empty());
}

#[test]
fn composite_collects_all_members() {
    use crate::shape::{ Sphere, Plane, Triangle };

    let mut g = Geometries::new();
    g.add(Sphere::new(Point3D::new(0.0, 0.0, -10.0), 1.0))
        .add(Plane::new(Point3D::new(0.0, 0.0, -20.0),
            Vector::new(0.0, 0.0, 1.0).unwrap()))
        .add(Triangle::new(
            Point3D::new(50.0, 50.0, -5.0),
            Point3D::new(60.0, 50.0, -5.0),
            Point3D::new(50.0, 60.0, -5.0),
        ).unwrap());

    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, -1.0).unwrap());

    // Two sphere hits and one plane hit; the triangle is off to the side.
    assert_eq!(g.len(), 3);
    assert_eq!(g.find_geo_intersections(&r).len(), 3);

    // Bounding the distance keeps only the sphere.
    assert_eq!(g.find_geo_intersections_within(&r, 15.0).len(), 2);

    // A ray missing everything.
    let miss = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap());
    assert!(g.find_intersections(&miss).is_empty());
}

#[test]
fn nested_composites() {
    use crate::shape::Sphere;

    let mut inner = Geometries::new();
    inner.add(Sphere::new(Point3D::new(0.0, 0.0, -10.0), 1.0));

    let mut outer = Geometries::new();
    outer.add(inner)
        .add(Sphere::new(Point3D::new(0.0, 0.0, -20.0), 1.0));

    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, -1.0).unwrap());
    assert_eq!(outer.find_intersections(&r).len(), 4);
}

#[test]
fn geo_point_identity() {
    use crate::shape::Sphere;

    let a = Sphere::new(Point3D::ZERO, 1.0);
    let b = Sphere::new(Point3D::ZERO, 1.0);
    let p = Point3D::new(0.0, 0.0, 1.0);

    assert_eq!(GeoPoint::new(&a, p), GeoPoint::new(&a, p));
    assert_ne!(GeoPoint::new(&a, p), GeoPoint::new(&b, p));
    assert!(GeoPoint::new(&a, p).is_on(&a));
}
