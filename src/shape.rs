use crate::{ align_zero, is_zero };
use crate::error::{ Error, Result };
use crate::color::Color;
use crate::tuple::{ Point3D, Vector };
use crate::ray::Ray;
use crate::light::Material;
use crate::intersect::{ Intersectable, Geometry, GeoPoint };

/// An infinite plane through a point.
#[derive(Clone, Debug)]
pub struct Plane {
    origin: Point3D,
    normal: Vector,

    pub emission: Color,
    pub material: Material,
}

impl Plane {
    /// Creates a plane through `origin`. The normal is normalized.
    pub fn new(origin: Point3D, normal: Vector) -> Plane {
        Plane {
            origin,
            normal: normal.normalized(),
            emission: Color::BLACK,
            material: Material::default(),
        }
    }

    /// Creates the plane through three points.
    ///
    /// The normal is `(p2 - p1) x (p3 - p1)`, normalized. Fails if two of the
    /// points coincide or if all three lie on one line.
    pub fn from_points(p1: Point3D, p2: Point3D, p3: Point3D) -> Result<Plane> {
        if p1 == p2 || p2 == p3 || p1 == p3 {
            return Err(Error::DegeneratePlane("points must be distinct"));
        }

        let v1 = p2.subtract(&p1)?;
        let v2 = p3.subtract(&p1)?;
        let normal = v1.cross(&v2)
            .map_err(|_| Error::DegeneratePlane("points are collinear"))?;

        Ok(Plane::new(p1, normal))
    }

    pub fn with_emission(mut self, emission: Color) -> Plane {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Plane {
        self.material = material;
        self
    }

    pub fn origin(&self) -> Point3D {
        self.origin
    }

    pub fn normal_vector(&self) -> Vector {
        self.normal
    }

    /// Finds where a ray crosses the plane, if it does so strictly in front
    /// of its origin and no further than `max_distance`.
    pub(crate) fn intersection_point(&self, ray: &Ray, max_distance: f64)
        -> Option<Point3D> {
        let denom = align_zero(self.normal.dot(&ray.direction()));

        // Parallel to the plane, or lying in it.
        if denom == 0.0 {
            return None;
        }

        let numer = self.normal.head().dot(&(self.origin - ray.origin()));
        let t = align_zero(numer / denom);

        if t <= 0.0 || align_zero(max_distance - t) < 0.0 {
            None
        } else {
            Some(ray.point_at(t))
        }
    }
}

impl Intersectable for Plane {
    fn find_geo_intersections_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<GeoPoint<'_>> {
        match self.intersection_point(ray, max_distance) {
            Some(p) => vec![GeoPoint::new(self, p)],
            None => Vec::new(),
        }
    }
}

impl Geometry for Plane {
    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn normal(&self, _point: &Point3D) -> Result<Vector> {
        Ok(self.normal)
    }
}

/// A sphere with a center and radius.
#[derive(Clone, Debug)]
pub struct Sphere {
    center: Point3D,
    radius: f64,

    pub emission: Color,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Point3D, radius: f64) -> Sphere {
        Sphere {
            center,
            radius,
            emission: Color::BLACK,
            material: Material::default(),
        }
    }

    pub fn with_emission(mut self, emission: Color) -> Sphere {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Sphere {
        self.material = material;
        self
    }

    pub fn center(&self) -> Point3D {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Intersectable for Sphere {
    fn find_geo_intersections_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<GeoPoint<'_>> {
        let u = match self.center.subtract(&ray.origin()) {
            Ok(u) => u,
            // Starting at the center: the only forward hit is one radius out.
            Err(_) => {
                if align_zero(max_distance - self.radius) >= 0.0 {
                    return vec![GeoPoint::new(self, ray.point_at(self.radius))];
                }
                return Vec::new();
            }
        };

        let tm = ray.direction().dot(&u);
        let d = (u.length_squared() - tm * tm).max(0.0).sqrt();

        // Missed, or only grazing the surface.
        if align_zero(d - self.radius) >= 0.0 {
            return Vec::new();
        }

        let th = (self.radius.powi(2) - d.powi(2)).sqrt();

        let mut hits = Vec::new();
        for &t in &[tm - th, tm + th] {
            if align_zero(t) > 0.0 && align_zero(max_distance - t) >= 0.0 {
                hits.push(GeoPoint::new(self, ray.point_at(t)));
            }
        }

        hits
    }
}

impl Geometry for Sphere {
    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> &Material {
        &self.material
    }

    /// Fails at the center of the sphere.
    fn normal(&self, point: &Point3D) -> Result<Vector> {
        Ok(point.subtract(&self.center)?.normalized())
    }
}

/// A flat triangle.
#[derive(Clone, Debug)]
pub struct Triangle {
    vertices: [Point3D; 3],
    plane: Plane,

    pub emission: Color,
    pub material: Material,
}

impl Triangle {
    /// Creates a triangle. Fails if the vertices do not span a plane.
    pub fn new(p1: Point3D, p2: Point3D, p3: Point3D) -> Result<Triangle> {
        let plane = Plane::from_points(p1, p2, p3)
            .map_err(|_| Error::DegenerateTriangle)?;

        Ok(Triangle {
            vertices: [p1, p2, p3],
            plane,
            emission: Color::BLACK,
            material: Material::default(),
        })
    }

    pub fn with_emission(mut self, emission: Color) -> Triangle {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Triangle {
        self.material = material;
        self
    }

    pub fn vertices(&self) -> &[Point3D; 3] {
        &self.vertices
    }

    /// The sign of the hit relative to the side through the ray origin and
    /// the edge `a -> b`. Zero means on the side (or undecidable).
    fn edge_side(origin: Point3D, a: Point3D, b: Point3D, hit: Point3D) -> f64 {
        let side = match (a.subtract(&origin), b.subtract(&origin)) {
            (Ok(va), Ok(vb)) => va.cross(&vb),
            _ => return 0.0,
        };

        match side {
            Ok(n) => align_zero(n.normalized().head().dot(&(hit - origin))),
            Err(_) => 0.0,
        }
    }
}

impl Intersectable for Triangle {
    fn find_geo_intersections_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<GeoPoint<'_>> {
        let hit = match self.plane.intersection_point(ray, max_distance) {
            Some(p) => p,
            None => return Vec::new(),
        };

        let o = ray.origin();
        let [p1, p2, p3] = self.vertices;
        let s1 = Triangle::edge_side(o, p1, p2, hit);
        let s2 = Triangle::edge_side(o, p2, p3, hit);
        let s3 = Triangle::edge_side(o, p3, p1, hit);

        let inside = (s1 > 0.0 && s2 > 0.0 && s3 > 0.0)
            || (s1 < 0.0 && s2 < 0.0 && s3 < 0.0);

        if inside {
            vec![GeoPoint::new(self, hit)]
        } else {
            Vec::new()
        }
    }
}

impl Geometry for Triangle {
    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn normal(&self, _point: &Point3D) -> Result<Vector> {
        Ok(self.plane.normal_vector())
    }
}

/// An infinite tube around an axis ray.
#[derive(Clone, Debug)]
pub struct Tube {
    axis: Ray,
    radius: f64,

    pub emission: Color,
    pub material: Material,
}

impl Tube {
    pub fn new(axis: Ray, radius: f64) -> Tube {
        Tube {
            axis,
            radius,
            emission: Color::BLACK,
            material: Material::default(),
        }
    }

    pub fn with_emission(mut self, emission: Color) -> Tube {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Tube {
        self.material = material;
        self
    }

    pub fn axis(&self) -> &Ray {
        &self.axis
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// The normal of the round surface around `axis`.
fn side_normal(axis: &Ray, point: &Point3D) -> Result<Vector> {
    let t = align_zero(axis.direction().head().dot(&(*point - axis.origin())));

    let foot = if t == 0.0 { axis.origin() } else { axis.point_at(t) };

    Ok(point.subtract(&foot)?.normalized())
}

/// Ray parameters where `ray` crosses the round surface of radius `radius`
/// around `axis`, lowest first.
///
/// Solves `|(P(t) - o) - ((P(t) - o)·v)v|² = r²`. Rays parallel to the axis
/// and tangent rays give nothing.
fn side_parameters(axis: &Ray, radius: f64, ray: &Ray) -> Vec<f64> {
    let v = axis.direction().head();
    let d = ray.direction().head();
    let dp = ray.origin() - axis.origin();

    let dv = d.dot(&v);
    let dpv = dp.dot(&v);

    let a = 1.0 - dv * dv;
    if is_zero(a) {
        return Vec::new();
    }

    let b = 2.0 * (d.dot(&dp) - dv * dpv);
    let c = dp.magnitude_squared() - dpv * dpv - radius * radius;

    let disc = align_zero(b.powi(2) - 4.0 * a * c);
    if disc <= 0.0 {
        return Vec::new();
    }

    let root = disc.sqrt();
    vec![(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
}

fn in_range(t: f64, max_distance: f64) -> bool {
    align_zero(t) > 0.0 && align_zero(max_distance - t) >= 0.0
}

impl Intersectable for Tube {
    fn find_geo_intersections_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<GeoPoint<'_>> {
        side_parameters(&self.axis, self.radius, ray)
            .into_iter()
            .filter(|t| in_range(*t, max_distance))
            .map(|t| GeoPoint::new(self, ray.point_at(t)))
            .collect()
    }
}

impl Geometry for Tube {
    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn normal(&self, point: &Point3D) -> Result<Vector> {
        side_normal(&self.axis, point)
    }
}

/// A tube cut to a height, closed by two caps.
///
/// The bottom cap is centered at the axis origin, the top cap `height` along
/// the axis direction.
#[derive(Clone, Debug)]
pub struct Cylinder {
    axis: Ray,
    radius: f64,
    height: f64,

    pub emission: Color,
    pub material: Material,
}

impl Cylinder {
    pub fn new(axis: Ray, radius: f64, height: f64) -> Cylinder {
        Cylinder {
            axis,
            radius,
            height,
            emission: Color::BLACK,
            material: Material::default(),
        }
    }

    pub fn with_emission(mut self, emission: Color) -> Cylinder {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Cylinder {
        self.material = material;
        self
    }

    pub fn axis(&self) -> &Ray {
        &self.axis
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    fn top(&self) -> Point3D {
        self.axis.point_at(self.height)
    }

    /// Height of a point above the bottom cap, measured along the axis.
    fn height_of(&self, point: &Point3D) -> f64 {
        self.axis.direction().head().dot(&(*point - self.axis.origin()))
    }
}

impl Intersectable for Cylinder {
    fn find_geo_intersections_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<GeoPoint<'_>> {
        let mut ts: Vec<f64> = side_parameters(&self.axis, self.radius, ray)
            .into_iter()
            .filter(|t| {
                let h = self.height_of(&ray.point_at(*t));
                align_zero(h) > 0.0 && align_zero(self.height - h) > 0.0
            })
            .collect();

        // Caps are only reachable by rays not parallel to them.
        let dv = ray.direction().dot(&self.axis.direction());
        if !is_zero(dv) {
            for center in &[self.axis.origin(), self.top()] {
                let t = self.axis.direction().head()
                    .dot(&(*center - ray.origin())) / dv;
                let p = ray.point_at(t);

                if align_zero(self.radius.powi(2) - p.distance_squared(center)) > 0.0 {
                    ts.push(t);
                }
            }
        }

        ts.retain(|t| in_range(*t, max_distance));
        ts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        ts.into_iter()
            .map(|t| GeoPoint::new(self, ray.point_at(t)))
            .collect()
    }
}

impl Geometry for Cylinder {
    fn emission(&self) -> Color {
        self.emission
    }

    fn material(&self) -> &Material {
        &self.material
    }

    /// Points on either cap plane get the outward axis direction; everything
    /// else is treated as the round surface.
    fn normal(&self, point: &Point3D) -> Result<Vector> {
        let v = self.axis.direction();

        if is_zero(self.height_of(point)) {
            Ok(-v)
        } else if is_zero(v.head().dot(&(*point - self.top()))) {
            Ok(v)
        } else {
            side_normal(&self.axis, point)
        }
    }
}

/* Tests */

#[test]
fn plane_from_points() {
    let p = Plane::from_points(
        Point3D::new(0.0, 0.0, 1.0),
        Point3D::new(1.0, 0.0, 0.0),
        Point3D::new(0.0, 1.0, 0.0),
    ).unwrap();

    let k = (1.0f64 / 3.0).sqrt();
    let n = p.normal(&Point3D::new(0.0, 0.0, 1.0)).unwrap();
    assert!(n == Vector::new(k, k, k).unwrap() || n == Vector::new(-k, -k, -k).unwrap());
}

#[test]
fn plane_from_degenerate_points() {
    let a = Point3D::new(1.0, 2.0, 3.0);
    let b = Point3D::new(2.0, 4.0, 6.0);
    let c = Point3D::new(3.0, 6.0, 9.0);

    match Plane::from_points(a, a, b) {
        Err(Error::DegeneratePlane(why)) => assert_eq!(why, "points must be distinct"),
        other => panic!("expected a degenerate plane, got {:?}", other),
    }

    match Plane::from_points(a, b, c) {
        Err(Error::DegeneratePlane(why)) => assert_eq!(why, "points are collinear"),
        other => panic!("expected a degenerate plane, got {:?}", other),
    }
}

#[test]
fn ray_intersecting_plane() {
    let p = Plane::new(Point3D::new(0.0, 0.0, 1.0), Vector::new(0.0, 0.0, 2.0).unwrap());

    // Crossing the plane at an angle.
    let r = Ray::new(Point3D::new(0.0, 0.0, 0.0), Vector::new(1.0, 0.0, 1.0).unwrap());
    assert_eq!(p.find_intersections(&r), vec![Point3D::new(1.0, 0.0, 1.0)]);

    // Beyond the distance bound.
    assert!(p.find_geo_intersections_within(&r, 1.0).is_empty());

    // Plane behind the ray.
    let r = Ray::new(Point3D::new(0.0, 0.0, 2.0), Vector::new(1.0, 0.0, 1.0).unwrap());
    assert!(p.find_intersections(&r).is_empty());

    // Parallel, outside the plane.
    let r = Ray::new(Point3D::new(0.0, 0.0, 2.0), Vector::new(1.0, 0.0, 0.0).unwrap());
    assert!(p.find_intersections(&r).is_empty());

    // Parallel, inside the plane.
    let r = Ray::new(Point3D::new(0.0, 5.0, 1.0), Vector::new(1.0, 0.0, 0.0).unwrap());
    assert!(p.find_intersections(&r).is_empty());

    // Starting on the plane.
    let r = Ray::new(Point3D::new(3.0, 5.0, 1.0), Vector::new(0.0, 0.0, 1.0).unwrap());
    assert!(p.find_intersections(&r).is_empty());
}

#[test]
fn sphere_normal() {
    let s = Sphere::new(Point3D::new(0.0, 0.0, 1.0), 1.0);

    assert_eq!(
        s.normal(&Point3D::new(0.0, 0.0, 2.0)).unwrap(),
        Vector::new(0.0, 0.0, 1.0).unwrap()
    );
    assert!(s.normal(&Point3D::new(0.0, 0.0, 1.0)).is_err());
}

#[test]
fn ray_through_sphere_center() {
    let s = Sphere::new(Point3D::new(1.0, 0.0, 0.0), 1.0);
    let r = Ray::new(Point3D::new(-1.0, 0.0, 0.0), Vector::new(1.0, 0.0, 0.0).unwrap());

    assert_eq!(
        s.find_intersections(&r),
        vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(2.0, 0.0, 0.0)]
    );

    // Only the near hit is within reach.
    assert_eq!(s.find_geo_intersections_within(&r, 1.5).len(), 1);
}

#[test]
fn ray_from_far_sphere_surface() {
    let s = Sphere::new(Point3D::new(0.0, 0.0, -50.0), 50.0);
    let r = Ray::new(Point3D::new(0.0, 0.0, 100.0), Vector::new(0.0, 0.0, -1.0).unwrap());

    assert_eq!(
        s.find_intersections(&r),
        vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(0.0, 0.0, -100.0)]
    );
}

#[test]
fn ray_tangent_or_missing_sphere() {
    let s = Sphere::new(Point3D::ZERO, 1.0);

    let tangent = Ray::new(Point3D::new(-5.0, 1.0, 0.0), Vector::new(1.0, 0.0, 0.0).unwrap());
    assert!(s.find_intersections(&tangent).is_empty());

    let miss = Ray::new(Point3D::new(-5.0, 2.0, 0.0), Vector::new(1.0, 0.0, 0.0).unwrap());
    assert!(s.find_intersections(&miss).is_empty());
}

#[test]
fn ray_inside_or_behind_sphere() {
    let s = Sphere::new(Point3D::ZERO, 1.0);
    let dir = Vector::new(0.0, 0.0, 1.0).unwrap();

    // From the center.
    let r = Ray::new(Point3D::ZERO, dir);
    assert_eq!(s.find_intersections(&r), vec![Point3D::new(0.0, 0.0, 1.0)]);

    // From inside, off center.
    let r = Ray::new(Point3D::new(0.0, 0.0, 0.5), dir);
    assert_eq!(s.find_intersections(&r), vec![Point3D::new(0.0, 0.0, 1.0)]);

    // From the surface, leaving.
    let r = Ray::new(Point3D::new(0.0, 0.0, 1.0), dir);
    assert!(s.find_intersections(&r).is_empty());

    // Sphere entirely behind.
    let r = Ray::new(Point3D::new(0.0, 0.0, 5.0), dir);
    assert!(s.find_intersections(&r).is_empty());
}

#[test]
fn degenerate_triangle() {
    let a = Point3D::new(0.0, 0.0, 1.0);
    let b = Point3D::new(1.0, 0.0, 0.0);

    assert!(matches!(Triangle::new(a, b, a), Err(Error::DegenerateTriangle)));
    assert!(matches!(
        Triangle::new(a, a, Point3D::new(0.0, 1.0, 0.0)),
        Err(Error::DegenerateTriangle)
    ));
}

#[test]
fn triangle_intersections() {
    let t = Triangle::new(
        Point3D::new(0.0, 0.0, 1.0),
        Point3D::new(0.0, 1.0, 1.0),
        Point3D::new(1.0, 0.0, 1.0),
    ).unwrap();
    let up = Vector::new(0.0, 0.0, 1.0).unwrap();
    let hit = Point3D::new(0.25, 0.25, 1.0);

    // Inside.
    let r = Ray::new(Point3D::new(0.25, 0.25, 0.0), up);
    let hits = t.find_geo_intersections(&r);
    assert_eq!(hits, vec![GeoPoint::new(&t, hit)]);
    assert!(hits[0].is_on(&t));

    // At an angle.
    let r = Ray::new(Point3D::new(0.25, -1.25, -0.5), Vector::new(0.0, 1.0, 1.0).unwrap());
    assert_eq!(t.find_intersections(&r), vec![hit]);

    // Beside an edge, and beside a corner.
    let r = Ray::new(Point3D::new(2.0, 2.0, 0.0), up);
    assert!(t.find_intersections(&r).is_empty());
    let r = Ray::new(Point3D::new(2.0, -0.5, 0.0), up);
    assert!(t.find_intersections(&r).is_empty());

    // On the edge, on a vertex, and on an edge's extension.
    let r = Ray::new(Point3D::new(0.5, 0.5, 0.0), up);
    assert!(t.find_intersections(&r).is_empty());
    let r = Ray::new(Point3D::new(0.0, 1.0, 0.0), up);
    assert!(t.find_intersections(&r).is_empty());
    let r = Ray::new(Point3D::new(2.0, 0.0, 0.0), up);
    assert!(t.find_intersections(&r).is_empty());

    // Parallel, and starting on the triangle.
    let r = Ray::new(Point3D::new(0.25, 0.25, 2.0), Vector::new(0.0, 1.0, 0.0).unwrap());
    assert!(t.find_intersections(&r).is_empty());
    let r = Ray::new(hit, up);
    assert!(t.find_intersections(&r).is_empty());
}

#[test]
fn tube_normal() {
    let axis = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap());
    let tube = Tube::new(axis, 7.0);
    let k = 10.0f64.sqrt();

    assert_eq!(
        tube.normal(&Point3D::new(3.0, 1.0, 2.0)).unwrap(),
        Vector::new(3.0 / k, 1.0 / k, 0.0).unwrap()
    );
    // Level with the axis origin.
    assert_eq!(
        tube.normal(&Point3D::new(7.0, 0.0, 0.0)).unwrap(),
        Vector::new(1.0, 0.0, 0.0).unwrap()
    );
}

#[test]
fn ray_through_tube() {
    let axis = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap());
    let tube = Tube::new(axis, 1.0);

    let r = Ray::new(Point3D::new(-5.0, 0.0, 3.0), Vector::new(1.0, 0.0, 0.0).unwrap());
    assert_eq!(
        tube.find_intersections(&r),
        vec![Point3D::new(-1.0, 0.0, 3.0), Point3D::new(1.0, 0.0, 3.0)]
    );

    // Parallel to the axis.
    let r = Ray::new(Point3D::new(0.5, 0.0, 0.0), Vector::new(0.0, 0.0, 1.0).unwrap());
    assert!(tube.find_intersections(&r).is_empty());

    // Tangent.
    let r = Ray::new(Point3D::new(-5.0, 1.0, 0.0), Vector::new(1.0, 0.0, 0.0).unwrap());
    assert!(tube.find_intersections(&r).is_empty());

    // From inside.
    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0).unwrap());
    assert_eq!(tube.find_intersections(&r), vec![Point3D::new(0.0, 1.0, 0.0)]);
}

#[test]
fn cylinder_normal() {
    let axis = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap());
    let cylinder = Cylinder::new(axis, 7.0, 7.0);

    // Round surface.
    assert_eq!(
        cylinder.normal(&Point3D::new(7.0, 0.0, 3.0)).unwrap(),
        Vector::new(1.0, 0.0, 0.0).unwrap()
    );
    // Bottom cap.
    assert_eq!(
        cylinder.normal(&Point3D::new(3.0, 0.0, 0.0)).unwrap(),
        Vector::new(0.0, 0.0, -1.0).unwrap()
    );
    // Top cap.
    assert_eq!(
        cylinder.normal(&Point3D::new(2.0, 1.0, 7.0)).unwrap(),
        Vector::new(0.0, 0.0, 1.0).unwrap()
    );
}

#[test]
fn ray_through_cylinder() {
    let axis = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap());
    let cylinder = Cylinder::new(axis, 1.0, 2.0);

    // Through the round surface.
    let r = Ray::new(Point3D::new(-5.0, 0.0, 1.0), Vector::new(1.0, 0.0, 0.0).unwrap());
    assert_eq!(
        cylinder.find_intersections(&r),
        vec![Point3D::new(-1.0, 0.0, 1.0), Point3D::new(1.0, 0.0, 1.0)]
    );

    // Above the top: misses.
    let r = Ray::new(Point3D::new(-5.0, 0.0, 3.0), Vector::new(1.0, 0.0, 0.0).unwrap());
    assert!(cylinder.find_intersections(&r).is_empty());

    // Along the axis: both caps.
    let r = Ray::new(Point3D::new(0.0, 0.0, -1.0), Vector::new(0.0, 0.0, 1.0).unwrap());
    assert_eq!(
        cylinder.find_intersections(&r),
        vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(0.0, 0.0, 2.0)]
    );

    // Through the bottom cap and out the side.
    let r = Ray::new(Point3D::new(0.0, 0.0, -1.0), Vector::new(0.5, 0.0, 1.0).unwrap());
    assert_eq!(
        cylinder.find_intersections(&r),
        vec![Point3D::new(0.5, 0.0, 0.0), Point3D::new(1.0, 0.0, 1.0)]
    );

    // Grazing the rim of the bottom cap counts as a miss there.
    let r = Ray::new(Point3D::new(0.0, 0.0, -1.0), Vector::new(1.0, 0.0, 1.0).unwrap());
    assert!(cylinder.find_intersections(&r).is_empty());
}
