use crate::tuple::{ Point3D, Vector };
use crate::intersect::GeoPoint;

/// A ray: an origin and a unit direction.
///
/// The direction is normalized on construction, whatever length the caller
/// passes in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    origin: Point3D,
    direction: Vector,
}

impl Ray {
    pub fn new(origin: Point3D, direction: Vector) -> Ray {
        Ray { origin, direction: direction.normalized() }
    }

    /// Creates a ray leaving a surface point.
    ///
    /// The origin is pushed `delta` along `normal`, on the same side of the
    /// surface as `direction`, so the new ray does not hit the surface it
    /// starts from ("acne").
    pub fn offset(point: Point3D, direction: Vector, normal: &Vector,
        delta: f64) -> Ray {
        let side = if normal.dot(&direction) > 0.0 { delta } else { -delta };
        Ray::new(point + *normal * side, direction)
    }

    pub fn origin(&self) -> Point3D {
        self.origin
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }

    /// The point at parameter `t` along the ray.
    pub fn point_at(&self, t: f64) -> Point3D {
        self.origin + self.direction * t
    }

    /// Finds the point closest to the ray origin.
    pub fn find_closest_point(&self, points: &[Point3D]) -> Option<Point3D> {
        points.iter()
            .copied()
            .min_by(|a, b| {
                a.distance_squared(&self.origin)
                    .partial_cmp(&b.distance_squared(&self.origin))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Finds the intersection closest to the ray origin.
    ///
    /// Returns `None` for an empty slice. The result does not depend on the
    /// order of `points`.
    pub fn find_closest_geo_point<'a>(&self, points: &[GeoPoint<'a>])
        -> Option<GeoPoint<'a>> {
        let mut closest: Option<GeoPoint<'a>> = None;
        let mut closest_distance = f64::INFINITY;

        for gp in points.iter() {
            let distance = gp.point.distance_squared(&self.origin);
            if distance < closest_distance {
                closest_distance = distance;
                closest = Some(*gp);
            }
        }

        closest
    }
}

/* Tests */

#[test]
fn direction_is_normalized() {
    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, -5.0).unwrap());

    assert_eq!(r.direction(), Vector::new(0.0, 0.0, -1.0).unwrap());
    assert_eq!(r.point_at(2.5), Point3D::new(0.0, 0.0, -2.5));
}

#[test]
fn offset_follows_direction_side() {
    let normal = Vector::new(0.0, 1.0, 0.0).unwrap();
    let p = Point3D::new(1.0, 0.0, 1.0);

    let up = Ray::offset(p, Vector::new(1.0, 1.0, 0.0).unwrap(), &normal, 0.1);
    assert_eq!(up.origin(), Point3D::new(1.0, 0.1, 1.0));

    let down = Ray::offset(p, Vector::new(1.0, -1.0, 0.0).unwrap(), &normal, 0.1);
    assert_eq!(down.origin(), Point3D::new(1.0, -0.1, 1.0));
}

#[test]
fn closest_point() {
    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0).unwrap());
    let near = Point3D::new(0.0, 0.0, 1.0);
    let mid = Point3D::new(0.0, 0.0, 2.0);
    let far = Point3D::new(0.0, 0.0, 3.0);

    assert_eq!(r.find_closest_point(&[]), None);
    assert_eq!(r.find_closest_point(&[mid, near, far]), Some(near));
}

#[test]
fn closest_geo_point_independent_of_order() {
    use crate::shape::Sphere;

    let s = Sphere::new(Point3D::ZERO, 1.0);
    let r = Ray::new(Point3D::new(0.0, 0.0, -10.0),
        Vector::new(0.0, 0.0, 1.0).unwrap());

    let near = GeoPoint::new(&s, Point3D::new(0.0, 0.0, -1.0));
    let mid = GeoPoint::new(&s, Point3D::new(0.0, 0.0, 0.0));
    let far = GeoPoint::new(&s, Point3D::new(0.0, 0.0, 1.0));

    assert_eq!(r.find_closest_geo_point(&[]), None);
    assert_eq!(r.find_closest_geo_point(&[near, mid, far]), Some(near));
    assert_eq!(r.find_closest_geo_point(&[mid, near, far]), Some(near));
    assert_eq!(r.find_closest_geo_point(&[mid, far, near]), Some(near));
}
