use std::convert::TryFrom;
use std::ops::{ Add, Sub, Neg, Mul };

use crate::{ feq, is_zero };
use crate::error::{ Error, Result };

/// A raw triple of coordinates.
///
/// Unlike `Vector`, a `Tuple3D` may be zero. It is what falls out of
/// subtracting two points or scaling a vector, before anyone has decided
/// whether the result is a usable direction.
#[derive(Debug, Default, Copy, Clone)]
pub struct Tuple3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Tuple3D {
    fn eq(&self, other: &Tuple3D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Tuple3D {
    pub fn new(x: f64, y: f64, z: f64) -> Tuple3D {
        Tuple3D { x, y, z }
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.x.powi(2) + self.y.powi(2) + self.z.powi(2)
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn dot(&self, other: &Tuple3D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn cross(&self, other: &Tuple3D) -> Tuple3D {
        Tuple3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn is_zero(&self) -> bool {
        is_zero(self.x) && is_zero(self.y) && is_zero(self.z)
    }
}

impl Add for Tuple3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Tuple3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Tuple3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

impl Mul<f64> for Tuple3D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

/// A point in 3D space.
///
/// Points are compared coordinate-wise with `feq`, so two points which only
/// differ by floating point drift are equal.
#[derive(Debug, Default, Copy, Clone)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Point3D {
    fn eq(&self, other: &Point3D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Point3D {
    /// The origin.
    pub const ZERO: Point3D = Point3D { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Point3D {
        Point3D { x, y, z }
    }

    /// Creates the vector pointing from `other` to `self`.
    ///
    /// Fails with `Error::ZeroVector` if both points coincide.
    pub fn subtract(&self, other: &Point3D) -> Result<Vector> {
        Vector::try_from(*self - *other)
    }

    pub fn distance_squared(&self, other: &Point3D) -> f64 {
        (*self - *other).magnitude_squared()
    }

    pub fn distance(&self, other: &Point3D) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(v: [f64; 3]) -> Point3D {
        Point3D::new(v[0], v[1], v[2])
    }
}

/// Subtracting points yields a raw displacement, which may be zero.
impl Sub for Point3D {
    type Output = Tuple3D;

    fn sub(self, other: Point3D) -> Tuple3D {
        Tuple3D {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Add<Tuple3D> for Point3D {
    type Output = Point3D;

    fn add(self, other: Tuple3D) -> Point3D {
        Point3D {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Add<Vector> for Point3D {
    type Output = Point3D;

    fn add(self, other: Vector) -> Point3D {
        self + other.head
    }
}

/// Moves a point along a borrowed vector, so `p.add(&v)` works as well as
/// `p + v`.
impl Add<&Vector> for Point3D {
    type Output = Point3D;

    fn add(self, other: &Vector) -> Point3D {
        self + other.head
    }
}

/// A direction in 3D space.
///
/// A `Vector` never has zero length; every constructor checks this, and
/// every operation which could produce a zero vector returns a `Result`.
/// Vectors are plain values; `normalized` returns a copy rather than
/// mutating in place.
///
/// # Examples
///
/// ```
/// # use phong_tracer::tuple::Vector;
/// let v = Vector::new(3.0, 0.0, 4.0).unwrap();
/// assert_eq!(v.length(), 5.0);
/// assert!(Vector::new(0.0, 0.0, 0.0).is_err());
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vector {
    head: Tuple3D,
}

impl TryFrom<Tuple3D> for Vector {
    type Error = Error;

    fn try_from(head: Tuple3D) -> Result<Vector> {
        if head.is_zero() {
            Err(Error::ZeroVector)
        } else {
            Ok(Vector { head })
        }
    }
}

impl Vector {
    pub fn new(x: f64, y: f64, z: f64) -> Result<Vector> {
        Vector::try_from(Tuple3D::new(x, y, z))
    }

    pub fn head(&self) -> Tuple3D {
        self.head
    }

    pub fn x(&self) -> f64 {
        self.head.x
    }

    pub fn y(&self) -> f64 {
        self.head.y
    }

    pub fn z(&self) -> f64 {
        self.head.z
    }

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        Vector::try_from(self.head + other.head)
    }

    pub fn subtract(&self, other: &Vector) -> Result<Vector> {
        Vector::try_from(self.head - other.head)
    }

    /// Scales the vector. Scaling by (nearly) zero is an error.
    pub fn scale(&self, scalar: f64) -> Result<Vector> {
        Vector::try_from(self.head * scalar)
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.head.dot(&other.head)
    }

    /// Fails if the two vectors are parallel.
    pub fn cross(&self, other: &Vector) -> Result<Vector> {
        Vector::try_from(self.head.cross(&other.head))
    }

    pub fn length_squared(&self) -> f64 {
        self.head.magnitude_squared()
    }

    pub fn length(&self) -> f64 {
        self.head.magnitude()
    }

    pub fn normalized(&self) -> Vector {
        let len = self.length();
        Vector { head: self.head * (1.0 / len) }
    }

    /// Reflects this vector about a (unit) normal: `v - 2(v·n)n`.
    pub fn reflect(&self, normal: &Vector) -> Result<Vector> {
        Vector::try_from(self.head - normal.head * (2.0 * self.dot(normal)))
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector { head: -self.head }
    }
}

/// Scaling a vector gives a raw tuple, since the scalar may be zero.
impl Mul<f64> for Vector {
    type Output = Tuple3D;

    fn mul(self, other: f64) -> Tuple3D {
        self.head * other
    }
}

/* Tests */

#[test]
fn zero_vector_rejected() {
    assert!(Vector::new(0.0, 0.0, 0.0).is_err());
    assert!(Vector::new(1e-9, 0.0, 0.0).is_err());
    assert!(Vector::new(1.0, 2.0, 3.0).is_ok());
}

#[test]
fn sub_points() {
    let p1 = Point3D::new(3.0, 2.0, 1.0);
    let p2 = Point3D::new(5.0, 6.0, 7.0);

    assert_eq!(p1.subtract(&p2).unwrap(), Vector::new(-2.0, -4.0, -6.0).unwrap());
    assert!(p1.subtract(&p1).is_err());
}

#[test]
fn add_vector_to_point() {
    let p = Point3D::new(1.0, 2.0, 3.0);
    let v = Vector::new(-1.0, -2.0, -3.0).unwrap();

    assert_eq!(p.add(&v), Point3D::ZERO);
    assert_eq!(p + v, Point3D::ZERO);
    assert_eq!(Point3D::ZERO.add(&v), Point3D::new(-1.0, -2.0, -3.0));
}

#[test]
fn add_and_subtract_vectors() {
    let v1 = Vector::new(1.0, 2.0, 3.0).unwrap();
    let v2 = Vector::new(-1.0, -2.0, -3.0).unwrap();

    assert!(v1.add(&v2).is_err());
    assert!(v1.subtract(&v1).is_err());
    assert_eq!(v1.subtract(&v2).unwrap(), Vector::new(2.0, 4.0, 6.0).unwrap());
}

#[test]
fn scale_vector() {
    let v = Vector::new(1.0, -2.0, 3.0).unwrap();

    assert_eq!(v.scale(2.0).unwrap(), Vector::new(2.0, -4.0, 6.0).unwrap());
    assert!(v.scale(0.0).is_err());
}

#[test]
fn point_distance() {
    let p1 = Point3D::new(1.0, 2.0, 3.0);
    let p2 = Point3D::new(4.0, 6.0, 3.0);

    assert_eq!(p1.distance_squared(&p2), 25.0);
    assert_eq!(p1.distance(&p2), 5.0);
}

#[test]
fn length_and_normalize() {
    let v = Vector::new(1.0, 2.0, 2.0).unwrap();
    let n = v.normalized();

    assert_eq!(v.length(), 3.0);
    assert!(feq(n.length(), 1.0));
    assert_eq!(n, Vector::new(1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0).unwrap());

    // `v` itself is untouched.
    assert_eq!(v.length(), 3.0);
}

#[test]
fn dot_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0).unwrap();
    let b = Vector::new(2.0, 3.0, 4.0).unwrap();

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0).unwrap();
    let b = Vector::new(2.0, 3.0, 4.0).unwrap();

    assert_eq!(a.cross(&b).unwrap(), Vector::new(-1.0, 2.0, -1.0).unwrap());
    assert_eq!(b.cross(&a).unwrap(), Vector::new(1.0, -2.0, 1.0).unwrap());

    let parallel = a.scale(-2.0).unwrap();
    assert!(a.cross(&parallel).is_err());
}

#[test]
fn reflect_45() {
    let v = Vector::new(1.0, -1.0, 0.0).unwrap();
    let n = Vector::new(0.0, 1.0, 0.0).unwrap();

    assert_eq!(v.reflect(&n).unwrap(), Vector::new(1.0, 1.0, 0.0).unwrap());
}
