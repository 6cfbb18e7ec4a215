use crate::is_zero;
use crate::error::{ Error, Result };
use crate::tuple::{ Point3D, Vector };
use crate::ray::Ray;

/// A pinhole camera.
///
/// The camera sits at `origin` looking along `to`, with `up` and `right`
/// completing an orthonormal basis. The view plane lies `distance` along
/// `to`, is `width` by `height` in scene units, and is split into the pixel
/// grid of whatever image is being rendered.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    origin: Point3D,
    to: Vector,
    up: Vector,
    right: Vector,

    width: f64,
    height: f64,
    distance: f64,
}

impl Camera {
    /// Creates a camera with a 1x1 view plane at distance 1.
    ///
    /// Fails with `Error::NonOrthogonalBasis` if `to` and `up` are not
    /// orthogonal.
    pub fn new(origin: Point3D, to: Vector, up: Vector) -> Result<Camera> {
        let to = to.normalized();
        let up = up.normalized();

        if !is_zero(up.dot(&to)) {
            return Err(Error::NonOrthogonalBasis);
        }

        let right = to.cross(&up)?.normalized();

        Ok(Camera {
            origin,
            to,
            up,
            right,
            width: 1.0,
            height: 1.0,
            distance: 1.0,
        })
    }

    pub fn with_view_plane_size(mut self, width: f64, height: f64) -> Camera {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Camera {
        self.distance = distance;
        self
    }

    pub fn origin(&self) -> Point3D {
        self.origin
    }

    pub fn to(&self) -> Vector {
        self.to
    }

    pub fn up(&self) -> Vector {
        self.up
    }

    pub fn right(&self) -> Vector {
        self.right
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// The center of the view plane.
    fn view_plane_center(&self) -> Point3D {
        self.origin + self.to * self.distance
    }

    /// Creates the ray through the center of pixel (`col`, `row`) of an
    /// `nx` by `ny` grid laid over the view plane.
    ///
    /// Row 0 is at the top, following `up`.
    pub fn construct_ray_through_pixel(&self, nx: usize, ny: usize,
        col: usize, row: usize) -> Ray {
        let rx = self.width / nx as f64;
        let ry = self.height / ny as f64;

        let xj = (col as f64 - (nx as f64 - 1.0) / 2.0) * rx;
        let yi = -(row as f64 - (ny as f64 - 1.0) / 2.0) * ry;

        let pij = self.view_plane_center()
            + self.right * xj
            + self.up * yi;

        self.construct_ray_through_point(pij)
    }

    /// Creates the ray from the camera through `point`.
    ///
    /// A point at the camera origin gives the ray straight along `to`.
    pub fn construct_ray_through_point(&self, point: Point3D) -> Ray {
        match point.subtract(&self.origin) {
            Ok(direction) => Ray::new(self.origin, direction),
            Err(_) => Ray::new(self.origin, self.to),
        }
    }

    /// Where a ray from the camera pierces the view plane.
    ///
    /// A ray running parallel to the view plane never reaches it; its
    /// center is returned instead.
    pub fn view_plane_point(&self, ray: &Ray) -> Point3D {
        let cos = ray.direction().dot(&self.to);

        if is_zero(cos) {
            return self.view_plane_center();
        }

        ray.point_at(self.distance / cos)
    }

    /// Creates `grid * grid` rays through the centers of an even grid of
    /// sub-cells covering the pixel pierced by `center_ray`.
    pub fn supersampling_rays(&self, center_ray: &Ray, grid: usize,
        nx: usize, ny: usize) -> Vec<Ray> {
        let pc = self.view_plane_point(center_ray);

        let cell_width = self.width / nx as f64 / grid as f64;
        let cell_height = self.height / ny as f64 / grid as f64;
        let half = (grid as f64 - 1.0) / 2.0;

        let mut rays = Vec::with_capacity(grid * grid);
        for i in 0..grid {
            for j in 0..grid {
                let x = (j as f64 - half) * cell_width;
                let y = -(i as f64 - half) * cell_height;

                let point = pc + self.right * x + self.up * y;
                rays.push(self.construct_ray_through_point(point));
            }
        }

        rays
    }
}

/* Tests */

#[test]
fn camera_basis() {
    let c = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, -2.0).unwrap(),
        Vector::new(0.0, 3.0, 0.0).unwrap(),
    ).unwrap();

    assert_eq!(c.to(), Vector::new(0.0, 0.0, -1.0).unwrap());
    assert_eq!(c.up(), Vector::new(0.0, 1.0, 0.0).unwrap());
    assert_eq!(c.right(), Vector::new(1.0, 0.0, 0.0).unwrap());
}

#[test]
fn camera_rejects_skewed_basis() {
    let c = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, -1.0).unwrap(),
        Vector::new(0.0, 1.0, 1.0).unwrap(),
    );

    assert!(matches!(c, Err(Error::NonOrthogonalBasis)));
}

#[test]
fn ray_through_pixels() {
    let c = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, -1.0).unwrap(),
        Vector::new(0.0, 1.0, 0.0).unwrap(),
    ).unwrap()
        .with_view_plane_size(6.0, 6.0)
        .with_distance(10.0);

    // 3x3: the center pixel looks straight ahead.
    let r = c.construct_ray_through_pixel(3, 3, 1, 1);
    assert_eq!(r.origin(), Point3D::ZERO);
    assert_eq!(r.direction(), Vector::new(0.0, 0.0, -1.0).unwrap());

    // 4x4: the top left pixel sits up and to the left.
    let r = c.construct_ray_through_pixel(4, 4, 0, 0);
    assert_eq!(r.direction(), Vector::new(-2.25, 2.25, -10.0).unwrap().normalized());

    // 3x4: the top middle pixel.
    let r = c.construct_ray_through_pixel(3, 4, 1, 0);
    assert_eq!(r.direction(), Vector::new(0.0, 2.25, -10.0).unwrap().normalized());
}

#[test]
fn ray_through_point_at_origin() {
    let c = Camera::new(
        Point3D::new(1.0, 2.0, 3.0),
        Vector::new(0.0, 0.0, -1.0).unwrap(),
        Vector::new(0.0, 1.0, 0.0).unwrap(),
    ).unwrap();

    let r = c.construct_ray_through_point(Point3D::new(1.0, 2.0, 3.0));
    assert_eq!(r.direction(), c.to());
}

#[test]
fn view_plane_point_of_ray() {
    let c = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, -1.0).unwrap(),
        Vector::new(0.0, 1.0, 0.0).unwrap(),
    ).unwrap()
        .with_distance(2.0);

    let r = Ray::new(Point3D::ZERO, Vector::new(1.0, 0.0, -1.0).unwrap());
    assert_eq!(c.view_plane_point(&r), Point3D::new(2.0, 0.0, -2.0));
}

#[test]
fn supersampling_rays_cover_pixel() {
    let c = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, -1.0).unwrap(),
        Vector::new(0.0, 1.0, 0.0).unwrap(),
    ).unwrap()
        .with_view_plane_size(3.0, 3.0)
        .with_distance(1.0);

    let center = c.construct_ray_through_pixel(3, 3, 1, 1);
    let rays = c.supersampling_rays(&center, 3, 3, 3);
    assert_eq!(rays.len(), 9);

    // The middle sub-cell is the pixel center; corners are a third inward.
    assert_eq!(rays[4].direction(), center.direction());
    assert_eq!(
        c.view_plane_point(&rays[0]),
        Point3D::new(-1.0 / 3.0, 1.0 / 3.0, -1.0)
    );
    assert_eq!(
        c.view_plane_point(&rays[8]),
        Point3D::new(1.0 / 3.0, -1.0 / 3.0, -1.0)
    );

    // A single-cell grid is just the center ray.
    let rays = c.supersampling_rays(&center, 1, 3, 3);
    assert_eq!(rays, vec![center]);
}

#[cfg(test)]
fn count_view_plane_hits(camera: Camera,
    geometry: &dyn crate::intersect::Intersectable) -> usize {
    let camera = camera.with_view_plane_size(3.0, 3.0).with_distance(1.0);

    let mut count = 0;
    for row in 0..3 {
        for col in 0..3 {
            let ray = camera.construct_ray_through_pixel(3, 3, col, row);
            count += geometry.find_geo_intersections(&ray).len();
        }
    }

    count
}

#[test]
fn camera_rays_against_spheres() {
    use crate::shape::Sphere;

    let to = Vector::new(0.0, 0.0, -1.0).unwrap();
    let up = Vector::new(0.0, -1.0, 0.0).unwrap();
    let c1 = Camera::new(Point3D::ZERO, to, up).unwrap();
    let c2 = Camera::new(Point3D::new(0.0, 0.0, 0.5), to, up).unwrap();

    // Small sphere in front.
    assert_eq!(count_view_plane_hits(c1, &Sphere::new(Point3D::new(0.0, 0.0, -3.0), 1.0)), 2);
    // Big sphere filling the view.
    assert_eq!(count_view_plane_hits(c2, &Sphere::new(Point3D::new(0.0, 0.0, -2.5), 2.5)), 18);
    // Medium sphere missing the corners.
    assert_eq!(count_view_plane_hits(c2, &Sphere::new(Point3D::new(0.0, 0.0, -2.0), 2.0)), 10);
    // Camera inside the sphere.
    assert_eq!(count_view_plane_hits(c2, &Sphere::new(Point3D::new(0.0, 0.0, -1.0), 4.0)), 9);
    // Sphere behind the camera.
    assert_eq!(count_view_plane_hits(c1, &Sphere::new(Point3D::new(0.0, 0.0, 1.0), 0.5)), 0);
}

#[test]
fn camera_rays_against_planes() {
    use crate::shape::Plane;

    let c = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, -1.0).unwrap(),
        Vector::new(0.0, -1.0, 0.0).unwrap(),
    ).unwrap();
    let p0 = Point3D::new(0.0, 0.0, -5.0);

    // Facing the camera.
    assert_eq!(count_view_plane_hits(c, &Plane::new(p0, Vector::new(0.0, 0.0, 1.0).unwrap())), 9);
    // Slightly tilted.
    assert_eq!(count_view_plane_hits(c, &Plane::new(p0, Vector::new(0.0, 1.0, 2.0).unwrap())), 9);
    // Parallel to one row of rays.
    assert_eq!(count_view_plane_hits(c, &Plane::new(p0, Vector::new(0.0, 1.0, 1.0).unwrap())), 6);
}

#[test]
fn camera_rays_against_triangles() {
    use crate::shape::Triangle;

    let c = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, -1.0).unwrap(),
        Vector::new(0.0, -1.0, 0.0).unwrap(),
    ).unwrap();

    let small = Triangle::new(
        Point3D::new(1.0, 1.0, -2.0),
        Point3D::new(-1.0, 1.0, -2.0),
        Point3D::new(0.0, -1.0, -2.0),
    ).unwrap();
    assert_eq!(count_view_plane_hits(c, &small), 1);

    let tall = Triangle::new(
        Point3D::new(1.0, 1.0, -2.0),
        Point3D::new(-1.0, 1.0, -2.0),
        Point3D::new(0.0, -20.0, -2.0),
    ).unwrap();
    assert_eq!(count_view_plane_hits(c, &tall), 2);
}
