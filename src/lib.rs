pub mod consts;
pub mod error;

pub mod tuple;
pub mod ray;
pub mod color;

pub mod intersect;
pub mod shape;
pub mod light;

pub mod scene;
pub mod tracer;
pub mod camera;

pub mod canvas;
pub mod parallel;
pub mod render;

pub use error::{ Error, Resource, Result };

use consts::FEQ_EPSILON;

/// Compares two floats, tolerating drift below `FEQ_EPSILON`.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}

/// Checks whether a float is effectively zero.
pub fn is_zero(value: f64) -> bool {
    value.abs() < FEQ_EPSILON
}

/// Snaps values within `FEQ_EPSILON` of zero to exactly zero.
///
/// Sign tests on dot products and ray parameters go through this, so a
/// rounding residue never decides which side of a surface a point is on.
pub fn align_zero(value: f64) -> f64 {
    if is_zero(value) { 0.0 } else { value }
}

#[test]
fn align_zero_snaps_residue() {
    assert_eq!(align_zero(1e-12), 0.0);
    assert_eq!(align_zero(-1e-12), 0.0);
    assert_eq!(align_zero(0.5), 0.5);
    assert!(feq(0.1 + 0.2, 0.3));
    assert!(!is_zero(0.01));
}
