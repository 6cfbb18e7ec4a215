use std::fmt;
use std::io;

use thiserror::Error;

/// A resource which must be attached to a `Render` before it can run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    ImageWriter,
    RayTracer,
    Camera,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::ImageWriter => "image writer",
            Resource::RayTracer => "ray tracer",
            Resource::Camera => "camera",
        };

        write!(f, "{}", name)
    }
}

/// Errors raised while building or rendering a scene.
///
/// Numeric edge cases of ray tracing (parallel rays, tangent hits, lights
/// coinciding with a surface point) are never reported here; they are
/// ordinary "no hit" or "no contribution" outcomes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("vector cannot have zero length")]
    ZeroVector,

    #[error("camera `up` and `to` vectors are not orthogonal")]
    NonOrthogonalBasis,

    #[error("plane cannot be defined: {0}")]
    DegeneratePlane(&'static str),

    #[error("triangle vertices are degenerate")]
    DegenerateTriangle,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("missing {0}")]
    MissingResource(Resource),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn missing_resource_names_resource() {
    let e = Error::MissingResource(Resource::Camera);
    assert_eq!(e.to_string(), "missing camera");
}
