//! Error and diagnostic types for the relief pipeline.

use std::fmt;

use thiserror::Error;

/// Errors that stop a build before or instead of producing a mesh.
#[derive(Error, Debug)]
pub enum ReliefError {
    /// The source image could not be read or decoded.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The pixel buffer does not hold `resolution² × 4` bytes.
    #[error("pixel buffer has {actual} bytes, expected {expected} for resolution {resolution}")]
    PixelBufferSize {
        resolution: u32,
        expected: usize,
        actual: usize,
    },

    /// Resolution must be positive.
    #[error("resolution must be at least 1")]
    ZeroResolution,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for relief operations.
pub type Result<T> = std::result::Result<T, ReliefError>;

/// Merging sub-meshes failed because their attribute layouts disagree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshBuildError {
    #[error("mesh part {part} has {positions} positions but {normals} normals")]
    AttributeMismatch {
        part: usize,
        positions: usize,
        normals: usize,
    },

    #[error("mesh part {part} has {positions} vertices, not a whole number of triangles")]
    PartialTriangle { part: usize, positions: usize },
}

/// Recoverable conditions reported alongside a (possibly empty) mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// No contour was traced at the current threshold; the mesh is empty.
    EmptyResult { threshold: f64 },
    /// Hole contours whose enclosing solid was never instantiated.
    OrphanHoles { count: usize },
    /// A polygon's caps could not be triangulated; the polygon was skipped.
    Triangulation { polygon: usize },
    /// A merge failed; the last successfully merged mesh was kept.
    MeshBuild(MeshBuildError),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyResult { threshold } => {
                write!(f, "no contours at threshold {threshold:.2}, nothing to export")
            }
            Diagnostic::OrphanHoles { count } => {
                write!(f, "{count} hole contour(s) had no enclosing solid and were dropped")
            }
            Diagnostic::Triangulation { polygon } => {
                write!(f, "polygon {polygon} could not be triangulated and was skipped")
            }
            Diagnostic::MeshBuild(e) => write!(f, "mesh merge failed, kept partial mesh: {e}"),
        }
    }
}
