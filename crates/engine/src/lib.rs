// Library crate: the image-to-solid pipeline, exporters and test support.
// The `relief` binary is a thin CLI over `pipeline` and `export`.

pub mod config;
pub mod contour;
pub mod error;
pub mod export;
pub mod extrude;
pub mod field;
pub mod fixtures;
pub mod geometry;
pub mod heightfield;
pub mod hierarchy;
pub mod mesh;
pub mod pipeline;
pub mod simplify;
pub mod validation;

pub use config::PipelineConfig;
pub use error::{Diagnostic, MeshBuildError, ReliefError, Result};
pub use mesh::Mesh;
pub use pipeline::{generate, generate_from_image, BuildOutput};
