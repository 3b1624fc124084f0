//! Triangle mesh data and the icosphere generator used for every planet.

mod color;
mod error;
mod icosphere;
mod mesh;

pub use color::Color;
pub use error::MeshError;
pub use icosphere::{
    IcoSphere, MAX_SUBDIVISION, triangle_count_for_level, vertex_count_for_level,
};
pub use mesh::{Bounds, Mesh};
