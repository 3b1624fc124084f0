//! Planet bodies: generated terrain mesh, outer radius, surface gravity and
//! the atmosphere shell built around them.

mod atmosphere;
mod body;

pub use atmosphere::{AtmosphereParams, AtmosphereShell, SHELL_EXPAND, SHELL_THICKNESS};
pub use body::PlanetBody;

use orrery_mesh::MeshError;

/// Errors from planet generation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanetError {
    /// The mesh could not be built from the current config.
    #[error("planet mesh generation failed: {0}")]
    Mesh(#[from] MeshError),
}
