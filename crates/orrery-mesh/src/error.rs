//! Mesh construction errors.

/// Invalid input at the mesh-build boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// Radius must be finite and strictly positive.
    #[error("icosphere radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    /// Subdivision level above the supported maximum.
    #[error("subdivision level {level} exceeds maximum {max}")]
    SubdivisionTooDeep { level: u32, max: u32 },
}
