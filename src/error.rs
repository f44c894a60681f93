//! Error types for terrain generation

/// Errors raised while configuring, generating or exporting a heightfield.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error("invalid grid dimensions {width}x{height}: both sides must be at least 3 cells")]
    InvalidDimension { width: usize, height: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("could not allocate a heightfield of {cells} cells")]
    OutOfMemory { cells: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}

impl TerrainError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { name, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, TerrainError>;
