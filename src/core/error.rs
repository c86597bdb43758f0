//! Error types for the probe renderer

use thiserror::Error;

/// Main error type for host-side setup.
///
/// The per-texel kernel itself never fails; everything here comes from
/// building resources or loading configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Shadow map error: {0}")]
    ShadowMap(String),

    #[error("Terrain buffer error: {0}")]
    Terrain(String),

    #[error("Noise volume error: {0}")]
    Volume(String),
}
