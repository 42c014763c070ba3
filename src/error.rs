//! Error types for the rasterizer pipeline

use thiserror::Error;

/// A draw call that was rejected before it entered the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawCallError {
    #[error("vertex count {count} is not a multiple of 3")]
    VertexCount { count: usize },

    #[error("expected {expected} colors (one per triangle), got {actual}")]
    ColorCount { expected: usize, actual: usize },

    #[error("expected {expected} uvs (one per vertex), got {actual}")]
    UvCount { expected: usize, actual: usize },

    #[error("draw call supplies both flat colors and a texture")]
    ConflictingShading,

    #[error("draw call supplies neither flat colors nor a texture")]
    MissingShading,

    #[error("uvs supplied without a texture")]
    MissingTexture,

    #[error("texture '{name}' has zero size")]
    EmptyTexture { name: String },
}

/// Errors returned by the public [`Rasterizer`](crate::Rasterizer) API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("invalid draw call: {0}")]
    InvalidDrawCall(#[from] DrawCallError),

    #[error("pipeline is closed")]
    ClosedPipeline,

    #[error("draw call {id} was never submitted (last issued id is {last_issued})")]
    UnknownDrawCall { id: u64, last_issued: u64 },
}

/// Errors while loading a pipeline configuration or starting a pipeline from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("{queue} capacity must be at least 1")]
    ZeroCapacity { queue: &'static str },

    #[error("failed to spawn pipeline worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Errors while decoding a texture image.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture '{name}' has {actual} indices, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}
