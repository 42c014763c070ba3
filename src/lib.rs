//! Warp: concurrent software rasterizer for indexed-color framebuffers
//!
//! Geometry is submitted as draw calls (vertices + transform + flat colors or
//! a texture) and flows through two worker threads:
//! - Transform stage: applies the transform and emits sorted triangles
//! - Rasterize stage: scanline-fills triangles into the shared framebuffer
//!
//! Callers synchronize with [`Rasterizer::wait`] / [`Rasterizer::sync`]
//! before reading the framebuffer.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod pipeline;
pub mod rasterizer;

pub use error::{ConfigError, DrawCallError, RasterError, TextureError};
pub use pipeline::{load_config, DrawCallDesc, PipelineConfig, Rasterizer};
pub use rasterizer::{
    Color, FlatShader, Framebuffer, IndexedTarget, Mat4, Palette, PixelShader, Texture,
    TexturedShader, Vec2, Vec3,
};
