//! Indexed-color software rasterizer core
//!
//! Features:
//! - Scanline triangle fill (top/bottom/middle vertex order)
//! - Affine texture mapping (no perspective correction)
//! - Vertex snapping (integer screen coordinates)
//! - Painter's algorithm by submission order (no depth buffer)

mod math;
mod types;
mod shader;
mod render;

pub use math::*;
pub use types::*;
pub use shader::*;
pub use render::*;

/// Default back buffer dimensions (320x200 VGA mode)
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 200;
