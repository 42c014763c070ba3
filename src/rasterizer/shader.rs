//! Pixel shaders: the per-pixel sink of the scanline walk

use super::types::{IndexedTarget, Texture};

/// Writes one pixel. `u`/`v` are the interpolated texture coordinates
/// (unused by shaders that don't sample).
pub trait PixelShader {
    fn plot(&mut self, x: i32, y: i32, u: f32, v: f32);
}

/// Writes a single fixed palette index
pub struct FlatShader<'a, T: IndexedTarget + ?Sized> {
    target: &'a mut T,
    color: u8,
}

impl<'a, T: IndexedTarget + ?Sized> FlatShader<'a, T> {
    pub fn new(target: &'a mut T, color: u8) -> Self {
        Self { target, color }
    }
}

impl<T: IndexedTarget + ?Sized> PixelShader for FlatShader<'_, T> {
    fn plot(&mut self, x: i32, y: i32, _u: f32, _v: f32) {
        if x >= 0 && y >= 0 {
            self.target.set_index(x as usize, y as usize, self.color);
        }
    }
}

/// Writes the nearest texel of a texture
pub struct TexturedShader<'a, T: IndexedTarget + ?Sized> {
    target: &'a mut T,
    texture: &'a Texture,
}

impl<'a, T: IndexedTarget + ?Sized> TexturedShader<'a, T> {
    pub fn new(target: &'a mut T, texture: &'a Texture) -> Self {
        Self { target, texture }
    }
}

impl<T: IndexedTarget + ?Sized> PixelShader for TexturedShader<'_, T> {
    fn plot(&mut self, x: i32, y: i32, u: f32, v: f32) {
        if x >= 0 && y >= 0 {
            let index = self.texture.sample_nearest(u, v);
            self.target.set_index(x as usize, y as usize, index);
        }
    }
}
