//! Core types for the rasterizer: colors, palettes and indexed surfaces

use crate::error::TextureError;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to [u8; 4] for RGBA output
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn distance_sq(self, other: Color) -> i32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        dr * dr + dg * dg + db * db
    }
}

/// 256-entry index -> RGB lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Color; 256],
}

impl Palette {
    /// Build from a color list. Missing entries are black, extras are ignored.
    pub fn from_colors(colors: &[Color]) -> Self {
        let mut table = [Color::BLACK; 256];
        for (slot, color) in table.iter_mut().zip(colors) {
            *slot = *color;
        }
        Self { colors: table }
    }

    pub fn get(&self, index: u8) -> Color {
        self.colors[index as usize]
    }

    pub fn set(&mut self, index: u8, color: Color) {
        self.colors[index as usize] = color;
    }

    /// Index of the closest entry (RGB distance, lowest index wins ties)
    pub fn nearest(&self, color: Color) -> u8 {
        let mut best = 0;
        let mut best_dist = i32::MAX;
        for (i, entry) in self.colors.iter().enumerate() {
            let dist = entry.distance_sq(color);
            if dist < best_dist {
                best = i;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

impl Default for Palette {
    /// 6x6x6 color cube (indices 0-215) followed by a 40 step grey ramp
    fn default() -> Self {
        let mut colors = [Color::BLACK; 256];
        for (i, slot) in colors.iter_mut().enumerate().take(216) {
            let r = (i / 36) as u8 * 51;
            let g = ((i / 6) % 6) as u8 * 51;
            let b = (i % 6) as u8 * 51;
            *slot = Color::new(r, g, b);
        }
        for k in 0..40 {
            let v = ((k + 1) * 255 / 41) as u8;
            colors[216 + k] = Color::new(v, v, v);
        }
        Self { colors }
    }
}

/// Surface of 8-bit palette indices that the rasterizer writes into.
///
/// Out-of-range coordinates are ignored by `set_index` and read back as 0.
pub trait IndexedTarget {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn get_index(&self, x: usize, y: usize) -> u8;
    fn set_index(&mut self, x: usize, y: usize, index: u8);
}

/// Indexed framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>, // One palette index per pixel
    pub width: usize,
    pub height: usize,
    palette: Palette,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_palette(width, height, Palette::default())
    }

    pub fn with_palette(width: usize, height: usize, palette: Palette) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
            palette,
        }
    }

    pub fn clear(&mut self, index: u8) {
        self.pixels.fill(index);
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Expand indices through the palette into `out` (4 bytes per pixel).
    /// Stops early if `out` is shorter than the framebuffer.
    pub fn write_rgba(&self, out: &mut [u8]) {
        for (dst, &index) in out.chunks_exact_mut(4).zip(&self.pixels) {
            dst.copy_from_slice(&self.palette.get(index).to_bytes());
        }
    }

    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = vec![0; self.pixels.len() * 4];
        self.write_rgba(&mut out);
        out
    }
}

impl IndexedTarget for Framebuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn get_index(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            0
        }
    }

    fn set_index(&mut self, x: usize, y: usize, index: u8) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = index;
        }
    }
}

/// Read-only texture of palette indices
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
            name: String::new(),
        }
    }

    pub fn from_indices(
        width: usize,
        height: usize,
        pixels: Vec<u8>,
        name: impl Into<String>,
    ) -> Result<Self, TextureError> {
        let name = name.into();
        if pixels.len() != width * height {
            return Err(TextureError::SizeMismatch {
                name,
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels, name })
    }

    /// Load a texture from an image file, quantized to `palette`
    pub fn from_file<P: AsRef<std::path::Path>>(path: P, palette: &Palette) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Decode {
            name: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let texture = Self::quantize(img, name, palette);
        log::info!("Loaded texture: {} ({}x{})", texture.name, texture.width, texture.height);
        Ok(texture)
    }

    /// Load texture from encoded image bytes, quantized to `palette`
    pub fn from_bytes(bytes: &[u8], name: String, palette: &Palette) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            name: name.clone(),
            source,
        })?;
        Ok(Self::quantize(img, name, palette))
    }

    fn quantize(img: image::DynamicImage, name: String, palette: &Palette) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .pixels()
            .map(|p| palette.nearest(Color::new(p[0], p[1], p[2])))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Create a checkerboard test texture (4x4 texel squares)
    pub fn checkerboard(width: usize, height: usize, index1: u8, index2: u8) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { index1 } else { index2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get index at x,y coordinates (0 outside the texture)
    pub fn get_index(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            0
        }
    }

    /// Nearest-texel lookup. UVs are clamped to [0, 1] first.
    pub fn sample_nearest(&self, u: f32, v: f32) -> u8 {
        if self.is_empty() {
            return 0;
        }
        let max_x = self.width - 1;
        let max_y = self.height - 1;

        // NaN survives clamp but saturates to 0 in the cast
        let tx = (u.clamp(0.0, 1.0) * max_x as f32).round() as usize;
        let ty = (v.clamp(0.0, 1.0) * max_y as f32).round() as usize;

        self.pixels[ty.min(max_y) * self.width + tx.min(max_x)]
    }
}
