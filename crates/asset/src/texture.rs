//! RGBA8 texture data for GPU upload.

use std::path::Path;

use anyhow::{Context, Result};

/// Texture pixels in CPU memory, always tightly-packed RGBA8.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "data size doesn't match RGBA8 dimensions"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Load a PNG file and convert to RGBA8.
    pub fn load_png(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to open image {}", path.display()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded texture {}: {}x{}", path.display(), width, height);
        Ok(Self::new_rgba8(width, height, rgba.into_raw()))
    }

    /// Procedural checkerboard, the sandbox's default diffuse.
    pub fn checkerboard(size: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    data.extend_from_slice(&[220, 220, 220, 255]);
                } else {
                    data.extend_from_slice(&[90, 90, 90, 255]);
                }
            }
        }
        Self::new_rgba8(size, size, data)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == (self.width * self.height * 4) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_is_valid() {
        let tex = TextureData::checkerboard(16, 4);
        assert!(tex.is_valid());
        assert_eq!(tex.data.len(), 16 * 16 * 4);
        // opposite cells differ
        assert_ne!(tex.data[0], tex.data[(4 * 4) as usize]);
    }
}
