use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Canonical glyph height in the reference dataset.
pub const GLYPH_HEIGHT: u32 = 28;
/// Canonical raw glyph width before edge cropping.
pub const GLYPH_WIDTH: u32 = 28;
/// Anything at or above this magnitude counts as foreground.
pub const FOREGROUND_EPS: f32 = 1e-5;

/// Row-major grid of normalized intensities in `[0.0, 1.0]`.
///
/// Fixed row count (the glyph height), variable column count. Every
/// pipeline stage produces a fresh grid; nothing mutates one in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl PixelGrid {
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    /// Wraps an already-normalized buffer. `data` is row-major,
    /// `height * width` long.
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Builds a grid from raw dataset bytes, normalizing `u8` intensities
    /// into `[0.0, 1.0]`.
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), (width * height) as usize);
        Self {
            width,
            height,
            data: bytes.iter().map(|&b| f32::from(b) / 255.0).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, row: u32, col: u32) -> f32 {
        self.data[(row * self.width + col) as usize]
    }

    /// True if any pixel in `col` has foreground magnitude.
    pub fn column_has_foreground(&self, col: u32) -> bool {
        (0..self.height).any(|row| self.get(row, col).abs() >= FOREGROUND_EPS)
    }

    /// Copies columns `[from, to)` into a new grid of the same height.
    pub fn columns(&self, from: u32, to: u32) -> Self {
        debug_assert!(from <= to && to <= self.width);
        let mut data = Vec::with_capacity(((to - from) * self.height) as usize);
        for row in 0..self.height {
            let start = (row * self.width + from) as usize;
            let end = (row * self.width + to) as usize;
            data.extend_from_slice(&self.data[start..end]);
        }
        Self {
            width: to - from,
            height: self.height,
            data,
        }
    }

    /// Concatenates grids left to right. All parts must share one height;
    /// zero-width parts contribute nothing.
    pub fn hconcat(parts: &[PixelGrid]) -> Self {
        debug_assert!(!parts.is_empty());
        let height = parts[0].height;
        debug_assert!(parts.iter().all(|p| p.height == height));

        let width: u32 = parts.iter().map(|p| p.width).sum();
        let mut data = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            for part in parts {
                let start = (row * part.width) as usize;
                let end = start + part.width as usize;
                data.extend_from_slice(&part.data[start..end]);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Rescales from the `[0, 1]` glyph domain to the `[0, 256)` output
    /// domain: scale by 256, truncate, saturate at 255.
    pub fn quantize(&self) -> ComposedImage {
        ComposedImage {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| (v * 256.0) as u8).collect(),
        }
    }
}

/// Final output image: one byte per pixel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ComposedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, row: u32, col: u32) -> u8 {
        self.data[(row * self.width + col) as usize]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn to_gray(&self) -> GrayImage {
        // from_raw only fails when the buffer length disagrees with the
        // dimensions, which the constructor rules out
        GrayImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    pub fn from_gray(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}
