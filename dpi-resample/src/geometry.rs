// SPDX-License-Identifier: MIT
//! # Geometry and Bitmap Surfaces
//!
//! Plain value types shared by the resampler and its callers. A [`Bitmap`] is a
//! tightly packed RGBA8 buffer (straight alpha, row-major, no stride padding).
//!
//! ## Source Origin Convention
//!
//! Rasterizers that treat a source coordinate as a pixel *center* read half a
//! pixel past the right and bottom edges unless the source rectangle starts at
//! `-0.5`. [`SourceRect::pixel_corner`] builds that rectangle; every draw issued
//! by the rescaler uses it regardless of the resampling mode.

use crate::cpu::ScaleError;

/// Offset applied to both source axes so the origin lands on a pixel corner.
pub const HALF_PIXEL_ORIGIN: f64 = -0.5;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of bytes an RGBA8 buffer of this size occupies.
    pub fn rgba_len(&self) -> usize {
        (self.w as usize) * (self.h as usize) * 4
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Sub-pixel source rectangle handed to a rendering surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SourceRect {
    /// Whole-image source rectangle shifted by [`HALF_PIXEL_ORIGIN`] on both axes.
    pub fn pixel_corner(size: Size) -> Self {
        Self {
            x: HALF_PIXEL_ORIGIN,
            y: HALF_PIXEL_ORIGIN,
            w: size.w as f64,
            h: size.h as f64,
        }
    }
}

/// Owned RGBA8 raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    size: Size,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Allocate a fully transparent canvas.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![0; size.rgba_len()],
        }
    }

    /// Allocate a canvas filled with a single RGBA color.
    pub fn filled(size: Size, rgba: [u8; 4]) -> Self {
        let mut bitmap = Self::new(size);
        fill_rgba(&mut bitmap.pixels, rgba);
        bitmap
    }

    /// Wrap an existing tightly packed RGBA8 buffer.
    pub fn from_rgba(size: Size, pixels: Vec<u8>) -> Result<Self, ScaleError> {
        if pixels.len() != size.rgba_len() {
            return Err(ScaleError::BufferSizeMismatch {
                expected: size.rgba_len(),
                actual: pixels.len(),
            });
        }
        Ok(Self { size, pixels })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.w
    }

    pub fn height(&self) -> u32 {
        self.size.h
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.w || y >= self.size.h {
            return None;
        }
        let i = ((y as usize) * (self.size.w as usize) + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }

    /// Overwrite the pixel at `(x, y)`. Out-of-range writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.size.w || y >= self.size.h {
            return;
        }
        let i = ((y as usize) * (self.size.w as usize) + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }
}

#[inline]
fn fill_rgba(dst: &mut [u8], bg: [u8; 4]) {
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_corner_shifts_both_axes() {
        let rect = SourceRect::pixel_corner(Size::new(16, 8));
        assert_eq!(rect.x, -0.5);
        assert_eq!(rect.y, -0.5);
        assert_eq!(rect.w, 16.0);
        assert_eq!(rect.h, 8.0);
    }

    #[test]
    fn from_rgba_rejects_short_buffers() {
        let err = Bitmap::from_rgba(Size::new(2, 2), vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            ScaleError::BufferSizeMismatch { expected: 16, actual: 15 }
        ));
    }

    #[test]
    fn pixel_access_is_bounds_checked() {
        let mut bmp = Bitmap::filled(Size::new(3, 2), [1, 2, 3, 4]);
        assert_eq!(bmp.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(bmp.pixel(3, 0), None);

        bmp.put_pixel(1, 1, [9, 9, 9, 9]);
        bmp.put_pixel(7, 7, [5, 5, 5, 5]);
        assert_eq!(bmp.pixel(1, 1), Some([9, 9, 9, 9]));
    }

    #[test]
    fn empty_sizes() {
        assert!(Size::new(0, 5).is_empty());
        assert!(Size::new(5, 0).is_empty());
        assert!(!Size::new(1, 1).is_empty());
        assert_eq!(Size::new(4, 3).to_string(), "4x3");
    }
}
