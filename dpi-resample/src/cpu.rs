// SPDX-License-Identifier: MIT
// CPU drawing surface built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGBA8 out, direct write into the caller-provided destination bitmap.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{ResizeOptions, Resizer};

use crate::geometry::{Bitmap, HALF_PIXEL_ORIGIN, SourceRect};
use crate::mode::ResamplingMode;

#[derive(Debug)]
pub enum ScaleError {
    BufferSizeMismatch { expected: usize, actual: usize },
    EmptyImage,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::BufferSizeMismatch { expected, actual } => {
                write!(f, "RGBA buffer holds {} bytes, expected {}", actual, expected)
            }
            ScaleError::EmptyImage => write!(f, "Cannot draw to or from an empty image"),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}

/// Abstract drawing operation: draw `src_rect` of `src` over the whole of `dst`.
///
/// Implementations must honor `mode`. The rescaler always passes a source
/// rectangle whose origin is [`HALF_PIXEL_ORIGIN`]; a surface that samples by
/// pixel area rather than pixel center translates it back itself.
pub trait RenderSurface {
    fn draw_image(
        &mut self,
        src: &Bitmap,
        src_rect: SourceRect,
        dst: &mut Bitmap,
        mode: ResamplingMode,
    ) -> Result<(), ScaleError>;
}

/// SIMD CPU surface. Keeps one `Resizer` so its scratch buffers are reused
/// across draws.
#[derive(Default)]
pub struct CpuSurface {
    resizer: Resizer,
}

impl CpuSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for CpuSurface {
    fn draw_image(
        &mut self,
        src: &Bitmap,
        src_rect: SourceRect,
        dst: &mut Bitmap,
        mode: ResamplingMode,
    ) -> Result<(), ScaleError> {
        if src.size().is_empty() || dst.size().is_empty() {
            return Err(ScaleError::EmptyImage);
        }
        let (src_w, src_h) = (src.width(), src.height());
        let (dst_w, dst_h) = (dst.width(), dst.height());

        let src_view = TypedImageRef::<U8x4>::from_buffer(src_w, src_h, src.pixels())?;
        let mut dst_image = TypedImage::<U8x4>::from_buffer(dst_w, dst_h, dst.pixels_mut())?;

        // fast_image_resize already maps destination centers onto source areas,
        // so the pixel-corner origin is folded back into its crop box.
        let (left, width) = area_crop(src_rect.x, src_rect.w, src_w);
        let (top, height) = area_crop(src_rect.y, src_rect.h, src_h);

        let opts = ResizeOptions::new()
            .resize_alg(mode.to_resize_alg())
            .crop(left, top, width, height)
            .use_alpha(true);

        self.resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;
        Ok(())
    }
}

/// Convert one axis of a pixel-corner source rectangle into an in-bounds crop span.
#[inline]
fn area_crop(origin: f64, extent: f64, limit: u32) -> (f64, f64) {
    let limit = limit as f64;
    let start = (origin - HALF_PIXEL_ORIGIN).clamp(0.0, limit);
    let span = extent.min(limit - start).max(0.0);
    (start, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn checker(size: Size) -> Bitmap {
        let mut bmp = Bitmap::new(size);
        for y in 0..size.h {
            for x in 0..size.w {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                bmp.put_pixel(x, y, [v, v, v, 255]);
            }
        }
        bmp
    }

    #[test]
    fn area_crop_folds_back_half_pixel() {
        assert_eq!(area_crop(-0.5, 16.0, 16), (0.0, 16.0));
        assert_eq!(area_crop(0.0, 16.0, 16), (0.5, 15.5));
        assert_eq!(area_crop(-3.0, 4.0, 4), (0.0, 4.0));
    }

    #[test]
    fn nearest_doubling_replicates_pixels() {
        let src = checker(Size::new(2, 2));
        let mut dst = Bitmap::new(Size::new(4, 4));
        let mut surface = CpuSurface::new();
        surface
            .draw_image(
                &src,
                SourceRect::pixel_corner(src.size()),
                &mut dst,
                ResamplingMode::NearestNeighbor,
            )
            .unwrap();

        assert_eq!(dst.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(dst.pixel(1, 1), Some([255, 255, 255, 255]));
        assert_eq!(dst.pixel(2, 0), Some([0, 0, 0, 255]));
        assert_eq!(dst.pixel(3, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn bicubic_keeps_opaque_edges_opaque() {
        let src = Bitmap::filled(Size::new(16, 16), [10, 20, 30, 255]);
        let mut dst = Bitmap::new(Size::new(24, 24));
        CpuSurface::new()
            .draw_image(
                &src,
                SourceRect::pixel_corner(src.size()),
                &mut dst,
                ResamplingMode::Bicubic,
            )
            .unwrap();

        // No transparent fringe along the right and bottom edges.
        for i in 0..24 {
            assert_eq!(dst.pixel(23, i).map(|p| p[3]), Some(255));
            assert_eq!(dst.pixel(i, 23).map(|p| p[3]), Some(255));
        }
    }

    #[test]
    fn empty_destination_is_rejected() {
        let src = Bitmap::filled(Size::new(4, 4), [0, 0, 0, 255]);
        let mut dst = Bitmap::new(Size::new(0, 4));
        let err = CpuSurface::new()
            .draw_image(
                &src,
                SourceRect::pixel_corner(src.size()),
                &mut dst,
                ResamplingMode::Bilinear,
            )
            .unwrap_err();
        assert!(matches!(err, ScaleError::EmptyImage));
    }
}
