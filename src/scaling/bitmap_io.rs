//! Bridges between [`Bitmap`] and the `image` crate for file-based callers.

use std::path::Path;

use dpi_resample::{Bitmap, Size};
use image::RgbaImage;

use crate::error::{DpiError, DpiResult};

pub fn bitmap_from_rgba_image(image: RgbaImage) -> DpiResult<Bitmap> {
    let size = Size::new(image.width(), image.height());
    Ok(Bitmap::from_rgba(size, image.into_raw())?)
}

pub fn bitmap_into_rgba_image(bitmap: Bitmap) -> DpiResult<RgbaImage> {
    let Size { w, h } = bitmap.size();
    RgbaImage::from_raw(w, h, bitmap.into_pixels())
        .ok_or_else(|| DpiError::processing("bitmap_into_rgba_image", "pixel buffer does not match size"))
}

/// Decode any format the `image` crate understands into an RGBA8 bitmap.
pub fn load_bitmap(path: impl AsRef<Path>) -> DpiResult<Bitmap> {
    let path = path.as_ref();
    let image = image::open(path)
        .map_err(|e| DpiError::from(e).with_context(format!("loading {}", path.display())))?;
    bitmap_from_rgba_image(image.to_rgba8())
}

/// Encode `bitmap`; the format follows the file extension.
pub fn save_bitmap(bitmap: &Bitmap, path: impl AsRef<Path>) -> DpiResult<()> {
    let path = path.as_ref();
    let image = bitmap_into_rgba_image(bitmap.clone())?;
    image
        .save(path)
        .map_err(|e| DpiError::from(e).with_context(format!("saving {}", path.display())))
}
