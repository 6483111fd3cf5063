//! # Image Rescaling to Device Resolution
//!
//! Every draw uses a source rectangle whose origin is shifted by half a pixel
//! ([`SourceRect::pixel_corner`]), for every resampling mode. Without it, a
//! center-sampling rasterizer reads past the right and bottom edges and leaves a
//! dark or transparent fringe at high scale factors.
//!
//! A degenerate (zero-area) target is not an error: the original image comes
//! back as [`RescaleOutcome::Unscaled`] together with the recoverable condition.

use std::sync::Arc;

use dpi_resample::{Bitmap, CpuSurface, RenderSurface, ResamplingMode, Size, SourceRect};
use dpi_resample::select_resampling_mode;
use tracing::{debug, warn};

use super::units::UnitConverter;
use crate::error::{DpiError, DpiResult};

/// Result of a rescale request.
#[derive(Debug)]
pub enum RescaleOutcome {
    /// A new device-resolution image.
    Scaled(Bitmap),
    /// The original image, returned because the request could not be honored.
    Unscaled { image: Bitmap, reason: DpiError },
}

impl RescaleOutcome {
    pub fn image(&self) -> &Bitmap {
        match self {
            RescaleOutcome::Scaled(image) | RescaleOutcome::Unscaled { image, .. } => image,
        }
    }

    pub fn into_image(self) -> Bitmap {
        match self {
            RescaleOutcome::Scaled(image) | RescaleOutcome::Unscaled { image, .. } => image,
        }
    }

    /// The recoverable condition, when the image was left unscaled.
    pub fn condition(&self) -> Option<&DpiError> {
        match self {
            RescaleOutcome::Scaled(_) => None,
            RescaleOutcome::Unscaled { reason, .. } => Some(reason),
        }
    }

    pub fn is_scaled(&self) -> bool {
        matches!(self, RescaleOutcome::Scaled(_))
    }
}

/// What [`ImageRescaler::rescale_in_place`] did with its slot.
#[derive(Debug)]
pub enum SlotRescale {
    /// The slot held no image.
    Empty,
    /// The image was replaced by its device-resolution version.
    Replaced,
    /// The image was kept as-is for the given recoverable reason.
    Kept(DpiError),
}

impl SlotRescale {
    pub fn is_replaced(&self) -> bool {
        matches!(self, SlotRescale::Replaced)
    }

    pub fn condition(&self) -> Option<&DpiError> {
        match self {
            SlotRescale::Kept(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Resizes bitmaps to device resolution through a [`RenderSurface`].
pub struct ImageRescaler<S = CpuSurface> {
    units: Arc<UnitConverter>,
    surface: S,
}

impl ImageRescaler<CpuSurface> {
    pub fn new(units: Arc<UnitConverter>) -> Self {
        Self::with_surface(units, CpuSurface::new())
    }
}

impl<S: RenderSurface> ImageRescaler<S> {
    pub fn with_surface(units: Arc<UnitConverter>, surface: S) -> Self {
        Self { units, surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn units(&self) -> &Arc<UnitConverter> {
        &self.units
    }

    /// Mode for the current scaling factor. Derived per call, never stored.
    pub fn resampling_mode(&self) -> ResamplingMode {
        select_resampling_mode(self.units.scaling_factor())
    }

    /// Draw `source` onto a fresh canvas of `target` size.
    pub fn rescale_to_size(&mut self, source: &Bitmap, target: Size) -> DpiResult<RescaleOutcome> {
        if target.is_empty() {
            let reason = DpiError::zero_size_target(target.w, target.h)
                .with_operation("rescale_to_size")
                .with_recovery_suggestion("Draw the logical image unscaled");
            warn!(%target, source = %source.size(), category = reason.category(), "{reason}");
            return Ok(RescaleOutcome::Unscaled {
                image: source.clone(),
                reason,
            });
        }
        if source.size().is_empty() {
            let reason = DpiError::zero_size_target(source.width(), source.height())
                .with_operation("rescale_to_size")
                .with_context("source image is empty");
            warn!(%target, "{reason}");
            return Ok(RescaleOutcome::Unscaled {
                image: source.clone(),
                reason,
            });
        }

        let mode = self.resampling_mode();
        let mut canvas = Bitmap::new(target);
        self.surface.draw_image(
            source,
            SourceRect::pixel_corner(source.size()),
            &mut canvas,
            mode,
        )?;
        debug!(from = %source.size(), to = %target, %mode, "bitmap rescaled");
        Ok(RescaleOutcome::Scaled(canvas))
    }

    /// Replace `image` with its device-resolution version. `None` is left alone.
    ///
    /// The previous bitmap is dropped on replacement. A degenerate target keeps
    /// the image and reports why.
    pub fn rescale_in_place(&mut self, image: &mut Option<Bitmap>) -> DpiResult<SlotRescale> {
        let Some(current) = image.as_ref() else {
            return Ok(SlotRescale::Empty);
        };
        let target = self.units.to_device_size(current.size());
        match self.rescale_to_size(current, target)? {
            RescaleOutcome::Scaled(scaled) => {
                *image = Some(scaled);
                Ok(SlotRescale::Replaced)
            }
            RescaleOutcome::Unscaled { reason, .. } => Ok(SlotRescale::Kept(reason)),
        }
    }

    /// Device-resolution copy of a logical button glyph, or the glyph itself at 96 DPI.
    pub fn scale_button_image(&mut self, image: Bitmap) -> DpiResult<Bitmap> {
        if !self.units.is_scaling_required() {
            return Ok(image);
        }
        let target = self.units.to_device_size(image.size());
        Ok(self.rescale_to_size(&image, target)?.into_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::awareness::{AwarenessController, OsFeatureLevel, SimulatedHost};
    use dpi_resample::ScaleError;

    #[derive(Default)]
    struct Recording {
        draws: Vec<(SourceRect, ResamplingMode, Size)>,
    }

    impl RenderSurface for Recording {
        fn draw_image(
            &mut self,
            _src: &Bitmap,
            src_rect: SourceRect,
            dst: &mut Bitmap,
            mode: ResamplingMode,
        ) -> Result<(), ScaleError> {
            self.draws.push((src_rect, mode, dst.size()));
            Ok(())
        }
    }

    fn units_at(dpi: u32) -> Arc<UnitConverter> {
        let host = Arc::new(SimulatedHost::new(OsFeatureLevel::Tier3).with_dpi(dpi));
        Arc::new(UnitConverter::new(Arc::new(AwarenessController::new(host))))
    }

    #[test]
    fn every_mode_uses_half_pixel_origin() {
        for dpi in [72, 144, 192] {
            let mut rescaler = ImageRescaler::with_surface(units_at(dpi), Recording::default());
            let src = Bitmap::filled(Size::new(8, 8), [1, 2, 3, 255]);
            rescaler.rescale_to_size(&src, Size::new(12, 12)).unwrap();
            let (rect, _, dst) = rescaler.surface().draws[0];
            assert_eq!((rect.x, rect.y), (-0.5, -0.5));
            assert_eq!((rect.w, rect.h), (8.0, 8.0));
            assert_eq!(dst, Size::new(12, 12));
        }
    }

    #[test]
    fn mode_follows_scaling_factor() {
        let modes: Vec<_> = [72, 96, 144, 192]
            .into_iter()
            .map(|dpi| ImageRescaler::new(units_at(dpi)).resampling_mode())
            .collect();
        assert_eq!(
            modes,
            vec![
                ResamplingMode::Bilinear,
                ResamplingMode::NearestNeighbor,
                ResamplingMode::Bicubic,
                ResamplingMode::NearestNeighbor,
            ]
        );
    }

    #[test]
    fn zero_target_returns_original() {
        let mut rescaler = ImageRescaler::with_surface(units_at(144), Recording::default());
        let src = Bitmap::filled(Size::new(4, 4), [9, 9, 9, 255]);
        let outcome = rescaler.rescale_to_size(&src, Size::new(0, 0)).unwrap();
        assert!(!outcome.is_scaled());
        assert_eq!(outcome.condition().map(|e| e.category()), Some("zero_size_target"));
        assert_eq!(outcome.into_image(), src);
        assert!(rescaler.surface().draws.is_empty());
    }

    #[test]
    fn in_place_ignores_none_and_replaces_some() {
        let mut rescaler = ImageRescaler::new(units_at(192));
        let mut none: Option<Bitmap> = None;
        assert!(matches!(
            rescaler.rescale_in_place(&mut none).unwrap(),
            SlotRescale::Empty
        ));
        assert!(none.is_none());

        let mut image = Some(Bitmap::filled(Size::new(5, 3), [0, 0, 255, 255]));
        assert!(rescaler.rescale_in_place(&mut image).unwrap().is_replaced());
        let image = image.unwrap();
        assert_eq!(image.size(), Size::new(10, 6));
        assert_eq!(image.pixel(9, 5), Some([0, 0, 255, 255]));
    }

    #[test]
    fn button_image_untouched_at_96_dpi() {
        let mut rescaler = ImageRescaler::with_surface(units_at(96), Recording::default());
        let glyph = Bitmap::filled(Size::new(16, 16), [0, 0, 0, 255]);
        let out = rescaler.scale_button_image(glyph.clone()).unwrap();
        assert_eq!(out, glyph);
        assert!(rescaler.surface().draws.is_empty());
    }

    #[test]
    fn in_place_reports_kept_image() {
        // A zero-width image maps to a zero-width target.
        let mut rescaler = ImageRescaler::with_surface(units_at(144), Recording::default());
        let mut empty = Some(Bitmap::new(Size::new(0, 4)));
        let result = rescaler.rescale_in_place(&mut empty).unwrap();

        assert!(!result.is_replaced());
        assert_eq!(result.condition().map(|e| e.category()), Some("zero_size_target"));
        assert_eq!(empty.unwrap().size(), Size::new(0, 4));
        assert!(rescaler.surface().draws.is_empty());
    }
}
