//! Common test utilities shared by the integration tests
//!
//! Simulated hosts, deterministic test bitmaps and a surface that records
//! every draw it receives.

#![allow(dead_code)]

use std::sync::Arc;

use dpi_awareness::awareness::{AwarenessContext, AwarenessController, OsFeatureLevel, SimulatedHost};
use dpi_awareness::scaling::{ImageRescaler, UnitConverter};
use dpi_resample::{Bitmap, RenderSurface, ResamplingMode, ScaleError, Size, SourceRect};

/// Simulated hosts for the common configurations
pub mod hosts {
    use super::*;

    /// A host at `level` whose process already runs at `context`.
    pub fn declared(level: OsFeatureLevel, context: AwarenessContext) -> Arc<SimulatedHost> {
        Arc::new(SimulatedHost::new(level).with_process_context(context))
    }

    /// A full thread-context host with a PerMonitorV2 process.
    pub fn per_monitor_v2() -> Arc<SimulatedHost> {
        declared(OsFeatureLevel::Tier3, AwarenessContext::PerMonitorV2)
    }

    pub fn with_dpi(level: OsFeatureLevel, dpi: u32) -> Arc<SimulatedHost> {
        Arc::new(SimulatedHost::new(level).with_dpi(dpi))
    }

    pub fn controller(host: &Arc<SimulatedHost>) -> Arc<AwarenessController> {
        Arc::new(AwarenessController::new(host.clone()))
    }

    /// Fresh converter over a Tier3 host reporting `dpi`.
    pub fn units_at(dpi: u32) -> Arc<UnitConverter> {
        let host = with_dpi(OsFeatureLevel::Tier3, dpi);
        Arc::new(UnitConverter::new(controller(&host)))
    }
}

/// Deterministic test images
pub mod test_bitmaps {
    use super::*;

    /// Two-color checkerboard with `cell`-pixel squares.
    pub fn checkerboard(size: Size, cell: u32) -> Bitmap {
        let mut bitmap = Bitmap::new(size);
        for y in 0..size.h {
            for x in 0..size.w {
                let dark = ((x / cell) + (y / cell)) % 2 == 0;
                let rgba = if dark { [0, 0, 0, 255] } else { [255, 255, 255, 255] };
                bitmap.put_pixel(x, y, rgba);
            }
        }
        bitmap
    }

    /// Opaque single-color image.
    pub fn solid(size: Size, rgba: [u8; 4]) -> Bitmap {
        Bitmap::filled(size, rgba)
    }
}

/// A draw observed by [`RecordingSurface`]
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub src_size: Size,
    pub src_rect: SourceRect,
    pub dst_size: Size,
    pub mode: ResamplingMode,
}

/// Surface that records draws and fills the destination with a marker color.
#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

pub const MARKER: [u8; 4] = [1, 2, 3, 255];

impl RenderSurface for RecordingSurface {
    fn draw_image(
        &mut self,
        src: &Bitmap,
        src_rect: SourceRect,
        dst: &mut Bitmap,
        mode: ResamplingMode,
    ) -> Result<(), ScaleError> {
        self.calls.push(DrawCall {
            src_size: src.size(),
            src_rect,
            dst_size: dst.size(),
            mode,
        });
        for px in dst.pixels_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&MARKER);
        }
        Ok(())
    }
}

/// Rescaler over a Tier3 host at `dpi` that records its draws.
pub fn recording_rescaler(dpi: u32) -> ImageRescaler<RecordingSurface> {
    ImageRescaler::with_surface(hosts::units_at(dpi), RecordingSurface::default())
}
