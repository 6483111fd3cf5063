// SPDX-License-Identifier: MIT
//! # dpi-resample: Bitmap Resampling for High-DPI Displays
//!
//! This crate holds the pixel-level half of DPI scaling: it knows how to pick an
//! interpolation algorithm for a given scaling factor and how to draw a logical
//! bitmap onto a device-resolution canvas. It knows nothing about the host OS or
//! about awareness tiers; callers hand it a target size.
//!
//! ## Key Components
//!
//! - [`geometry`]: `Size`, `SourceRect` and the RGBA8 `Bitmap` surface
//! - [`mode`]: resampling-mode selection from a scaling factor
//! - [`cpu`]: the rendering-surface trait and its SIMD CPU implementation
//!
//! ## Mode Selection
//!
//! | Scale (rounded %) | Mode |
//! |-------------------|------|
//! | 100, 200, 300, ... | `NearestNeighbor` (integer multiples keep edges sharp) |
//! | below 100 | `Bilinear` (few source pixels per destination pixel) |
//! | other enlargements | `Bicubic` |
//!
//! ## Usage Example
//!
//! ```rust
//! use dpi_resample::cpu::{CpuSurface, RenderSurface};
//! use dpi_resample::geometry::{Bitmap, Size, SourceRect};
//! use dpi_resample::mode::select_resampling_mode;
//!
//! let glyph = Bitmap::filled(Size { w: 16, h: 16 }, [0, 0, 0, 255]);
//! let mut canvas = Bitmap::new(Size { w: 24, h: 24 });
//! let mode = select_resampling_mode(1.5);
//!
//! let mut surface = CpuSurface::default();
//! surface
//!     .draw_image(&glyph, SourceRect::pixel_corner(glyph.size()), &mut canvas, mode)
//!     .unwrap();
//! assert_eq!(canvas.pixel(12, 12), Some([0, 0, 0, 255]));
//! ```

pub mod cpu;
pub mod geometry;
pub mod mode;

pub use cpu::{CpuSurface, RenderSurface, ScaleError};
pub use geometry::{Bitmap, Size, SourceRect};
pub use mode::{ResamplingMode, select_resampling_mode};
