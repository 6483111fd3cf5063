//! # Unit and Image Scaling
//!
//! - [`units`]: memoized logical-to-device conversion
//! - [`rescale`]: bitmap rescaling with per-call resampling-mode selection
//! - [`bitmap_io`]: file and `image` crate bridges

pub mod bitmap_io;
pub mod rescale;
pub mod units;

pub use bitmap_io::{bitmap_from_rgba_image, bitmap_into_rgba_image, load_bitmap, save_bitmap};
pub use rescale::{ImageRescaler, RescaleOutcome, SlotRescale};
pub use units::{LOGICAL_DPI, ScaleState, UnitConverter};
