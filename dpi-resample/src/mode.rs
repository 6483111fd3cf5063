// SPDX-License-Identifier: MIT
//! # Resampling Mode Selection
//!
//! The interpolation algorithm is derived from the scaling factor on every call
//! and never stored. The factor is first rounded to a whole percentage so that
//! values such as `1.9999999` select the same mode as `2.0`.

use fast_image_resize::{FilterType, ResizeAlg};

/// Interpolation algorithm used when drawing a bitmap at a new resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResamplingMode {
    /// Pixel replication. Chosen for exact integer multiples (100%, 200%, ...),
    /// where it keeps edges sharp without distortion.
    NearestNeighbor,
    /// Two-tap linear filter. Chosen when shrinking.
    Bilinear,
    /// Cubic (Catmull-Rom) filter. Chosen for non-integer enlargement.
    Bicubic,
}

impl ResamplingMode {
    /// Map to the `fast_image_resize` algorithm that implements this mode.
    pub fn to_resize_alg(self) -> ResizeAlg {
        match self {
            ResamplingMode::NearestNeighbor => ResizeAlg::Nearest,
            ResamplingMode::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResamplingMode::Bicubic => ResizeAlg::Convolution(FilterType::CatmullRom),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResamplingMode::NearestNeighbor => "nearest-neighbor",
            ResamplingMode::Bilinear => "bilinear",
            ResamplingMode::Bicubic => "bicubic",
        }
    }
}

impl std::fmt::Display for ResamplingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the resampling mode for `scaling_factor` (device DPI / logical DPI).
pub fn select_resampling_mode(scaling_factor: f64) -> ResamplingMode {
    let percent = (scaling_factor * 100.0).round() as i64;
    if percent % 100 == 0 {
        ResamplingMode::NearestNeighbor
    } else if percent < 100 {
        ResamplingMode::Bilinear
    } else {
        ResamplingMode::Bicubic
    }
}
