//! # Logical to Device Unit Conversion
//!
//! A logical unit is 1/96 inch. The device DPI and the PerMonitorV2 state are
//! read from the host once per converter and memoized; every later read is a
//! cache hit, whatever thread context the caller runs in at that point.
//!
//! ## Rounding
//!
//! Results use arithmetic rounding (half away from zero, `f64::round`), never
//! banker's rounding, so `1.5 * 5 = 7.5` becomes `8` on every platform.
//!
//! | Device DPI | Factor | `to_device(10)` |
//! |------------|--------|-----------------|
//! | 96 | 1.0 | 10 |
//! | 120 | 1.25 | 13 |
//! | 144 | 1.5 | 15 |
//! | 192 | 2.0 | 20 |

use std::sync::{Arc, OnceLock};

use dpi_resample::Size;
use serde::Serialize;
use tracing::debug;

use crate::awareness::AwarenessController;

/// Reference density of a logical unit.
pub const LOGICAL_DPI: f64 = 96.0;

/// Snapshot of the memoized scale state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScaleState {
    pub logical_dpi: f64,
    pub device_dpi: f64,
    pub scaling_factor: f64,
    /// The thread-context API exists, so PerMonitorV2 can be queried.
    pub needs_per_monitor_v2_query: bool,
    /// Scaling is required, or PerMonitorV2 makes per-monitor scaling the caller's job.
    pub scaling_requirement_met: bool,
}

/// Values captured by the first [`UnitConverter::initialize`].
#[derive(Clone, Copy, Debug)]
struct ScaleMemo {
    device_dpi: f64,
    /// Whether the initializing thread ran PerMonitorV2.
    per_monitor_v2: bool,
}

/// Converts logical measurements to device pixels.
///
/// Constructed once at process start (see [`crate::DpiServices`]) and immutable
/// after the first DPI read. Tests build a fresh instance per case.
pub struct UnitConverter {
    controller: Arc<AwarenessController>,
    memo: OnceLock<ScaleMemo>,
    dpi_changed_improvements: bool,
}

impl UnitConverter {
    pub fn new(controller: Arc<AwarenessController>) -> Self {
        Self {
            controller,
            memo: OnceLock::new(),
            dpi_changed_improvements: false,
        }
    }

    /// Opt into the DPI-changed layout improvements (effective only under PerMonitorV2).
    pub fn with_dpi_changed_improvements(mut self, enabled: bool) -> Self {
        self.dpi_changed_improvements = enabled;
        self
    }

    pub fn controller(&self) -> &Arc<AwarenessController> {
        &self.controller
    }

    /// Query and memoize the device DPI and the PerMonitorV2 state. Idempotent;
    /// returns the memoized DPI.
    ///
    /// Exactly one caller queries the host; concurrent first callers wait for it.
    /// Later thread overrides never change the memo.
    pub fn initialize(&self) -> f64 {
        self.memo().device_dpi
    }

    fn memo(&self) -> ScaleMemo {
        *self.memo.get_or_init(|| {
            let device_dpi = match self.controller.host().device_dpi() {
                Some(dpi) if dpi > 0 => dpi as f64,
                _ => LOGICAL_DPI,
            };
            let per_monitor_v2 = self.controller.is_per_monitor_v2_active();
            debug!(
                device_dpi,
                factor = device_dpi / LOGICAL_DPI,
                per_monitor_v2,
                "scale state memoized"
            );
            ScaleMemo {
                device_dpi,
                per_monitor_v2,
            }
        })
    }

    pub fn device_dpi(&self) -> f64 {
        self.initialize()
    }

    pub fn scaling_factor(&self) -> f64 {
        self.device_dpi() / LOGICAL_DPI
    }

    /// Exact comparison against 96; any deviation counts.
    pub fn is_scaling_required(&self) -> bool {
        self.device_dpi() != LOGICAL_DPI
    }

    /// Convert with an explicit factor, rounding half away from zero.
    pub fn to_device_at_factor(value: i32, factor: f64) -> i32 {
        (factor * value as f64).round() as i32
    }

    /// Convert a logical value using the memoized factor.
    pub fn to_device(&self, value: i32) -> i32 {
        Self::to_device_at_factor(value, self.scaling_factor())
    }

    /// Convert for a specific DPI. `0` means "use the memoized DPI".
    pub fn to_device_for_dpi(&self, value: i32, dpi: u32) -> i32 {
        if dpi == 0 {
            return self.to_device(value);
        }
        Self::to_device_at_factor(value, dpi as f64 / LOGICAL_DPI)
    }

    pub fn to_device_x(&self, value: i32) -> i32 {
        self.to_device(value)
    }

    pub fn to_device_y(&self, value: i32) -> i32 {
        self.to_device(value)
    }

    /// Componentwise conversion of a logical size.
    pub fn to_device_size(&self, size: Size) -> Size {
        let factor = self.scaling_factor();
        Size {
            w: scale_dimension(size.w, factor),
            h: scale_dimension(size.h, factor),
        }
    }

    pub fn scaling_requirement_met(&self) -> bool {
        self.is_scaling_required() || self.memo().per_monitor_v2
    }

    /// DPI-changed improvements apply only when opted in and running PerMonitorV2.
    pub fn dpi_changed_improvements_enabled(&self) -> bool {
        self.dpi_changed_improvements && self.memo().per_monitor_v2
    }

    pub fn state(&self) -> ScaleState {
        let device_dpi = self.device_dpi();
        ScaleState {
            logical_dpi: LOGICAL_DPI,
            device_dpi,
            scaling_factor: device_dpi / LOGICAL_DPI,
            needs_per_monitor_v2_query: self.controller.feature_level().has_thread_contexts(),
            scaling_requirement_met: self.scaling_requirement_met(),
        }
    }
}

fn scale_dimension(v: u32, factor: f64) -> u32 {
    (factor * v as f64).round() as u32
}

impl std::fmt::Debug for UnitConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitConverter")
            .field("device_dpi", &self.memo.get().map(|m| m.device_dpi))
            .field("dpi_changed_improvements", &self.dpi_changed_improvements)
            .finish()
    }
}
