//! # DPI Awareness Library
//!
//! Negotiates how a desktop process and its threads present themselves to the
//! OS display-scaling system, and converts logical layout values and bitmaps to
//! device pixels once the negotiated tier is known.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `awareness`: OS capability probe, process/thread tier controller, scoped overrides
//! - `scaling`: memoized unit conversion and bitmap rescaling
//! - `config`: startup configuration and validation
//! - `error`: error types with severity and recovery hints
//!
//! The pixel resampling itself lives in the `dpi-resample` workspace crate.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dpi_awareness::{DpiServices, config::DpiConfig};
//! use dpi_awareness::awareness::{OsFeatureLevel, SimulatedHost};
//!
//! # fn example() -> dpi_awareness::DpiResult<()> {
//! let host = Arc::new(SimulatedHost::new(OsFeatureLevel::Tier3).with_dpi(144));
//! let services = DpiServices::initialize(&DpiConfig::default(), host)?;
//!
//! assert!(services.process_declared);
//! assert_eq!(services.units.to_device(10), 15);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![deny(unsafe_code)]

use std::sync::Arc;

use tracing::{info, warn};

pub mod awareness;
pub mod config;
pub mod error;
pub mod scaling;

/// Re-export error types for convenience
pub use error::{DpiError, DpiResult, HasRecoverySuggestion, HasSeverity, Recoverable};

pub use awareness::{
    AwarenessController, CapabilityTier, HostApi, OsFeatureLevel, SharedHost,
    ThreadAwarenessScope, ThreadCapability,
};
pub use scaling::{ImageRescaler, RescaleOutcome, SlotRescale, UnitConverter};

/// Re-export the resampling primitives so callers need a single dependency.
pub use dpi_resample::{Bitmap, ResamplingMode, Size};

use config::DpiConfig;

/// The wired-up DPI subsystem for one process.
///
/// Built once at startup. The controller and unit converter are shared
/// handles; the rescaler owns its resize buffers and is not shared.
pub struct DpiServices {
    pub controller: Arc<AwarenessController>,
    pub units: Arc<UnitConverter>,
    pub rescaler: ImageRescaler,
    /// Whether the host accepted any rung of the configured process tier.
    pub process_declared: bool,
}

impl DpiServices {
    /// Declare the configured process tier, then memoize the device DPI.
    ///
    /// The declaration happens before the DPI query so the host reports the
    /// DPI that matches the negotiated tier.
    pub fn initialize(config: &DpiConfig, host: SharedHost) -> DpiResult<Self> {
        config.validate()?;

        let controller = Arc::new(AwarenessController::new(host));
        let process_declared = controller.set_process_capability(config.process_tier)?;
        if !process_declared {
            warn!(
                requested = %config.process_tier,
                level = %controller.feature_level(),
                "host accepted no process awareness rung"
            );
        }

        let units = Arc::new(
            UnitConverter::new(Arc::clone(&controller))
                .with_dpi_changed_improvements(config.dpi_changed_improvements),
        );
        let dpi = units.initialize();
        info!(
            level = %controller.feature_level(),
            process = %controller.get_process_capability(),
            device_dpi = dpi,
            "DPI services initialized"
        );

        let rescaler = ImageRescaler::new(Arc::clone(&units));
        Ok(Self {
            controller,
            units,
            rescaler,
            process_declared,
        })
    }
}

impl std::fmt::Debug for DpiServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DpiServices")
            .field("controller", &self.controller)
            .field("units", &self.units)
            .field("process_declared", &self.process_declared)
            .finish()
    }
}
