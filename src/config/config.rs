//! # DPI Configuration
//!
//! Startup settings shared by the `dpictl` binary and embedding applications.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `process_tier` | `CapabilityTier` | `thread-per-monitor-v2` | Tier declared once at startup |
//! | `dpi_changed_improvements` | `bool` | `true` | Enable DPI-changed relayout under PerMonitorV2 |
//! | `log_filter` | `String` | `info` | `tracing` filter used when `RUST_LOG` is unset |
//!
//! ## File Format
//!
//! JSON, every field optional:
//!
//! ```json
//! { "process_tier": "process-system-aware", "log_filter": "dpi_awareness=debug" }
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use dpi_awareness::config::DpiConfig;
//! use dpi_awareness::awareness::CapabilityTier;
//!
//! let config = DpiConfig::default();
//! assert_eq!(config.process_tier, CapabilityTier::ThreadPerMonitorV2);
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::awareness::CapabilityTier;
use crate::error::{DpiError, DpiResult};

/// Startup configuration for the DPI subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpiConfig {
    /// Tier requested from the host when the process starts.
    ///
    /// Walks the fallback ladder when the host cannot provide it. Must not be
    /// `unspecified`.
    pub process_tier: CapabilityTier,

    /// Whether layout code should rescale on DPI-changed notifications.
    ///
    /// Only takes effect while the thread runs PerMonitorV2.
    pub dpi_changed_improvements: bool,

    /// Default `tracing` filter directive.
    pub log_filter: String,
}

impl Default for DpiConfig {
    fn default() -> Self {
        Self {
            process_tier: CapabilityTier::ThreadPerMonitorV2,
            dpi_changed_improvements: true,
            log_filter: "info".to_string(),
        }
    }
}

impl DpiConfig {
    pub fn new(
        process_tier: CapabilityTier,
        dpi_changed_improvements: bool,
        log_filter: impl Into<String>,
    ) -> Self {
        Self {
            process_tier,
            dpi_changed_improvements,
            log_filter: log_filter.into(),
        }
    }

    /// Load a JSON configuration file and validate it.
    pub fn load(path: impl AsRef<Path>) -> DpiResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DpiError::io("read_config", e).with_path(path.display().to_string()))?;
        let config: DpiConfig = serde_json::from_str(&text)
            .map_err(|e| DpiError::from(e).with_context(format!("parsing {}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> DpiResult<()> {
        if !self.process_tier.is_specified() {
            return Err(DpiError::config(
                "process_tier",
                self.process_tier.to_string(),
                "a concrete tier is required",
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(DpiError::config("log_filter", "", "must not be empty"));
        }
        Ok(())
    }
}
