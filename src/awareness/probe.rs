//! OS feature-level detection.
//!
//! Detection is a pure function of the host's version information; it makes no
//! state changes and needs no elevated privilege. Missing version information
//! yields [`OsFeatureLevel::Legacy`], the most conservative level.

use super::host::HostApi;
use super::tier::OsFeatureLevel;

/// Host OS version triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
}

impl OsVersion {
    pub const fn new(major: u32, minor: u32, build: u32) -> Self {
        Self { major, minor, build }
    }
}

impl std::fmt::Display for OsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// First version exposing the process-level three-mode API (6.3).
pub const TIER1_MIN_VERSION: OsVersion = OsVersion::new(6, 3, 0);
/// First version exposing thread awareness contexts (10.0.14393).
pub const TIER2_MIN_VERSION: OsVersion = OsVersion::new(10, 0, 14393);
/// First version accepting PerMonitorV2 everywhere (10.0.15063).
pub const TIER3_MIN_VERSION: OsVersion = OsVersion::new(10, 0, 15063);

/// Classify a version. `None` maps to `Legacy`.
pub fn feature_level_for(version: Option<OsVersion>) -> OsFeatureLevel {
    match version {
        Some(v) if v >= TIER3_MIN_VERSION => OsFeatureLevel::Tier3,
        Some(v) if v >= TIER2_MIN_VERSION => OsFeatureLevel::Tier2,
        Some(v) if v >= TIER1_MIN_VERSION => OsFeatureLevel::Tier1,
        _ => OsFeatureLevel::Legacy,
    }
}

/// Detect the feature level of `host`.
pub fn detect_os_feature_level(host: &dyn HostApi) -> OsFeatureLevel {
    let version = host.os_version();
    let level = feature_level_for(version);
    tracing::debug!(?version, %level, "detected OS feature level");
    level
}
