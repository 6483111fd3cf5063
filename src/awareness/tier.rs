//! Capability tiers, OS feature levels and the native awareness contexts they map to.

use serde::{Deserialize, Serialize};

/// How finely a process or thread declares awareness of per-monitor pixel density.
///
/// `Unspecified` is a sentinel meaning "nothing requested". It is never a valid
/// target for a set operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityTier {
    Unspecified,
    ProcessUnaware,
    ProcessSystemAware,
    ProcessPerMonitor,
    ThreadUnaware,
    ThreadSystemAware,
    ThreadPerMonitor,
    ThreadPerMonitorV2,
    ThreadUnawareGdiScaled,
}

impl CapabilityTier {
    pub fn is_specified(self) -> bool {
        self != CapabilityTier::Unspecified
    }

    /// Native awareness context this tier is expressed with.
    pub fn context(self) -> Option<AwarenessContext> {
        match self {
            CapabilityTier::Unspecified => None,
            CapabilityTier::ProcessUnaware | CapabilityTier::ThreadUnaware => {
                Some(AwarenessContext::Unaware)
            }
            CapabilityTier::ProcessSystemAware | CapabilityTier::ThreadSystemAware => {
                Some(AwarenessContext::SystemAware)
            }
            CapabilityTier::ProcessPerMonitor | CapabilityTier::ThreadPerMonitor => {
                Some(AwarenessContext::PerMonitor)
            }
            CapabilityTier::ThreadPerMonitorV2 => Some(AwarenessContext::PerMonitorV2),
            CapabilityTier::ThreadUnawareGdiScaled => Some(AwarenessContext::UnawareGdiScaled),
        }
    }
}

impl std::fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CapabilityTier::Unspecified => "unspecified",
            CapabilityTier::ProcessUnaware => "process-unaware",
            CapabilityTier::ProcessSystemAware => "process-system-aware",
            CapabilityTier::ProcessPerMonitor => "process-per-monitor",
            CapabilityTier::ThreadUnaware => "thread-unaware",
            CapabilityTier::ThreadSystemAware => "thread-system-aware",
            CapabilityTier::ThreadPerMonitor => "thread-per-monitor",
            CapabilityTier::ThreadPerMonitorV2 => "thread-per-monitor-v2",
            CapabilityTier::ThreadUnawareGdiScaled => "thread-unaware-gdi-scaled",
        };
        f.write_str(name)
    }
}

/// Which capability-negotiation API surface the host OS exposes.
///
/// Ordered: a request is satisfied at the highest level not above the detected one.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OsFeatureLevel {
    /// Single aware/unaware process flag.
    Legacy,
    /// Process-level three-mode API.
    Tier1,
    /// Thread-level context API; PerMonitorV2 can be queried but not requested.
    Tier2,
    /// Full thread-context set/get/compare API, including PerMonitorV2.
    Tier3,
}

impl OsFeatureLevel {
    pub(crate) const ALL: [OsFeatureLevel; 4] = [
        OsFeatureLevel::Legacy,
        OsFeatureLevel::Tier1,
        OsFeatureLevel::Tier2,
        OsFeatureLevel::Tier3,
    ];

    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }

    /// Thread-context queries exist at this level.
    pub fn has_thread_contexts(self) -> bool {
        self >= OsFeatureLevel::Tier2
    }
}

impl std::fmt::Display for OsFeatureLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OsFeatureLevel::Legacy => "legacy",
            OsFeatureLevel::Tier1 => "tier1",
            OsFeatureLevel::Tier2 => "tier2",
            OsFeatureLevel::Tier3 => "tier3",
        };
        f.write_str(name)
    }
}

/// The five awareness context values the thread-level API understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AwarenessContext {
    Unaware,
    SystemAware,
    PerMonitor,
    PerMonitorV2,
    UnawareGdiScaled,
}

impl AwarenessContext {
    /// Most specific first, used when translating an opaque native handle.
    pub const MATCH_ORDER: [AwarenessContext; 5] = [
        AwarenessContext::PerMonitorV2,
        AwarenessContext::UnawareGdiScaled,
        AwarenessContext::PerMonitor,
        AwarenessContext::SystemAware,
        AwarenessContext::Unaware,
    ];

    /// Next rung down the fallback ladder:
    /// `PerMonitorV2 -> PerMonitor -> SystemAware -> Unaware`, `UnawareGdiScaled -> Unaware`.
    pub fn fallback(self) -> Option<AwarenessContext> {
        match self {
            AwarenessContext::PerMonitorV2 => Some(AwarenessContext::PerMonitor),
            AwarenessContext::PerMonitor => Some(AwarenessContext::SystemAware),
            AwarenessContext::SystemAware => Some(AwarenessContext::Unaware),
            AwarenessContext::UnawareGdiScaled => Some(AwarenessContext::Unaware),
            AwarenessContext::Unaware => None,
        }
    }

    /// `self` followed by every fallback rung below it.
    pub fn ladder(self) -> impl Iterator<Item = AwarenessContext> {
        std::iter::successors(Some(self), |c| c.fallback())
    }

    /// Lowest feature level at which a thread may be switched to this context.
    pub fn min_thread_level(self) -> OsFeatureLevel {
        match self {
            AwarenessContext::PerMonitorV2 | AwarenessContext::UnawareGdiScaled => {
                OsFeatureLevel::Tier3
            }
            _ => OsFeatureLevel::Tier2,
        }
    }

    pub fn thread_tier(self) -> CapabilityTier {
        match self {
            AwarenessContext::Unaware => CapabilityTier::ThreadUnaware,
            AwarenessContext::SystemAware => CapabilityTier::ThreadSystemAware,
            AwarenessContext::PerMonitor => CapabilityTier::ThreadPerMonitor,
            AwarenessContext::PerMonitorV2 => CapabilityTier::ThreadPerMonitorV2,
            AwarenessContext::UnawareGdiScaled => CapabilityTier::ThreadUnawareGdiScaled,
        }
    }

    /// Nearest canonical process-level tier.
    pub fn process_tier(self) -> CapabilityTier {
        match self {
            AwarenessContext::Unaware | AwarenessContext::UnawareGdiScaled => {
                CapabilityTier::ProcessUnaware
            }
            AwarenessContext::SystemAware => CapabilityTier::ProcessSystemAware,
            AwarenessContext::PerMonitor | AwarenessContext::PerMonitorV2 => {
                CapabilityTier::ProcessPerMonitor
            }
        }
    }
}

/// Mode values of the process-level three-mode API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessAwareness {
    Unaware = 0,
    SystemAware = 1,
    PerMonitor = 2,
}

impl ProcessAwareness {
    pub fn from_raw(v: i32) -> Option<Self> {
        match v {
            0 => Some(ProcessAwareness::Unaware),
            1 => Some(ProcessAwareness::SystemAware),
            2 => Some(ProcessAwareness::PerMonitor),
            _ => None,
        }
    }

    pub fn from_context(context: AwarenessContext) -> Option<Self> {
        match context {
            AwarenessContext::Unaware => Some(ProcessAwareness::Unaware),
            AwarenessContext::SystemAware => Some(ProcessAwareness::SystemAware),
            AwarenessContext::PerMonitor => Some(ProcessAwareness::PerMonitor),
            AwarenessContext::PerMonitorV2 | AwarenessContext::UnawareGdiScaled => None,
        }
    }

    pub fn process_tier(self) -> CapabilityTier {
        match self {
            ProcessAwareness::Unaware => CapabilityTier::ProcessUnaware,
            ProcessAwareness::SystemAware => CapabilityTier::ProcessSystemAware,
            ProcessAwareness::PerMonitor => CapabilityTier::ProcessPerMonitor,
        }
    }
}

/// Result of a thread-level query or switch.
///
/// Keeps "the platform cannot do this" apart from a real tier, instead of
/// folding both into the `Unspecified` sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadCapability {
    Tier(CapabilityTier),
    /// No thread-context API at this feature level, or the host rejected the call.
    Unsupported,
}

impl ThreadCapability {
    /// Collapse to a tier, using `Unspecified` for "nothing to restore".
    pub fn tier(self) -> CapabilityTier {
        match self {
            ThreadCapability::Tier(t) => t,
            ThreadCapability::Unsupported => CapabilityTier::Unspecified,
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, ThreadCapability::Tier(_))
    }
}
