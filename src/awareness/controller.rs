//! # Awareness Controller
//!
//! Reads and declares process- and thread-level capability tiers through
//! whichever native surface the detected [`OsFeatureLevel`] exposes.
//!
//! ## Process fallback ladder
//!
//! A process request walks the context ladder
//! `PerMonitorV2 -> PerMonitor -> SystemAware -> Unaware`
//! (`UnawareGdiScaled -> Unaware`). For each rung the first entry of
//! [`PROCESS_SETTERS`] that is available at the detected level and can express
//! the rung is called. The table is static: `UnawareGdiScaled` is only ever
//! attempted through the Tier3 context API.
//!
//! ## Failure semantics
//!
//! A missing entry point never raises; it is described as a
//! [`DpiError::UnsupportedOnPlatform`] in the debug log and the ladder moves on.
//! Thread operations below Tier2 return [`ThreadCapability::Unsupported`]
//! without touching the host. Only caller misuse (an `Unspecified` target)
//! produces an `Err`.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, info};

use super::host::SharedHost;
use super::probe::detect_os_feature_level;
use super::tier::{AwarenessContext, CapabilityTier, OsFeatureLevel, ProcessAwareness, ThreadCapability};
use crate::error::{DpiError, DpiResult};

const LEVEL_UNKNOWN: u8 = u8::MAX;

/// Native API used by a process setter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessApi {
    /// `SetProcessDpiAwarenessContext`
    Context,
    /// `SetProcessDpiAwareness`
    ThreeMode,
    /// `SetProcessDPIAware`
    LegacyFlag,
}

/// One row of the process fallback table.
#[derive(Clone, Copy, Debug)]
pub struct ProcessSetter {
    pub min_level: OsFeatureLevel,
    pub api: ProcessApi,
    pub contexts: &'static [AwarenessContext],
}

impl ProcessApi {
    /// Native export behind this API.
    pub fn entry_point(self) -> &'static str {
        match self {
            ProcessApi::Context => "SetProcessDpiAwarenessContext",
            ProcessApi::ThreeMode => "SetProcessDpiAwareness",
            ProcessApi::LegacyFlag => "SetProcessDPIAware",
        }
    }
}

impl ProcessSetter {
    fn supports(&self, context: AwarenessContext) -> bool {
        self.contexts.contains(&context)
    }
}

/// Highest fidelity first.
pub const PROCESS_SETTERS: &[ProcessSetter] = &[
    ProcessSetter {
        min_level: OsFeatureLevel::Tier3,
        api: ProcessApi::Context,
        contexts: &[
            AwarenessContext::PerMonitorV2,
            AwarenessContext::UnawareGdiScaled,
            AwarenessContext::PerMonitor,
            AwarenessContext::SystemAware,
            AwarenessContext::Unaware,
        ],
    },
    ProcessSetter {
        min_level: OsFeatureLevel::Tier1,
        api: ProcessApi::ThreeMode,
        contexts: &[
            AwarenessContext::PerMonitor,
            AwarenessContext::SystemAware,
            AwarenessContext::Unaware,
        ],
    },
    ProcessSetter {
        min_level: OsFeatureLevel::Legacy,
        api: ProcessApi::LegacyFlag,
        contexts: &[AwarenessContext::SystemAware],
    },
];

/// Process- and thread-level capability negotiation against one host.
pub struct AwarenessController {
    host: SharedHost,
    level: AtomicU8,
}

impl AwarenessController {
    pub fn new(host: SharedHost) -> Self {
        Self {
            host,
            level: AtomicU8::new(LEVEL_UNKNOWN),
        }
    }

    pub fn host(&self) -> &SharedHost {
        &self.host
    }

    /// Detected feature level, probed once and then read from the memo.
    ///
    /// Racing first callers each probe and store the same value.
    pub fn feature_level(&self) -> OsFeatureLevel {
        if let Some(level) = OsFeatureLevel::from_u8(self.level.load(Ordering::Acquire)) {
            return level;
        }
        let level = detect_os_feature_level(self.host.as_ref());
        let _ = self.level.compare_exchange(
            LEVEL_UNKNOWN,
            level.to_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        level
    }

    /// Current process tier, `Unspecified` when no query exists.
    pub fn get_process_capability(&self) -> CapabilityTier {
        let level = self.feature_level();
        if level.has_thread_contexts() {
            if let Some(context) = self.host.thread_context() {
                return context.process_tier();
            }
        }
        if level >= OsFeatureLevel::Tier1 {
            if let Some(awareness) = self.host.process_awareness() {
                return awareness.process_tier();
            }
        }
        match self.host.is_process_dpi_aware() {
            Some(true) => CapabilityTier::ProcessSystemAware,
            Some(false) => CapabilityTier::ProcessUnaware,
            None => CapabilityTier::Unspecified,
        }
    }

    /// Declare the process tier, descending the fallback ladder as needed.
    ///
    /// Must run once, before the first UI surface exists and never from two
    /// threads at once; this is not enforced. Returns whether any rung was
    /// accepted.
    pub fn set_process_capability(&self, requested: CapabilityTier) -> DpiResult<bool> {
        let Some(context) = requested.context() else {
            return Err(DpiError::invalid_request(
                "set_process_capability",
                "Unspecified is not a capability that can be requested",
            )
            .with_recovery_suggestion("Request a concrete tier such as ThreadPerMonitorV2"));
        };
        let level = self.feature_level();

        for rung in context.ladder() {
            for setter in PROCESS_SETTERS
                .iter()
                .filter(|s| s.min_level <= level && s.supports(rung))
            {
                match self.call_setter(setter.api, rung) {
                    Some(true) => {
                        info!(%requested, ?rung, api = ?setter.api, "process DPI awareness declared");
                        return Ok(true);
                    }
                    Some(false) => debug!(?rung, api = ?setter.api, "host rejected process awareness"),
                    None => {
                        let condition = DpiError::unsupported(setter.api.entry_point(), level.to_string());
                        debug!(?rung, %condition, "process awareness rung skipped");
                    }
                }
            }
            // An unaware process needs no declaration.
            if rung == AwarenessContext::Unaware
                && self.get_process_capability() == CapabilityTier::ProcessUnaware
            {
                info!(%requested, "process left at default unaware tier");
                return Ok(true);
            }
        }
        debug!(%requested, %level, "no process awareness rung accepted");
        Ok(false)
    }

    fn call_setter(&self, api: ProcessApi, context: AwarenessContext) -> Option<bool> {
        match api {
            ProcessApi::Context => self.host.set_process_context(context),
            ProcessApi::ThreeMode => {
                let awareness = ProcessAwareness::from_context(context)?;
                self.host.set_process_awareness(awareness)
            }
            ProcessApi::LegacyFlag => match context {
                AwarenessContext::SystemAware => self.host.set_process_dpi_aware(),
                _ => None,
            },
        }
    }

    /// Calling thread's tier, or `Unsupported` below Tier2.
    pub fn get_thread_capability(&self) -> ThreadCapability {
        if !self.feature_level().has_thread_contexts() {
            return ThreadCapability::Unsupported;
        }
        match self.host.thread_context() {
            Some(context) => ThreadCapability::Tier(context.thread_tier()),
            None => ThreadCapability::Unsupported,
        }
    }

    /// Context a thread switch to `tier` lands on at the detected level.
    ///
    /// Contexts newer than the level are mapped down the ladder to the first one
    /// the level accepts (PerMonitorV2 becomes PerMonitor at Tier2). `None` for
    /// `Unspecified` and below Tier2.
    pub fn thread_target(&self, tier: CapabilityTier) -> Option<AwarenessContext> {
        let requested = tier.context()?;
        let level = self.feature_level();
        if !level.has_thread_contexts() {
            return None;
        }
        requested.ladder().find(|c| c.min_thread_level() <= level)
    }

    /// Switch the calling thread's tier and return the tier it replaced.
    ///
    /// The switch lands on [`Self::thread_target`]. Below Tier2, or when the
    /// host rejects the call, nothing changes and `Unsupported` is returned.
    pub fn set_thread_capability(&self, tier: CapabilityTier) -> DpiResult<ThreadCapability> {
        let Some(requested) = tier.context() else {
            return Err(DpiError::invalid_request(
                "set_thread_capability",
                "Unspecified is not a capability that can be requested",
            ));
        };
        let level = self.feature_level();
        let Some(context) = self.thread_target(tier) else {
            let condition = DpiError::unsupported("SetThreadDpiAwarenessContext", level.to_string());
            debug!(?requested, %condition, "thread awareness left unchanged");
            return Ok(ThreadCapability::Unsupported);
        };
        if context != requested {
            debug!(?requested, ?context, %level, "thread context mapped to supported rung");
        }
        match self.host.set_thread_context(context) {
            Some(previous) => Ok(ThreadCapability::Tier(previous.thread_tier())),
            None => {
                let condition = DpiError::unsupported(format!("{context:?} thread context"), level.to_string());
                debug!(%condition, "host rejected thread context");
                Ok(ThreadCapability::Unsupported)
            }
        }
    }

    /// Semantic equality of two tiers. Never fails; `false` without a native comparison.
    pub fn try_capabilities_equal(&self, a: CapabilityTier, b: CapabilityTier) -> bool {
        match (a.context(), b.context()) {
            (None, None) => true,
            (Some(ca), Some(cb)) => {
                self.feature_level().has_thread_contexts()
                    && self.host.contexts_equal(ca, cb).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Query-only PerMonitorV2 detection, available from Tier2.
    pub fn is_per_monitor_v2_active(&self) -> bool {
        if !self.feature_level().has_thread_contexts() {
            return false;
        }
        self.host.thread_context().is_some_and(|current| {
            self.host
                .contexts_equal(current, AwarenessContext::PerMonitorV2)
                .unwrap_or(false)
        })
    }
}

impl std::fmt::Debug for AwarenessController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwarenessController")
            .field("level", &OsFeatureLevel::from_u8(self.level.load(Ordering::Acquire)))
            .finish_non_exhaustive()
    }
}
