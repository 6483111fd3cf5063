//! # DPI Awareness Negotiation
//!
//! Detects which capability API the host OS exposes, declares the process tier
//! once at startup, and offers scoped thread-level overrides.
//!
//! - [`probe`]: OS version to [`OsFeatureLevel`] classification
//! - [`host`]: the [`HostApi`] seam and the null and simulated hosts
//! - [`controller`]: process/thread get, set and compare with the fallback ladder
//! - [`scope`]: RAII thread override with guaranteed restore

pub mod controller;
pub mod host;
pub mod probe;
pub mod scope;
pub mod tier;

#[cfg(windows)]
pub mod win32;

pub use controller::{AwarenessController, PROCESS_SETTERS, ProcessApi, ProcessSetter};
pub use host::{HostApi, NullHost, SharedHost, SimulatedHost, system_host};
pub use probe::{OsVersion, detect_os_feature_level, feature_level_for};
pub use scope::{
    ScopeSkip, ScopeState, ThreadAwarenessScope, ThreadScopeToken, with_system_awareness,
    with_thread_awareness,
};
pub use tier::{AwarenessContext, CapabilityTier, OsFeatureLevel, ProcessAwareness, ThreadCapability};

#[cfg(windows)]
pub use win32::Win32Host;
