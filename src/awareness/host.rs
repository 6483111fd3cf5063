//! # Host OS Seam
//!
//! [`HostApi`] is the only way this crate touches the windowing system. Every
//! entry point returns `Option`: `None` means the export does not exist on this
//! OS build (or the host rejected the value), and callers branch on it instead
//! of catching platform errors.
//!
//! Three hosts ship with the crate:
//!
//! | Host | Use |
//! |------|-----|
//! | `Win32Host` | Real Windows entry points, resolved at runtime |
//! | [`NullHost`] | Non-Windows targets; every entry point absent |
//! | [`SimulatedHost`] | Deterministic in-memory host for tests and `dpictl --simulate` |

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::ThreadId;

use super::probe::OsVersion;
use super::tier::{AwarenessContext, OsFeatureLevel, ProcessAwareness};

/// Opaque native capability surface.
pub trait HostApi: Send + Sync {
    /// OS version triple, if the host exposes it.
    fn os_version(&self) -> Option<OsVersion>;

    /// Horizontal pixel density of the primary display.
    fn device_dpi(&self) -> Option<u32>;

    /// Legacy process flag query.
    fn is_process_dpi_aware(&self) -> Option<bool>;

    /// Legacy process flag switch (always to system-aware).
    fn set_process_dpi_aware(&self) -> Option<bool>;

    /// Process-level three-mode query.
    fn process_awareness(&self) -> Option<ProcessAwareness>;

    /// Process-level three-mode switch.
    fn set_process_awareness(&self, awareness: ProcessAwareness) -> Option<bool>;

    /// Process-level context switch.
    fn set_process_context(&self, context: AwarenessContext) -> Option<bool>;

    /// Calling thread's awareness context.
    fn thread_context(&self) -> Option<AwarenessContext>;

    /// Switch the calling thread's context; returns the previous one on success.
    fn set_thread_context(&self, context: AwarenessContext) -> Option<AwarenessContext>;

    /// Native semantic comparison of two contexts.
    fn contexts_equal(&self, a: AwarenessContext, b: AwarenessContext) -> Option<bool>;
}

/// Shared handle to the host used by every service object.
pub type SharedHost = Arc<dyn HostApi>;

/// Host for the current build target.
pub fn system_host() -> SharedHost {
    #[cfg(windows)]
    {
        Arc::new(super::win32::Win32Host::load())
    }
    #[cfg(not(windows))]
    {
        Arc::new(NullHost)
    }
}

/// Host with no DPI entry points at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl HostApi for NullHost {
    fn os_version(&self) -> Option<OsVersion> {
        None
    }
    fn device_dpi(&self) -> Option<u32> {
        None
    }
    fn is_process_dpi_aware(&self) -> Option<bool> {
        None
    }
    fn set_process_dpi_aware(&self) -> Option<bool> {
        None
    }
    fn process_awareness(&self) -> Option<ProcessAwareness> {
        None
    }
    fn set_process_awareness(&self, _awareness: ProcessAwareness) -> Option<bool> {
        None
    }
    fn set_process_context(&self, _context: AwarenessContext) -> Option<bool> {
        None
    }
    fn thread_context(&self) -> Option<AwarenessContext> {
        None
    }
    fn set_thread_context(&self, _context: AwarenessContext) -> Option<AwarenessContext> {
        None
    }
    fn contexts_equal(&self, _a: AwarenessContext, _b: AwarenessContext) -> Option<bool> {
        None
    }
}

#[derive(Debug, Default)]
struct SimState {
    /// `None` until the process awareness is declared; the OS default is unaware.
    process: Option<AwarenessContext>,
    threads: HashMap<ThreadId, AwarenessContext>,
}

impl SimState {
    fn process_context(&self) -> AwarenessContext {
        self.process.unwrap_or(AwarenessContext::Unaware)
    }
}

/// In-memory host that exposes exactly the entry points of one feature level.
///
/// Process awareness is set-once, as on the real OS. Thread contexts are keyed by
/// the calling thread and default to the process context.
#[derive(Debug)]
pub struct SimulatedHost {
    level: OsFeatureLevel,
    version: Option<OsVersion>,
    dpi: Option<u32>,
    rejected: Vec<AwarenessContext>,
    state: Mutex<SimState>,
    dpi_queries: AtomicUsize,
    process_calls: AtomicUsize,
    thread_calls: AtomicUsize,
}

impl SimulatedHost {
    /// Host at `level` reporting 96 DPI.
    pub fn new(level: OsFeatureLevel) -> Self {
        let version = match level {
            OsFeatureLevel::Legacy => OsVersion::new(6, 1, 7601),
            OsFeatureLevel::Tier1 => OsVersion::new(6, 3, 9600),
            OsFeatureLevel::Tier2 => OsVersion::new(10, 0, 14393),
            OsFeatureLevel::Tier3 => OsVersion::new(10, 0, 19045),
        };
        Self {
            level,
            version: Some(version),
            dpi: Some(96),
            rejected: Vec::new(),
            state: Mutex::new(SimState::default()),
            dpi_queries: AtomicUsize::new(0),
            process_calls: AtomicUsize::new(0),
            thread_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Simulate a display query that reports nothing.
    pub fn without_dpi(mut self) -> Self {
        self.dpi = None;
        self
    }

    /// Simulate unavailable version information.
    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }

    /// Declare the process awareness up front, as an application manifest would.
    pub fn with_process_context(self, context: AwarenessContext) -> Self {
        self.lock().process = Some(context);
        self
    }

    /// Make the host refuse `context` in every set call.
    pub fn rejecting(mut self, context: AwarenessContext) -> Self {
        self.rejected.push(context);
        self
    }

    pub fn feature_level(&self) -> OsFeatureLevel {
        self.level
    }

    /// Number of device DPI queries served.
    pub fn dpi_queries(&self) -> usize {
        self.dpi_queries.load(Ordering::SeqCst)
    }

    /// Number of process-level set calls served.
    pub fn process_calls(&self) -> usize {
        self.process_calls.load(Ordering::SeqCst)
    }

    /// Number of thread-context calls served (query, set or compare).
    pub fn thread_calls(&self) -> usize {
        self.thread_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn declare_process(&self, context: AwarenessContext) -> bool {
        if self.rejected.contains(&context) {
            return false;
        }
        let mut state = self.lock();
        if state.process.is_some() {
            return false;
        }
        state.process = Some(context);
        true
    }
}

impl HostApi for SimulatedHost {
    fn os_version(&self) -> Option<OsVersion> {
        self.version
    }

    fn device_dpi(&self) -> Option<u32> {
        self.dpi_queries.fetch_add(1, Ordering::SeqCst);
        self.dpi
    }

    fn is_process_dpi_aware(&self) -> Option<bool> {
        let context = self.lock().process_context();
        Some(!matches!(
            context,
            AwarenessContext::Unaware | AwarenessContext::UnawareGdiScaled
        ))
    }

    fn set_process_dpi_aware(&self) -> Option<bool> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        Some(self.declare_process(AwarenessContext::SystemAware))
    }

    fn process_awareness(&self) -> Option<ProcessAwareness> {
        if self.level < OsFeatureLevel::Tier1 {
            return None;
        }
        let awareness = match self.lock().process_context() {
            AwarenessContext::Unaware | AwarenessContext::UnawareGdiScaled => {
                ProcessAwareness::Unaware
            }
            AwarenessContext::SystemAware => ProcessAwareness::SystemAware,
            AwarenessContext::PerMonitor | AwarenessContext::PerMonitorV2 => {
                ProcessAwareness::PerMonitor
            }
        };
        Some(awareness)
    }

    fn set_process_awareness(&self, awareness: ProcessAwareness) -> Option<bool> {
        if self.level < OsFeatureLevel::Tier1 {
            return None;
        }
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        let context = match awareness {
            ProcessAwareness::Unaware => AwarenessContext::Unaware,
            ProcessAwareness::SystemAware => AwarenessContext::SystemAware,
            ProcessAwareness::PerMonitor => AwarenessContext::PerMonitor,
        };
        Some(self.declare_process(context))
    }

    fn set_process_context(&self, context: AwarenessContext) -> Option<bool> {
        if self.level < OsFeatureLevel::Tier3 {
            return None;
        }
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        Some(self.declare_process(context))
    }

    fn thread_context(&self) -> Option<AwarenessContext> {
        if !self.level.has_thread_contexts() {
            return None;
        }
        self.thread_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        let id = std::thread::current().id();
        Some(
            state
                .threads
                .get(&id)
                .copied()
                .unwrap_or_else(|| state.process_context()),
        )
    }

    fn set_thread_context(&self, context: AwarenessContext) -> Option<AwarenessContext> {
        if !self.level.has_thread_contexts() {
            return None;
        }
        self.thread_calls.fetch_add(1, Ordering::SeqCst);
        if context.min_thread_level() > self.level || self.rejected.contains(&context) {
            return None;
        }
        let mut state = self.lock();
        let fallback = state.process_context();
        let id = std::thread::current().id();
        let previous = state.threads.insert(id, context).unwrap_or(fallback);
        Some(previous)
    }

    fn contexts_equal(&self, a: AwarenessContext, b: AwarenessContext) -> Option<bool> {
        if !self.level.has_thread_contexts() {
            return None;
        }
        self.thread_calls.fetch_add(1, Ordering::SeqCst);
        Some(a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_host_has_nothing() {
        let host = NullHost;
        assert!(host.os_version().is_none());
        assert!(host.device_dpi().is_none());
        assert!(host.thread_context().is_none());
        assert!(host.set_thread_context(AwarenessContext::PerMonitorV2).is_none());
    }

    #[test]
    fn simulated_process_awareness_is_set_once() {
        let host = SimulatedHost::new(OsFeatureLevel::Tier3);
        assert_eq!(host.set_process_context(AwarenessContext::PerMonitorV2), Some(true));
        assert_eq!(host.set_process_context(AwarenessContext::SystemAware), Some(false));
        assert_eq!(host.process_awareness(), Some(ProcessAwareness::PerMonitor));
        assert_eq!(host.process_calls(), 2);
    }

    #[test]
    fn simulated_entry_points_follow_level() {
        let tier1 = SimulatedHost::new(OsFeatureLevel::Tier1);
        assert!(tier1.set_process_context(AwarenessContext::PerMonitor).is_none());
        assert!(tier1.thread_context().is_none());
        assert_eq!(tier1.thread_calls(), 0);

        let tier2 = SimulatedHost::new(OsFeatureLevel::Tier2);
        assert!(tier2.set_thread_context(AwarenessContext::PerMonitorV2).is_none());
        assert_eq!(
            tier2.set_thread_context(AwarenessContext::PerMonitor),
            Some(AwarenessContext::Unaware)
        );
        assert_eq!(tier2.thread_context(), Some(AwarenessContext::PerMonitor));
    }

    #[test]
    fn thread_contexts_do_not_leak_across_threads() {
        let host = Arc::new(SimulatedHost::new(OsFeatureLevel::Tier3));
        host.set_thread_context(AwarenessContext::SystemAware);

        let other = Arc::clone(&host);
        let seen = std::thread::spawn(move || other.thread_context())
            .join()
            .unwrap();
        assert_eq!(seen, Some(AwarenessContext::Unaware));
        assert_eq!(host.thread_context(), Some(AwarenessContext::SystemAware));
    }
}
