//! # Thread Awareness Scope
//!
//! Temporarily overrides the calling thread's capability tier and restores it
//! when the scope is dropped: on normal return, early return, `?` propagation
//! and panic unwinding alike.
//!
//! ```rust
//! use std::sync::Arc;
//! use dpi_awareness::awareness::{
//!     AwarenessController, CapabilityTier, OsFeatureLevel, SimulatedHost, ThreadAwarenessScope,
//! };
//!
//! let controller = AwarenessController::new(Arc::new(
//!     SimulatedHost::new(OsFeatureLevel::Tier3)
//!         .with_process_context(dpi_awareness::awareness::AwarenessContext::PerMonitorV2),
//! ));
//! {
//!     let scope = ThreadAwarenessScope::enter(&controller, CapabilityTier::ThreadSystemAware);
//!     assert!(scope.is_mutated());
//!     assert_eq!(controller.get_thread_capability().tier(), CapabilityTier::ThreadSystemAware);
//! }
//! assert_eq!(controller.get_thread_capability().tier(), CapabilityTier::ThreadPerMonitorV2);
//! ```

use std::marker::PhantomData;

use tracing::debug;

use super::controller::AwarenessController;
use super::tier::{CapabilityTier, ThreadCapability};

/// Why entering a scope left the thread untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeSkip {
    /// The caller asked for `Unspecified`.
    NotRequested,
    /// The thread already runs at the requested tier.
    AlreadyActive,
    /// The thread is unaware; unaware threads are never force-switched.
    UnawareBaseline,
    /// No thread-context API at this feature level.
    Unsupported,
    /// The host refused the switch.
    SetFailed,
}

/// Lifecycle of a scope. `Idle` is the state before [`ThreadAwarenessScope::enter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeState {
    Idle,
    Entered,
    Exited,
}

/// Record of what entering changed. Consumed exactly once on exit.
#[derive(Debug, PartialEq, Eq)]
pub struct ThreadScopeToken {
    pub original_tier: CapabilityTier,
    pub mutated: bool,
    pub skip: Option<ScopeSkip>,
}

impl ThreadScopeToken {
    fn skipped(original_tier: CapabilityTier, reason: ScopeSkip) -> Self {
        Self {
            original_tier,
            mutated: false,
            skip: Some(reason),
        }
    }
}

/// Scoped thread capability override. Not `Send`: the restore must run on the
/// thread that entered.
#[must_use = "the override is reverted as soon as the scope is dropped"]
pub struct ThreadAwarenessScope<'a> {
    controller: &'a AwarenessController,
    token: ThreadScopeToken,
    state: ScopeState,
    _thread_bound: PhantomData<*const ()>,
}

impl<'a> ThreadAwarenessScope<'a> {
    /// Enter a scope that switches the calling thread to `tier` when needed.
    pub fn enter(controller: &'a AwarenessController, tier: CapabilityTier) -> Self {
        let token = Self::acquire(controller, tier);
        debug!(%tier, mutated = token.mutated, skip = ?token.skip, "entered thread awareness scope");
        Self {
            controller,
            token,
            state: ScopeState::Entered,
            _thread_bound: PhantomData,
        }
    }

    fn acquire(controller: &AwarenessController, tier: CapabilityTier) -> ThreadScopeToken {
        if !tier.is_specified() {
            return ThreadScopeToken::skipped(CapabilityTier::Unspecified, ScopeSkip::NotRequested);
        }
        let current = match controller.get_thread_capability() {
            ThreadCapability::Tier(current) => current,
            ThreadCapability::Unsupported => {
                return ThreadScopeToken::skipped(CapabilityTier::Unspecified, ScopeSkip::Unsupported);
            }
        };
        // Compare against where the switch would land, not what was asked for.
        let target = controller.thread_target(tier).map_or(tier, |c| c.thread_tier());
        if controller.try_capabilities_equal(current, target) {
            return ThreadScopeToken::skipped(current, ScopeSkip::AlreadyActive);
        }
        if controller.try_capabilities_equal(current, CapabilityTier::ThreadUnaware) {
            return ThreadScopeToken::skipped(current, ScopeSkip::UnawareBaseline);
        }
        match controller.set_thread_capability(tier) {
            Ok(ThreadCapability::Tier(previous)) => ThreadScopeToken {
                original_tier: previous,
                mutated: true,
                skip: None,
            },
            Ok(ThreadCapability::Unsupported) | Err(_) => {
                ThreadScopeToken::skipped(current, ScopeSkip::SetFailed)
            }
        }
    }

    /// Restore the original tier if entering changed it. Later calls do nothing.
    pub fn exit(&mut self) {
        if self.state == ScopeState::Exited {
            return;
        }
        self.state = ScopeState::Exited;
        if !self.token.mutated {
            return;
        }
        self.token.mutated = false;
        match self.controller.set_thread_capability(self.token.original_tier) {
            Ok(_) => debug!(tier = %self.token.original_tier, "restored thread awareness"),
            Err(e) => debug!(error = %e, "thread awareness restore skipped"),
        }
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    pub fn token(&self) -> &ThreadScopeToken {
        &self.token
    }

    /// Whether the thread is currently switched by this scope.
    pub fn is_mutated(&self) -> bool {
        self.token.mutated
    }

    pub fn skip_reason(&self) -> Option<ScopeSkip> {
        self.token.skip
    }
}

impl Drop for ThreadAwarenessScope<'_> {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Run `f` with the calling thread switched to `tier`, restoring afterwards.
pub fn with_thread_awareness<R>(
    controller: &AwarenessController,
    tier: CapabilityTier,
    f: impl FnOnce() -> R,
) -> R {
    let _scope = ThreadAwarenessScope::enter(controller, tier);
    f()
}

/// Build something (typically a dialog) in a system-aware thread context.
pub fn with_system_awareness<R>(controller: &AwarenessController, f: impl FnOnce() -> R) -> R {
    with_thread_awareness(controller, CapabilityTier::ThreadSystemAware, f)
}
