//! Single-slot activation gate.
//!
//! Each actuator device carries one gate preventing a second timed
//! sequence from starting while one is in flight. The gate is the only
//! synchronisation between the request path and a running sequence:
//! the request path wins the gate before spawning a worker, and the
//! worker releases it when the sequence returns.
//!
//! Sequential consistency is deliberate — a device must never be
//! startable twice concurrently, whichever threads race.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle to a per-device exclusivity flag.
///
/// Clones share the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct ActivationGate {
    active: Arc<AtomicBool>,
}

impl ActivationGate {
    /// New gate in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically transition Idle → Active.
    ///
    /// Returns `true` for exactly one caller until [`deactivate`] is
    /// invoked; concurrent losers observe Active and get `false` with
    /// no mutation.
    ///
    /// [`deactivate`]: Self::deactivate
    pub fn try_activate(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Unconditionally return to Idle. Idempotent.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Current state.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
