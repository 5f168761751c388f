//! Node service — the device manager behind the control facade.
//!
//! Owns per-device activation state, worker handles and the flame
//! monitor, and exposes the control operations an HTTP layer maps onto
//! routes. Operations return a [`ControlOutcome`] value; logical
//! rejections are not errors.
//!
//! ```text
//!  activate_alarm ──▶ ┌─────────────────────────────┐
//!  activate_fan   ──▶ │         NodeService          │──▶ worker threads
//!  stop_fan       ──▶ │  gates · cancel flags ·      │      (sequencers)
//!  flame_status   ──▶ │  worker handles · monitor    │──▶ flame sampler
//!                     └─────────────────────────────┘
//! ```
//!
//! A sequence worker always releases its gate when the sequence
//! returns — completion, cooperative stop and line-claim failure all
//! funnel through the same release point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use log::{info, warn};

use crate::config::NodeConfig;
use crate::drivers::{alarm, servo};
use crate::exec;
use crate::gate::ActivationGate;
use crate::gpio::LineProvider;
use crate::pins;
use crate::sensors::flame::FlameMonitor;

// ───────────────────────────────────────────────────────────────
// Control outcomes
// ───────────────────────────────────────────────────────────────

/// Result of a control operation, for the facade to map to a response
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The request was accepted and the sequence dispatched (or the
    /// stop signalled).
    Accepted,
    /// A sequence is already in flight on this device.
    Conflict,
    /// A stop was requested for an idle device.
    Inactive,
}

impl ControlOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

// ───────────────────────────────────────────────────────────────
// Per-device state
// ───────────────────────────────────────────────────────────────

/// Activation state, cooperative-stop flag and worker handle for one
/// actuator device.
struct ActuatorSlot {
    gate: ActivationGate,
    cancel: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ActuatorSlot {
    fn new() -> Self {
        Self {
            gate: ActivationGate::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Win the gate and reset the stop flag for a fresh sequence.
    fn begin(&self) -> bool {
        if !self.gate.try_activate() {
            return false;
        }
        self.cancel.store(false, Ordering::SeqCst);
        true
    }

    /// Install the new worker handle, reaping a finished predecessor.
    fn adopt(&self, handle: JoinHandle<()>) {
        let mut slot = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = slot.replace(handle) {
            // The previous sequence released the gate before we won it,
            // so its thread is done or about to return.
            let _ = old.join();
        }
    }

    /// Signal a cooperative stop. Returns `false` when the device is
    /// idle.
    fn request_stop(&self) -> bool {
        if !self.gate.is_active() {
            return false;
        }
        self.cancel.store(true, Ordering::SeqCst);
        true
    }

    /// Join the current worker, if any.
    fn join(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

/// Device manager for one Flamewatch node: alarm, fan, flame monitor.
pub struct NodeService<P: LineProvider> {
    provider: Arc<P>,
    config: NodeConfig,
    alarm: ActuatorSlot,
    fan: ActuatorSlot,
    flame: FlameMonitor,
}

impl<P: LineProvider> NodeService<P> {
    pub fn new(provider: Arc<P>, config: NodeConfig) -> Self {
        let flame = FlameMonitor::new(&config.monitor);
        Self {
            provider,
            config,
            alarm: ActuatorSlot::new(),
            fan: ActuatorSlot::new(),
            flame,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the flame monitor. The actuators need no startup — they
    /// spawn workers on demand.
    pub fn start(&mut self) {
        self.flame.start(&self.provider, pins::FLAME_SENSE_LINE);
    }

    /// Signal every running sequence to stop, join the workers and
    /// stop the monitor.
    pub fn shutdown(&mut self) {
        info!("node: shutting down");
        self.alarm.cancel.store(true, Ordering::SeqCst);
        self.fan.cancel.store(true, Ordering::SeqCst);
        self.alarm.join();
        self.fan.join();
        self.flame.stop();
    }

    // ── Control operations ────────────────────────────────────

    /// Start the alarm sequence.
    pub fn activate_alarm(&self) -> ControlOutcome {
        if !self.alarm.begin() {
            warn!("alarm: activation rejected, sequence already in flight");
            return ControlOutcome::Conflict;
        }

        let provider = Arc::clone(&self.provider);
        let spec = self.config.alarm.clone();
        let cancel = spec
            .cancellable
            .then(|| Arc::clone(&self.alarm.cancel));
        let gate = self.alarm.gate.clone();

        let handle = exec::spawn_named("alarm-seq", move || {
            alarm::run(provider.as_ref(), pins::ALARM_LINE, &spec, cancel.as_deref());
            gate.deactivate();
        });
        self.alarm.adopt(handle);

        info!("alarm: sequence accepted ({}ms)", self.config.alarm.duration_ms);
        ControlOutcome::Accepted
    }

    /// Start the fan sweep sequence.
    pub fn activate_fan(&self) -> ControlOutcome {
        if !self.fan.begin() {
            warn!("fan: activation rejected, sequence already in flight");
            return ControlOutcome::Conflict;
        }

        let provider = Arc::clone(&self.provider);
        let spec = self.config.sweep.clone();
        let cancel = Arc::clone(&self.fan.cancel);
        let gate = self.fan.gate.clone();

        let handle = exec::spawn_named("fan-seq", move || {
            servo::run(provider.as_ref(), pins::FAN_SERVO_LINE, &spec, &cancel);
            gate.deactivate();
        });
        self.fan.adopt(handle);

        info!("fan: sequence accepted ({}ms)", self.config.sweep.duration_ms);
        ControlOutcome::Accepted
    }

    /// Request a cooperative stop of the fan sweep.
    pub fn stop_fan(&self) -> ControlOutcome {
        if self.fan.request_stop() {
            info!("fan: stop requested");
            ControlOutcome::Accepted
        } else {
            ControlOutcome::Inactive
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether any sample in the flame window was positive.
    pub fn flame_status(&self) -> bool {
        self.flame.was_flame_detected()
    }

    pub fn alarm_active(&self) -> bool {
        self.alarm.gate.is_active()
    }

    pub fn fan_active(&self) -> bool {
        self.fan.gate.is_active()
    }

    pub fn monitor_running(&self) -> bool {
        self.flame.is_running()
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> NodeConfig {
        self.config.clone()
    }
}

impl<P: LineProvider> Drop for NodeService<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
