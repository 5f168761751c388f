//! Simulated GPIO backend for host development and tests.
//!
//! Records every output transition so tests can assert on the full
//! pulse history, scripts the input level, and can inject claim
//! failures to exercise the per-sequence failure path.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::GpioError;
use crate::gpio::{InputLine, Level, LineProvider, OutputLine};

#[derive(Default)]
struct SimState {
    /// Scripted level returned by every claimed input line.
    input_high: AtomicBool,
    /// When set, every claim fails with a simulated line-request error.
    fail_claims: AtomicBool,
    output_claims: AtomicUsize,
    input_claims: AtomicUsize,
    /// Every output write, in order: (line offset, level).
    transitions: Mutex<Vec<(u32, Level)>>,
}

/// Cloneable simulated backend; clones share one recorded state.
#[derive(Clone, Default)]
pub struct SimGpio {
    state: Arc<SimState>,
}

impl SimGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the level every claimed input reads.
    pub fn set_input_high(&self, high: bool) {
        self.state.input_high.store(high, Ordering::SeqCst);
    }

    /// Make subsequent claims fail (or succeed again).
    pub fn fail_claims(&self, fail: bool) {
        self.state.fail_claims.store(fail, Ordering::SeqCst);
    }

    /// Number of successful output claims so far.
    pub fn output_claims(&self) -> usize {
        self.state.output_claims.load(Ordering::SeqCst)
    }

    /// Number of successful input claims so far.
    pub fn input_claims(&self) -> usize {
        self.state.input_claims.load(Ordering::SeqCst)
    }

    /// Snapshot of every output write so far, in order.
    pub fn transitions(&self) -> Vec<(u32, Level)> {
        self.lock_transitions().clone()
    }

    /// Most recent level written to `offset`, if any.
    pub fn last_level(&self, offset: u32) -> Option<Level> {
        self.lock_transitions()
            .iter()
            .rev()
            .find(|(o, _)| *o == offset)
            .map(|(_, level)| *level)
    }

    fn lock_transitions(&self) -> std::sync::MutexGuard<'_, Vec<(u32, Level)>> {
        self.state
            .transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct SimOutput {
    offset: u32,
    state: Arc<SimState>,
}

impl OutputLine for SimOutput {
    fn set(&mut self, level: Level) {
        self.state
            .transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((self.offset, level));
    }
}

pub struct SimInput {
    state: Arc<SimState>,
}

impl InputLine for SimInput {
    fn level(&mut self) -> Level {
        Level::from_bool(self.state.input_high.load(Ordering::SeqCst))
    }
}

impl LineProvider for SimGpio {
    type Output = SimOutput;
    type Input = SimInput;

    fn claim_output(&self, offset: u32, _initial: Level) -> Result<SimOutput, GpioError> {
        if self.state.fail_claims.load(Ordering::SeqCst) {
            return Err(GpioError::LineRequest {
                offset,
                detail: "simulated claim failure".into(),
            });
        }
        self.state.output_claims.fetch_add(1, Ordering::SeqCst);
        Ok(SimOutput {
            offset,
            state: Arc::clone(&self.state),
        })
    }

    fn claim_input(&self, offset: u32) -> Result<SimInput, GpioError> {
        if self.state.fail_claims.load(Ordering::SeqCst) {
            return Err(GpioError::LineRequest {
                offset,
                detail: "simulated claim failure".into(),
            });
        }
        self.state.input_claims.fetch_add(1, Ordering::SeqCst);
        Ok(SimInput {
            state: Arc::clone(&self.state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_output_transitions_in_order() {
        let sim = SimGpio::new();
        let mut line = sim.claim_output(5, Level::Low).unwrap();
        line.set(Level::High);
        line.set(Level::Low);

        assert_eq!(sim.transitions(), vec![(5, Level::High), (5, Level::Low)]);
        assert_eq!(sim.last_level(5), Some(Level::Low));
        assert_eq!(sim.last_level(6), None);
    }

    #[test]
    fn scripted_input_level() {
        let sim = SimGpio::new();
        let mut line = sim.claim_input(6).unwrap();
        assert!(!line.level().is_high());
        sim.set_input_high(true);
        assert!(line.level().is_high());
    }

    #[test]
    fn injected_claim_failure() {
        let sim = SimGpio::new();
        sim.fail_claims(true);
        assert!(sim.claim_output(5, Level::Low).is_err());
        assert!(sim.claim_input(6).is_err());
        assert_eq!(sim.output_claims(), 0);

        sim.fail_claims(false);
        assert!(sim.claim_output(5, Level::Low).is_ok());
        assert_eq!(sim.output_claims(), 1);
    }
}
