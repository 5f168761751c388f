//! Fan sweep sequencer (hobby servo, software pulse-width positioning).
//!
//! Positions are pseudo-encoded as pulse widths: the two sweep extremes
//! and a neutral midpoint. The sweep alternates bursts of confirmation
//! pulses between the extremes until the deadline or a cooperative stop,
//! then parks at neutral. Parking is unconditional — the servo must
//! never be left leaning on an extreme.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::config::SweepSpec;
use crate::gpio::{Level, LineProvider, OutputLine};

/// Which extreme the sweep is currently latched toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepPosition {
    MinStop,
    MaxStop,
}

impl SweepPosition {
    fn opposite(self) -> Self {
        match self {
            Self::MinStop => Self::MaxStop,
            Self::MaxStop => Self::MinStop,
        }
    }
}

/// Emit exactly one positioning pulse of `pulse_us`, then hold the
/// mandatory settle time. This is the atomic unit of motion.
pub fn move_to(line: &mut impl OutputLine, pulse_us: u64, settle: Duration) {
    line.set(Level::High);
    thread::sleep(Duration::from_micros(pulse_us));
    line.set(Level::Low);
    thread::sleep(settle);
}

/// Claim the servo line and run the sweep.
///
/// Blocking; intended for a dedicated worker thread. On claim failure
/// the error is logged and the sequence aborts — the owning worker
/// releases the activation gate either way.
pub fn run<P: LineProvider>(provider: &P, offset: u32, spec: &SweepSpec, cancel: &AtomicBool) {
    let mut line = match provider.claim_output(offset, Level::Low) {
        Ok(line) => line,
        Err(e) => {
            error!("fan: cannot claim output line {}: {}", offset, e);
            return;
        }
    };
    sweep(&mut line, spec, cancel);
}

/// Run the sweep on an already-claimed line.
///
/// Both the outer loop and each confirmation burst re-check `cancel`,
/// so the worst-case stop latency is one pulse plus one settle time.
pub fn sweep(line: &mut impl OutputLine, spec: &SweepSpec, cancel: &AtomicBool) {
    let settle = Duration::from_micros(spec.settle_us);
    let deadline = Instant::now() + Duration::from_millis(spec.duration_ms);

    // First burst heads toward the far stop.
    let mut position = SweepPosition::MinStop;

    while Instant::now() < deadline && !cancel.load(Ordering::SeqCst) {
        let target_us = match position {
            SweepPosition::MinStop => spec.max_pulse_us,
            SweepPosition::MaxStop => spec.min_pulse_us,
        };
        debug!("fan: bursting toward {}us stop", target_us);

        for _ in 0..spec.burst_pulses {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            move_to(line, target_us, settle);
        }
        position = position.opposite();
    }

    debug!("fan: parking at neutral ({}us)", spec.neutral_pulse_us);
    for _ in 0..spec.park_pulses {
        move_to(line, spec.neutral_pulse_us, settle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::sim::SimGpio;

    const LINE: u32 = 17;

    fn fast_spec() -> SweepSpec {
        SweepSpec {
            min_pulse_us: 100,
            max_pulse_us: 300,
            neutral_pulse_us: 200,
            settle_us: 200,
            burst_pulses: 2,
            park_pulses: 5,
            duration_ms: 20,
        }
    }

    #[test]
    fn single_pulse_shape() {
        let sim = SimGpio::new();
        let mut line = sim.claim_output(LINE, Level::Low).unwrap();
        move_to(&mut line, 100, Duration::from_micros(100));
        assert_eq!(sim.transitions(), vec![(LINE, Level::High), (LINE, Level::Low)]);
    }

    #[test]
    fn cancelled_before_start_parks_exactly() {
        let sim = SimGpio::new();
        let cancel = AtomicBool::new(true);
        let spec = fast_spec();

        run(&sim, LINE, &spec, &cancel);

        // No sweep bursts, only the park pulses: one High/Low pair each.
        let transitions = sim.transitions();
        assert_eq!(transitions.len(), 2 * spec.park_pulses as usize);
        for pair in transitions.chunks(2) {
            assert_eq!(pair, [(LINE, Level::High), (LINE, Level::Low)]);
        }
    }

    #[test]
    fn deadline_bounds_the_sweep_and_parks() {
        let sim = SimGpio::new();
        let cancel = AtomicBool::new(false);
        let spec = fast_spec();

        let started = Instant::now();
        run(&sim, LINE, &spec, &cancel);
        let elapsed = started.elapsed();

        assert!(
            elapsed >= Duration::from_millis(spec.duration_ms),
            "sweep returned before its deadline: {:?}",
            elapsed
        );
        assert!(elapsed < Duration::from_secs(2), "sweep overran: {:?}", elapsed);

        let transitions = sim.transitions();
        // At least one burst plus the park pulses, all High/Low pairs,
        // ending low.
        assert!(transitions.len() >= 2 * (spec.burst_pulses + spec.park_pulses) as usize);
        assert_eq!(transitions.len() % 2, 0);
        assert_eq!(transitions.last(), Some(&(LINE, Level::Low)));
    }

    #[test]
    fn mid_sweep_cancel_still_parks() {
        let sim = SimGpio::new();
        let cancel = std::sync::Arc::new(AtomicBool::new(false));
        let mut spec = fast_spec();
        spec.duration_ms = 5_000;

        let setter = {
            let cancel = std::sync::Arc::clone(&cancel);
            std::thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                cancel.store(true, Ordering::SeqCst);
            })
        };

        let started = Instant::now();
        run(&sim, LINE, &spec, &cancel);
        setter.join().unwrap();

        assert!(
            started.elapsed() < Duration::from_millis(2_000),
            "cancel did not shorten the sweep"
        );

        let transitions = sim.transitions();
        assert!(transitions.len() >= 2 * spec.park_pulses as usize);
        assert_eq!(transitions.last(), Some(&(LINE, Level::Low)));
    }

    #[test]
    fn claim_failure_aborts_without_output() {
        let sim = SimGpio::new();
        let cancel = AtomicBool::new(false);
        sim.fail_claims(true);
        run(&sim, LINE, &fast_spec(), &cancel);
        assert!(sim.transitions().is_empty());
    }
}
