//! Audible alarm sequencer (active buzzer).
//!
//! Drives the buzzer line in a 50%-duty square wave at a fixed half
//! period for a fixed wall-clock duration, then forces the output low.
//! Drift from sleep imprecision is acceptable; the duty cycle is not a
//! real-time guarantee.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::config::AlarmSpec;
use crate::gpio::{Level, LineProvider, OutputLine};

/// Claim the buzzer line and sound the alarm.
///
/// Blocking; intended for a dedicated worker thread. On claim failure
/// the error is logged and the sequence aborts without any output
/// transition — the owning worker releases the activation gate either
/// way.
///
/// `cancel` is observed once per wave cycle when present; the
/// production configuration passes `None` and the alarm runs to
/// completion unconditionally.
pub fn run<P: LineProvider>(
    provider: &P,
    offset: u32,
    spec: &AlarmSpec,
    cancel: Option<&AtomicBool>,
) {
    let mut line = match provider.claim_output(offset, Level::Low) {
        Ok(line) => line,
        Err(e) => {
            error!("alarm: cannot claim output line {}: {}", offset, e);
            return;
        }
    };
    sound(&mut line, spec, cancel);
}

/// Drive the square wave on an already-claimed line.
pub fn sound(line: &mut impl OutputLine, spec: &AlarmSpec, cancel: Option<&AtomicBool>) {
    let half_period = Duration::from_micros(spec.half_period_us);
    let deadline = Instant::now() + Duration::from_millis(spec.duration_ms);

    debug!(
        "alarm: sounding for {}ms at {}us half period",
        spec.duration_ms, spec.half_period_us
    );

    while Instant::now() < deadline {
        if cancel.is_some_and(|c| c.load(Ordering::SeqCst)) {
            debug!("alarm: cancelled");
            break;
        }
        line.set(Level::High);
        thread::sleep(half_period);
        line.set(Level::Low);
        thread::sleep(half_period);
    }

    // The buzzer must end silent whatever the loop left on the line.
    line.set(Level::Low);
}
