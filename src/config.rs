//! Timing and behaviour parameters for the Flamewatch devices.
//!
//! Defaults are the production constants; they are not expected to change
//! at runtime. Carrying them in a config struct keeps the sequencers
//! testable with compressed timings and lets a deployment override the
//! node's behaviour from a JSON file.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Alarm sequence parameters (square wave on the buzzer line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmSpec {
    /// Square-wave half period in microseconds (on time equals off time).
    pub half_period_us: u64,
    /// Total sounding duration in milliseconds.
    pub duration_ms: u64,
    /// Whether the sequence observes a cooperative stop flag each cycle.
    /// The production alarm runs to completion once started.
    pub cancellable: bool,
}

impl Default for AlarmSpec {
    fn default() -> Self {
        Self {
            half_period_us: 500,
            duration_ms: 10_000,
            cancellable: false,
        }
    }
}

/// Fan sweep parameters (pulse-width positioning of the servo).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSpec {
    /// Pulse width commanding one extreme, in microseconds.
    pub min_pulse_us: u64,
    /// Pulse width commanding the other extreme, in microseconds.
    pub max_pulse_us: u64,
    /// Pulse width commanding the neutral midpoint, in microseconds.
    pub neutral_pulse_us: u64,
    /// Mandatory pause after each pulse before the next command, in
    /// microseconds.
    pub settle_us: u64,
    /// Confirmation pulses per extreme. Hobby servos need repeated
    /// stimulus to reliably latch a commanded position.
    pub burst_pulses: u32,
    /// Neutral pulses emitted when the sweep ends, whatever the cause.
    pub park_pulses: u32,
    /// Total sweep duration in milliseconds.
    pub duration_ms: u64,
}

impl Default for SweepSpec {
    fn default() -> Self {
        Self {
            min_pulse_us: 500,
            max_pulse_us: 2_500,
            neutral_pulse_us: 1_500,
            settle_us: 5_000,
            burst_pulses: 10,
            park_pulses: 5,
            duration_ms: 10_000,
        }
    }
}

/// Flame monitor parameters.
///
/// The detection window capacity is a compile-time constant
/// ([`WINDOW_CAPACITY`](crate::sensors::flame::WINDOW_CAPACITY)), not a
/// config field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSpec {
    /// Pause between samples, in milliseconds.
    pub sample_interval_ms: u64,
}

impl Default for MonitorSpec {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
        }
    }
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    pub alarm: AlarmSpec,
    pub sweep: SweepSpec,
    pub monitor: MonitorSpec,
}

impl NodeConfig {
    /// Reject out-of-range values rather than silently clamping them.
    pub fn validate(&self) -> Result<(), Error> {
        if self.alarm.half_period_us == 0 {
            return Err(Error::Config("alarm half period must be non-zero"));
        }
        if self.alarm.duration_ms == 0 {
            return Err(Error::Config("alarm duration must be non-zero"));
        }
        if self.sweep.min_pulse_us >= self.sweep.max_pulse_us {
            return Err(Error::Config("sweep pulse extremes inverted"));
        }
        if self.sweep.neutral_pulse_us < self.sweep.min_pulse_us
            || self.sweep.neutral_pulse_us > self.sweep.max_pulse_us
        {
            return Err(Error::Config("neutral pulse outside sweep extremes"));
        }
        if self.sweep.burst_pulses == 0 {
            return Err(Error::Config("sweep burst pulse count must be non-zero"));
        }
        if self.sweep.duration_ms == 0 {
            return Err(Error::Config("sweep duration must be non-zero"));
        }
        if self.monitor.sample_interval_ms == 0 {
            return Err(Error::Config("monitor sample interval must be non-zero"));
        }
        Ok(())
    }
}
