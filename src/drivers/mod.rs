//! Actuator sequencers.
//!
//! Each sequencer is a blocking timed routine meant to run on its own
//! worker thread. Sequencers claim their GPIO line themselves (so an
//! acquisition failure follows the per-sequence failure path) and are
//! dumb about exclusivity: the activation gate is won before a worker
//! is spawned and released by the worker when the sequence returns.

pub mod alarm;
pub mod servo;
