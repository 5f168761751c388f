//! Unified error types for the Flamewatch runtime.
//!
//! Hardware-layer failures are caught at the boundary of each background
//! sequence: a sequence that cannot claim its line logs the error and
//! returns, and nothing propagates past the owning worker. Logical
//! rejections (a device already active, a stop for an idle device) are
//! ordinary values, not errors; see
//! [`ControlOutcome`](crate::service::ControlOutcome).

use std::fmt;

// ---------------------------------------------------------------------------
// Top-level runtime error
// ---------------------------------------------------------------------------

/// Every fallible operation in the runtime funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// A GPIO chip or line could not be opened or configured.
    Gpio(GpioError),
    /// A configuration field failed range validation.
    /// The `&'static str` describes which field and why.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

/// Failures while acquiring a GPIO line from a backend.
///
/// Reads and writes on an already-claimed line are infallible at the port
/// level; the backends log kernel-level hiccups and carry on.
#[derive(Debug)]
pub enum GpioError {
    /// The GPIO character device could not be opened.
    ChipOpen { chip: String, detail: String },
    /// The kernel rejected the line request (direction / initial value).
    LineRequest { offset: u32, detail: String },
    /// The register-backed GPIO subsystem could not be initialised.
    SubsystemInit { detail: String },
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChipOpen { chip, detail } => {
                write!(f, "failed to open GPIO chip {chip}: {detail}")
            }
            Self::LineRequest { offset, detail } => {
                write!(f, "failed to request line {offset}: {detail}")
            }
            Self::SubsystemInit { detail } => {
                write!(f, "GPIO subsystem init failed: {detail}")
            }
        }
    }
}

impl std::error::Error for GpioError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Runtime-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
