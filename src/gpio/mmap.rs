//! Register-access GPIO backend (rppal over `/dev/gpiomem`).
//!
//! Alternative to the character-device backend for boards where the
//! memory-mapped peripheral window is preferred. The GPIO subsystem is
//! initialised per claim, mirroring the per-sequence setup of the
//! character-device path, so an init failure lands on the same
//! per-sequence failure path.

use rppal::gpio::Gpio;

use crate::error::GpioError;
use crate::gpio::{InputLine, Level, LineProvider, OutputLine};

/// Provider backed by direct register access.
#[derive(Default)]
pub struct MmapGpio;

impl MmapGpio {
    pub fn new() -> Self {
        Self
    }

    fn subsystem() -> Result<Gpio, GpioError> {
        Gpio::new().map_err(|e| GpioError::SubsystemInit {
            detail: e.to_string(),
        })
    }
}

impl LineProvider for MmapGpio {
    type Output = MmapOutput;
    type Input = MmapInput;

    fn claim_output(&self, offset: u32, initial: Level) -> Result<MmapOutput, GpioError> {
        let pin = Self::subsystem()?
            .get(offset as u8)
            .map_err(|e| GpioError::LineRequest {
                offset,
                detail: e.to_string(),
            })?;
        let mut pin = match initial {
            Level::High => pin.into_output_high(),
            Level::Low => pin.into_output_low(),
        };
        // The final level a sequence leaves on the line must persist
        // after the pin is dropped.
        pin.set_reset_on_drop(false);
        Ok(MmapOutput { pin })
    }

    fn claim_input(&self, offset: u32) -> Result<MmapInput, GpioError> {
        let pin = Self::subsystem()?
            .get(offset as u8)
            .map_err(|e| GpioError::LineRequest {
                offset,
                detail: e.to_string(),
            })?;
        Ok(MmapInput {
            pin: pin.into_input(),
        })
    }
}

pub struct MmapOutput {
    pin: rppal::gpio::OutputPin,
}

impl OutputLine for MmapOutput {
    fn set(&mut self, level: Level) {
        match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        }
    }
}

pub struct MmapInput {
    pin: rppal::gpio::InputPin,
}

impl InputLine for MmapInput {
    fn level(&mut self) -> Level {
        Level::from_bool(self.pin.is_high())
    }
}
