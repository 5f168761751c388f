//! Character-device GPIO backend (`/dev/gpiochipN` line I/O).
//!
//! Each claim opens the chip fresh and requests the line with the node's
//! consumer label; dropping the returned handle releases the line back
//! to the kernel. A sequence therefore holds its line only while it is
//! actually driving it.

use std::path::PathBuf;

use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use log::{debug, warn};

use crate::error::GpioError;
use crate::gpio::{InputLine, Level, LineProvider, OutputLine};

/// Provider backed by a GPIO character device.
pub struct CdevGpio {
    chip_path: PathBuf,
    consumer: &'static str,
}

impl CdevGpio {
    pub fn new(chip_path: impl Into<PathBuf>, consumer: &'static str) -> Self {
        Self {
            chip_path: chip_path.into(),
            consumer,
        }
    }

    fn claim(&self, offset: u32, flags: LineRequestFlags, initial: u8) -> Result<LineHandle, GpioError> {
        let mut chip = Chip::new(&self.chip_path).map_err(|e| GpioError::ChipOpen {
            chip: self.chip_path.display().to_string(),
            detail: e.to_string(),
        })?;
        chip.get_line(offset)
            .and_then(|line| line.request(flags, initial, self.consumer))
            .map_err(|e| GpioError::LineRequest {
                offset,
                detail: e.to_string(),
            })
    }
}

impl LineProvider for CdevGpio {
    type Output = CdevOutput;
    type Input = CdevInput;

    fn claim_output(&self, offset: u32, initial: Level) -> Result<CdevOutput, GpioError> {
        let handle = self.claim(offset, LineRequestFlags::OUTPUT, initial.as_u8())?;
        Ok(CdevOutput { offset, handle })
    }

    fn claim_input(&self, offset: u32) -> Result<CdevInput, GpioError> {
        let handle = self.claim(offset, LineRequestFlags::INPUT, 0)?;
        Ok(CdevInput { offset, handle })
    }
}

pub struct CdevOutput {
    offset: u32,
    handle: LineHandle,
}

impl OutputLine for CdevOutput {
    fn set(&mut self, level: Level) {
        if let Err(e) = self.handle.set_value(level.as_u8()) {
            debug!("cdev: set_value failed on line {}: {}", self.offset, e);
        }
    }
}

pub struct CdevInput {
    offset: u32,
    handle: LineHandle,
}

impl InputLine for CdevInput {
    fn level(&mut self) -> Level {
        match self.handle.get_value() {
            Ok(v) => Level::from_bool(v != 0),
            Err(e) => {
                // A failed read must not invent a detection.
                warn!("cdev: get_value failed on line {}: {}", self.offset, e);
                Level::Low
            }
        }
    }
}
