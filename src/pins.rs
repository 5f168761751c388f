//! GPIO line assignments for the Flamewatch node.
//!
//! Single source of truth — every sequence and the sensor monitor reference
//! this module rather than hard-coding line offsets. Change a line here and
//! it propagates everywhere.
//!
//! Offsets are BCM numbers on the Raspberry Pi 40-pin header.

/// GPIO character device exposing the header on Raspberry Pi OS.
pub const GPIO_CHIP: &str = "/dev/gpiochip0";

/// Consumer label attached to every character-device line request.
pub const CONSUMER: &str = "flamewatch";

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Active buzzer — digital output (BCM 19, physical pin 35).
pub const ALARM_LINE: u32 = 19;

/// Fan servo signal — software pulse-width output (BCM 17, physical pin 11).
pub const FAN_SERVO_LINE: u32 = 17;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// KY-026 flame sensor digital output — HIGH when a flame is detected.
pub const FLAME_SENSE_LINE: u32 = 6;
