//! Flame sensing subsystem.
//!
//! [`flame::FlameMonitor`] samples the sensor line continuously on its
//! own thread and maintains a [`window::DetectionWindow`] of the most
//! recent readings; status queries scan the window under its guard.

pub mod flame;
pub mod window;
