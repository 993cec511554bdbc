//! GPIO lines published as character devices.
//!
//! [GpioDriver] reads the line names from a device-tree node, acquires every line from the
//! [dev::platform::Platform] and publishes one device node per line. The result is a
//! [GpioDevices] table; [GpioDevices::open] hands out [gpio::fops::File] sessions that speak
//! the stream protocol (`read`/`write`) and the control protocol (`ioctl`).
//!
//! Setup is all-or-nothing: any failure releases everything acquired so far, in reverse order,
//! before the error is returned. Dropping or [removing](GpioDevices::remove) the table releases
//! everything the same way.
#![cfg_attr(not(test), no_std)]
extern crate alloc;

#[macro_use]
pub mod console;
#[macro_use]
pub mod logging;
pub mod dev;
pub mod error;
pub mod gpio;
pub mod uaccess;

pub use error::{FileError, ProbeError};
pub use gpio::{DriverConfig, GpioDevices, GpioDriver, fops::File};
