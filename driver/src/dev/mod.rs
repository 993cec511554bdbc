//! Platform side: device numbers, the services a driver consumes, and driver matching.

pub mod chrdev;
pub mod driver;
pub mod platform;
pub mod sim;

pub use chrdev::{DevNum, DevRegion};
pub use platform::{ClassId, GpioLine, Platform, PlatformError};
