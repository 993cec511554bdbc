//! Services a driver consumes from the hosting platform.
//!
//! Acquire-style calls return a `Result`; release-style calls cannot fail. Every successful
//! acquire must be paired with exactly one release, which [crate::gpio] guarantees by
//! recording each acquisition on its unwind stack.

use rgpio_api::Errno;
use thiserror::Error;

use crate::dev::chrdev::{DevNum, DevRegion};

/// Handle of a device class created through [ClassOps::class_create].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

/// Character-device number space and cdev registration.
pub trait ChrdevOps {
    /// Reserve `count` consecutive minors under a free major, starting at `first_minor`.
    fn alloc_chrdev_region(
        &self,
        first_minor: u32,
        count: u32,
        name: &str,
    ) -> Result<DevRegion, PlatformError>;
    fn unregister_chrdev_region(&self, region: DevRegion);
    /// Make `count` numbers starting at `dev` reachable by open.
    fn cdev_add(&self, dev: DevNum, count: u32) -> Result<(), PlatformError>;
    fn cdev_del(&self, dev: DevNum);
}

/// Device classes and the named nodes published under them.
pub trait ClassOps {
    fn class_create(&self, name: &str) -> Result<ClassId, PlatformError>;
    fn class_destroy(&self, class: ClassId);
    fn device_create(&self, class: ClassId, dev: DevNum, name: &str) -> Result<(), PlatformError>;
    fn device_destroy(&self, class: ClassId, dev: DevNum);
}

/// One exclusively owned GPIO line.
pub trait GpioLine: Send {
    /// Logical value of the line, 0 or 1.
    fn get_value(&self) -> i32;
    /// Drive the line; any non-zero value is logical high.
    fn set_value(&mut self, value: i32);
}

/// GPIO lines of the device being probed, looked up by connection name.
pub trait GpioConsumer {
    type Line: GpioLine;

    fn gpiod_get(&self, con_id: &str) -> Result<Self::Line, PlatformError>;
    fn gpiod_put(&self, line: Self::Line);
}

/// Everything the GPIO driver needs from its host.
pub trait Platform: ChrdevOps + ClassOps + GpioConsumer {}

impl<T: ChrdevOps + ClassOps + GpioConsumer> Platform for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("out of memory")]
    NoMemory,
    #[error("no free device numbers")]
    Exhausted,
    #[error("resource busy")]
    Busy,
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("I/O error")]
    Io,
}

impl PlatformError {
    pub fn errno(self) -> Errno {
        match self {
            PlatformError::NoMemory => Errno::ENOMEM,
            PlatformError::Exhausted | PlatformError::Busy => Errno::EBUSY,
            PlatformError::NotFound => Errno::ENOENT,
            PlatformError::AlreadyExists => Errno::EEXIST,
            PlatformError::Io => Errno::EIO,
        }
    }
}
