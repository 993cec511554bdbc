//! Wire contract between host programs and the GPIO character devices.
//!
//! Both halves of the control protocol must agree bit-for-bit on the command numbers, the
//! payload layout and the error numbers, so they live here and nowhere else.
#![cfg_attr(not(test), no_std)]

pub mod errno;
pub mod ioctl;

pub use errno::Errno;
pub use ioctl::{Command, Payload};
