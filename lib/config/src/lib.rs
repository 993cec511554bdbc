//! Build-time configuration for the GPIO driver.
//! Values come from `rgpio.json` at the workspace root and are baked in as constants by `build.rs`.

#![no_std]
#![deny(missing_docs)]

/// Flags generated from `rgpio.json`.
pub mod build_flags {
    include!(concat!(env!("OUT_DIR"), "/build_flags.rs"));
}

pub use build_flags::*;
