//! Error types for setup and for per-call file operations.

use alloc::string::String;
use core::fmt;
use rgpio_api::Errno;
use thiserror::Error;

use crate::{dev::platform::PlatformError, uaccess::Fault};

/// Why setup failed. Every variant is reported only after all acquired resources were released.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error("failed to get GPIO #{index} '{name}': {source}")]
    Acquisition {
        index: usize,
        name: String,
        source: PlatformError,
    },
    #[error("failed to create device class: {0}")]
    Class(PlatformError),
    #[error("failed to publish device #{index} ({stage}): {source}")]
    Publish {
        stage: PublishStage,
        index: usize,
        source: PlatformError,
    },
    #[error("no device-tree node matches the driver")]
    NoMatchingNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("failed to allocate memory for {count} device structures")]
    Storage { count: usize },
    #[error("failed to allocate character device numbers: {0}")]
    DeviceNumbers(PlatformError),
}

/// The per-device publication step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Cdev,
    Node,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishStage::Cdev => f.write_str("cdev"),
            PublishStage::Node => f.write_str("device node"),
        }
    }
}

impl ProbeError {
    /// Error number a platform bus would see as the probe result.
    pub fn errno(&self) -> Errno {
        match self {
            ProbeError::Allocation(AllocationError::Storage { .. }) => Errno::ENOMEM,
            ProbeError::Allocation(AllocationError::DeviceNumbers(source))
            | ProbeError::Acquisition { source, .. }
            | ProbeError::Class(source)
            | ProbeError::Publish { source, .. } => source.errno(),
            ProbeError::NoMatchingNode => Errno::ENODEV,
        }
    }
}

/// Failure of a single open/read/write/ioctl call. Never affects other calls or devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FileError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("bad address")]
    Fault,
    #[error("no such device")]
    NoDevice,
}

impl FileError {
    pub fn errno(self) -> Errno {
        match self {
            FileError::InvalidArgument => Errno::EINVAL,
            FileError::Fault => Errno::EFAULT,
            FileError::NoDevice => Errno::ENXIO,
        }
    }
}

impl From<Fault> for FileError {
    fn from(_: Fault) -> Self {
        FileError::Fault
    }
}
