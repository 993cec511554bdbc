use alloc::string::String;
use spin::{Mutex, MutexGuard};

use crate::dev::{chrdev::DevNum, platform::GpioLine};

/// The line and its shadow register. Always accessed under [DeviceState::lock].
#[derive(Debug)]
pub struct LineState<L> {
    pub line: L,
    /// Software-only value exchanged with the host. Independent of the line level.
    pub shadow: i32,
}

/// One published device.
#[derive(Debug)]
pub struct DeviceState<L> {
    devnum: DevNum,
    line_name: String,
    node_name: String,
    inner: Mutex<LineState<L>>,
}

impl<L: GpioLine> DeviceState<L> {
    pub(crate) fn new(devnum: DevNum, line_name: String, node_name: String, line: L) -> Self {
        DeviceState {
            devnum,
            line_name,
            node_name,
            inner: Mutex::new(LineState { line, shadow: 0 }),
        }
    }

    pub fn devnum(&self) -> DevNum {
        self.devnum
    }

    /// Name the line was acquired by.
    pub fn line_name(&self) -> &str {
        &self.line_name
    }

    /// Name of the published node, `<prefix><index>`.
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn lock(&self) -> MutexGuard<'_, LineState<L>> {
        self.inner.lock()
    }

    pub fn shadow(&self) -> i32 {
        self.lock().shadow
    }

    /// Sample the live line.
    pub fn line_value(&self) -> i32 {
        self.lock().line.get_value()
    }

    pub(crate) fn into_line(self) -> L {
        self.inner.into_inner().line
    }
}
