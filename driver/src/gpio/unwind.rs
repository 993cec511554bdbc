//! Scoped acquisition stack.
//!
//! Every resource setup acquires is pushed as an [Undo] record the moment the acquisition
//! succeeds. Popping the stack to empty releases everything in exact reverse order; setup
//! rollback and teardown are the same operation.

use alloc::vec::Vec;
use log::error;

use super::GpioDevices;
use crate::dev::{
    chrdev::{DevNum, DevRegion},
    platform::{ClassId, Platform},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Undo {
    Region(DevRegion),
    Class(ClassId),
    /// The line owned by the most recently pushed device state.
    Line,
    Cdev(DevNum),
    Node(ClassId, DevNum),
}

#[derive(Debug, Default)]
pub(crate) struct UndoStack {
    records: Vec<Undo>,
}

impl UndoStack {
    /// Records needed for `count` devices: region, class, then line, cdev and node per device.
    pub(crate) fn capacity_for(count: usize) -> Option<usize> {
        count.checked_mul(3)?.checked_add(2)
    }

    pub(crate) fn try_reserve(&mut self, records: usize) -> bool {
        self.records.try_reserve_exact(records).is_ok()
    }

    pub(crate) fn push(&mut self, undo: Undo) {
        self.records.push(undo);
    }

    pub(crate) fn pop(&mut self) -> Option<Undo> {
        self.records.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<P: Platform> GpioDevices<'_, P> {
    /// Release everything acquired so far, newest first.
    pub(super) fn unwind(&mut self) {
        if !self.undo.is_empty() {
            debug_ex!("Releasing {} resources.", self.undo.len());
        }
        while let Some(undo) = self.undo.pop() {
            self.release(undo);
        }
        self.region = None;
    }

    fn release(&mut self, undo: Undo) {
        match undo {
            Undo::Node(class, dev) => {
                debug_ex!("\tDestroying device node {}.", dev);
                self.platform.device_destroy(class, dev);
            }
            Undo::Cdev(dev) => {
                debug_ex!("\tDeleting cdev {}.", dev);
                self.platform.cdev_del(dev);
            }
            Undo::Line => match self.states.pop() {
                Some(state) => {
                    debug_ex!("\tReleasing GPIO '{}'.", state.line_name());
                    self.platform.gpiod_put(state.into_line());
                }
                None => error!("Unwind stack references a GPIO line that is not held."),
            },
            Undo::Class(class) => {
                debug_ex!("\tDestroying device class.");
                self.platform.class_destroy(class);
            }
            Undo::Region(region) => {
                debug_ex!("\tUnregistering device numbers {} (+{}).", region.base, region.count);
                self.platform.unregister_chrdev_region(region);
            }
        }
    }
}
