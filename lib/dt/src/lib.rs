//! In-memory device tree used as the hardware description for drivers.
//!
//! Build a [DeviceTree] with [DeviceTree::add_node] and [DeviceTree::add_property], then query
//! it by path or by walking children. Property values keep the flattened encoding
//! (big-endian cells, NUL-terminated string lists) so accessors behave like the
//! `of_property_*` family: a missing property, an empty value and a malformed string list are
//! distinct [PropertyError]s.
#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod node;
pub mod prop;

pub use node::{DeviceTree, Node};
pub use prop::{Property, PropertyError};
