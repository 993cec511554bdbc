//! The GPIO character-device driver.
//!
//! [GpioDriver::probe] turns the line names of one device-tree node into published devices:
//!
//! 1. reserve storage for one [DeviceState] per line;
//! 2. reserve a contiguous block of device numbers;
//! 3. create the shared device class;
//! 4. for every line, in order: acquire it, add its cdev, create its node `<prefix><index>`.
//!
//! Each successful step is recorded on the unwind stack (see [unwind]). If any step fails
//! the stack is popped to empty before the error is returned, so a failed probe holds
//! nothing. The returned [GpioDevices] is the only owner of what was acquired; it is
//! released by [GpioDevices::remove] or on drop, in exact reverse order of acquisition.

pub mod fops;
pub mod info;
pub mod state;
mod unwind;

use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use dt::{DeviceTree, Node};
use log::{error, info, warn};

use crate::{
    dev::{
        chrdev::{DevNum, DevRegion},
        driver::{Driver, of_match_node},
        platform::{ClassId, Platform},
    },
    error::{AllocationError, FileError, ProbeError, PublishStage},
};
use fops::File;
use info::GpioInfo;
use state::DeviceState;
use unwind::{Undo, UndoStack};

/// Names and matching rules. Defaults come from `rgpio.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Node names are this prefix followed by the device index.
    pub device_prefix: String,
    pub class_name: String,
    /// String-list property holding the line names.
    pub names_property: String,
    pub compatible: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            device_prefix: config::DEVICE_NAME.to_string(),
            class_name: config::DEVICE_CLASS.to_string(),
            names_property: config::GPIO_NAMES_PROPERTY.to_string(),
            compatible: vec![config::COMPATIBLE.to_string()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GpioDriver {
    config: DriverConfig,
}

impl Driver for GpioDriver {
    fn get_name(&self) -> &str {
        &self.config.device_prefix
    }

    fn get_comp_strs(&self) -> &[String] {
        &self.config.compatible
    }
}

impl GpioDriver {
    pub fn new(config: DriverConfig) -> GpioDriver {
        GpioDriver { config }
    }

    /// Probe the first available node in `tree` that matches this driver.
    pub fn probe_tree<'p, P: Platform>(
        &self,
        platform: &'p P,
        tree: &DeviceTree,
    ) -> Result<GpioDevices<'p, P>, ProbeError> {
        let node = of_match_node(tree, self).ok_or_else(|| {
            warn!("No device-tree node is compatible with {:?}.", self.config.compatible);
            ProbeError::NoMatchingNode
        })?;
        debug_ex!("Probing {}.", tree.get_full_path(node));
        self.probe(platform, tree, node)
    }

    /// Publish one device per line named in `node`.
    pub fn probe<'p, P: Platform>(
        &self,
        platform: &'p P,
        tree: &DeviceTree,
        node: &Node,
    ) -> Result<GpioDevices<'p, P>, ProbeError> {
        let info = GpioInfo::from_node(tree, node, &self.config.names_property);
        if let Some(errno) = info.errno() {
            debug_ex!("Line discovery reported {:?}, continuing with {} lines.", errno, info.count());
        }
        self.probe_lines(platform, &info.names)
    }

    /// Publish one device per entry of `names`, or nothing at all.
    pub fn probe_lines<'p, P: Platform, S: AsRef<str>>(
        &self,
        platform: &'p P,
        names: &[S],
    ) -> Result<GpioDevices<'p, P>, ProbeError> {
        let mut devices = GpioDevices::alloc(platform, names.len())?;
        match devices.publish(&self.config, names) {
            Ok(()) => Ok(devices),
            Err(err) => {
                warn!("Probe failed, rolling back: {}", err);
                devices.unwind();
                Err(err)
            }
        }
    }
}

/// The published devices of one successful probe.
///
/// Sessions from [GpioDevices::open] borrow the table, so it cannot be removed while any
/// session is open.
pub struct GpioDevices<'p, P: Platform> {
    platform: &'p P,
    region: Option<DevRegion>,
    states: Vec<DeviceState<P::Line>>,
    undo: UndoStack,
}

impl<P: Platform> core::fmt::Debug for GpioDevices<'_, P>
where
    P::Line: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GpioDevices")
            .field("region", &self.region)
            .field("states", &self.states)
            .field("undo", &self.undo)
            .finish_non_exhaustive()
    }
}

impl<'p, P: Platform> GpioDevices<'p, P> {
    fn alloc(platform: &'p P, count: usize) -> Result<Self, AllocationError> {
        let mut states = Vec::new();
        let mut undo = UndoStack::default();
        let reserved = states.try_reserve_exact(count).is_ok()
            && UndoStack::capacity_for(count).is_some_and(|records| undo.try_reserve(records));
        if !reserved {
            error!("Failed to allocate memory for {} device structures", count);
            return Err(AllocationError::Storage { count });
        }
        Ok(GpioDevices {
            platform,
            region: None,
            states,
            undo,
        })
    }

    fn publish<S: AsRef<str>>(&mut self, config: &DriverConfig, names: &[S]) -> Result<(), ProbeError> {
        let count = u32::try_from(names.len())
            .map_err(|_| AllocationError::DeviceNumbers(crate::dev::PlatformError::Exhausted))?;

        let region = self
            .platform
            .alloc_chrdev_region(0, count, &config.device_prefix)
            .map_err(|err| {
                error!("Failed to allocate character device numbers");
                AllocationError::DeviceNumbers(err)
            })?;
        self.undo.push(Undo::Region(region));
        self.region = Some(region);

        let class = self.platform.class_create(&config.class_name).map_err(|err| {
            error!("Failed to create class '{}'!", config.class_name);
            ProbeError::Class(err)
        })?;
        self.undo.push(Undo::Class(class));

        for (index, (name, devnum)) in names.iter().zip(region.iter()).enumerate() {
            self.publish_one(config, class, index, name.as_ref(), devnum)?;
        }
        Ok(())
    }

    fn publish_one(
        &mut self,
        config: &DriverConfig,
        class: ClassId,
        index: usize,
        name: &str,
        devnum: DevNum,
    ) -> Result<(), ProbeError> {
        let line = self.platform.gpiod_get(name).map_err(|source| {
            error!("Failed to get GPIO: {}", name);
            ProbeError::Acquisition {
                index,
                name: name.to_string(),
                source,
            }
        })?;
        let node_name = format!("{}{}", config.device_prefix, index);
        self.states
            .push(DeviceState::new(devnum, name.to_string(), node_name.clone(), line));
        self.undo.push(Undo::Line);

        self.platform.cdev_add(devnum, 1).map_err(|source| {
            error!("Failed to add device! {}", index);
            ProbeError::Publish {
                stage: PublishStage::Cdev,
                index,
                source,
            }
        })?;
        self.undo.push(Undo::Cdev(devnum));

        self.platform
            .device_create(class, devnum, &node_name)
            .map_err(|source| {
                error!("Failed to create device node! {}", index);
                ProbeError::Publish {
                    stage: PublishStage::Node,
                    index,
                    source,
                }
            })?;
        self.undo.push(Undo::Node(class, devnum));

        info!("GPIO driver registered ({}:{})", devnum.major(), devnum.minor());
        Ok(())
    }

    /// Tear everything down: per device (last first) node, cdev and line, then the class,
    /// the device numbers and the storage.
    pub fn remove(mut self) {
        self.unwind();
        info!("GPIO driver unregistered");
    }

    /// Open a session on the device with number `dev`.
    pub fn open(&self, dev: DevNum) -> Result<File<'_, P::Line>, FileError> {
        let index = self
            .region
            .and_then(|region| region.index_of(dev))
            .ok_or(FileError::NoDevice)?;
        let state = self.states.get(index as usize).ok_or(FileError::NoDevice)?;
        Ok(File::open(state))
    }

    /// Open a session on the device at `index` in probe order.
    pub fn open_index(&self, index: usize) -> Result<File<'_, P::Line>, FileError> {
        let state = self.states.get(index).ok_or(FileError::NoDevice)?;
        Ok(File::open(state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn region(&self) -> Option<DevRegion> {
        self.region
    }

    pub fn device(&self, index: usize) -> Option<&DeviceState<P::Line>> {
        self.states.get(index)
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceState<P::Line>> {
        self.states.iter()
    }
}

impl<P: Platform> Drop for GpioDevices<'_, P> {
    fn drop(&mut self) {
        self.unwind();
    }
}
