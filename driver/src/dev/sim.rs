//! In-memory platform for tests and host tools.
//!
//! [SimPlatform] implements every [crate::dev::platform] trait against plain data structures:
//! named GPIO lines with a level, a dynamic-major allocator, and cdev/class/node registries.
//! Each successful acquire or release is appended to a journal so callers can check ordering,
//! and [SimFault]s make chosen steps fail.

use alloc::{
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::sync::atomic::{AtomicI32, Ordering};
use spin::Mutex;

use crate::dev::{
    chrdev::{DevNum, DevRegion, MINORMASK},
    platform::{ChrdevOps, ClassId, ClassOps, GpioConsumer, GpioLine, PlatformError},
};

/// Highest dynamically assigned major; allocation walks down from here.
pub const DYNAMIC_MAJOR_MAX: u32 = 511;
/// Lowest dynamically assigned major.
pub const DYNAMIC_MAJOR_MIN: u32 = 384;

/// Steps that can be made to fail. Minors are relative to the start of the minor space, so
/// for regions allocated from minor 0 they equal the device index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimFault {
    Region,
    Class,
    CdevAdd { minor: u32 },
    DeviceCreate { minor: u32 },
    /// `gpiod_get` of this line fails with [PlatformError::Io].
    Line(String),
}

/// One successful platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RegionAlloc(DevRegion),
    RegionFree(DevRegion),
    ClassCreate(String),
    ClassDestroy(String),
    LineGet(String),
    LinePut(String),
    CdevAdd(DevNum),
    CdevDel(DevNum),
    NodeCreate(String),
    NodeDestroy(String),
}

struct LineSlot {
    level: Arc<AtomicI32>,
    held: bool,
}

struct SimState {
    lines: BTreeMap<String, LineSlot>,
    regions: Vec<DevRegion>,
    next_major: u32,
    cdevs: BTreeSet<DevNum>,
    classes: BTreeMap<ClassId, String>,
    next_class: u32,
    nodes: BTreeMap<String, (ClassId, DevNum)>,
    faults: Vec<SimFault>,
    journal: Vec<Event>,
}

pub struct SimPlatform {
    state: Mutex<SimState>,
}

/// A line handed out by [SimPlatform]. The level is shared with the platform, so the
/// platform side can observe and drive it.
#[derive(Debug)]
pub struct SimLine {
    name: String,
    level: Arc<AtomicI32>,
}

impl SimLine {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl GpioLine for SimLine {
    fn get_value(&self) -> i32 {
        self.level.load(Ordering::SeqCst)
    }

    fn set_value(&mut self, value: i32) {
        self.level.store((value != 0) as i32, Ordering::SeqCst);
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        SimPlatform::new()
    }
}

impl SimPlatform {
    pub fn new() -> SimPlatform {
        SimPlatform {
            state: Mutex::new(SimState {
                lines: BTreeMap::new(),
                regions: Vec::new(),
                next_major: DYNAMIC_MAJOR_MAX,
                cdevs: BTreeSet::new(),
                classes: BTreeMap::new(),
                next_class: 0,
                nodes: BTreeMap::new(),
                faults: Vec::new(),
                journal: Vec::new(),
            }),
        }
    }

    /// Builder form of [SimPlatform::add_line].
    pub fn with_line(self, name: impl Into<String>, level: i32) -> SimPlatform {
        self.add_line(name, level);
        self
    }

    pub fn add_line(&self, name: impl Into<String>, level: i32) {
        self.state.lock().lines.insert(
            name.into(),
            LineSlot {
                level: Arc::new(AtomicI32::new((level != 0) as i32)),
                held: false,
            },
        );
    }

    pub fn inject(&self, fault: SimFault) {
        self.state.lock().faults.push(fault);
    }

    pub fn clear_faults(&self) {
        self.state.lock().faults.clear();
    }

    pub fn journal(&self) -> Vec<Event> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    /// Names of lines currently handed out.
    pub fn held_lines(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .lines
            .iter()
            .filter(|(_, slot)| slot.held)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn line_level(&self, name: &str) -> Option<i32> {
        let state = self.state.lock();
        state.lines.get(name).map(|slot| slot.level.load(Ordering::SeqCst))
    }

    /// Drive a line from outside, as external hardware would.
    pub fn set_line_level(&self, name: &str, level: i32) -> bool {
        let state = self.state.lock();
        match state.lines.get(name) {
            Some(slot) => {
                slot.level.store((level != 0) as i32, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Resolve a published node by name. A leading `/dev/` is ignored.
    pub fn lookup_node(&self, name: &str) -> Option<DevNum> {
        let name = name.strip_prefix("/dev/").unwrap_or(name);
        let state = self.state.lock();
        let (_, dev) = state.nodes.get(name)?;
        state.cdevs.contains(dev).then_some(*dev)
    }

    pub fn node_names(&self) -> Vec<String> {
        self.state.lock().nodes.keys().cloned().collect()
    }

    pub fn class_names(&self) -> Vec<String> {
        self.state.lock().classes.values().cloned().collect()
    }

    /// Nothing is held, registered or published.
    pub fn is_clean(&self) -> bool {
        let state = self.state.lock();
        state.lines.values().all(|slot| !slot.held)
            && state.regions.is_empty()
            && state.cdevs.is_empty()
            && state.classes.is_empty()
            && state.nodes.is_empty()
    }
}

impl SimState {
    fn has_fault(&self, fault: &SimFault) -> bool {
        self.faults.contains(fault)
    }
}

impl ChrdevOps for SimPlatform {
    fn alloc_chrdev_region(
        &self,
        first_minor: u32,
        count: u32,
        _name: &str,
    ) -> Result<DevRegion, PlatformError> {
        let mut state = self.state.lock();
        if state.has_fault(&SimFault::Region) {
            return Err(PlatformError::Exhausted);
        }
        if first_minor > MINORMASK {
            return Err(PlatformError::Exhausted);
        }
        let major = state.next_major;
        if major < DYNAMIC_MAJOR_MIN {
            return Err(PlatformError::Exhausted);
        }
        let region = DevRegion::new(DevNum::new(major, first_minor), count)
            .ok_or(PlatformError::Exhausted)?;
        state.next_major -= 1;
        state.regions.push(region);
        state.journal.push(Event::RegionAlloc(region));
        Ok(region)
    }

    fn unregister_chrdev_region(&self, region: DevRegion) {
        let mut state = self.state.lock();
        state.regions.retain(|r| *r != region);
        state.journal.push(Event::RegionFree(region));
    }

    fn cdev_add(&self, dev: DevNum, count: u32) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        let region = DevRegion::new(dev, count).ok_or(PlatformError::Exhausted)?;
        let mut added = Vec::new();
        for dev in region.iter() {
            if state.has_fault(&SimFault::CdevAdd { minor: dev.minor() }) {
                return Err(PlatformError::NoMemory);
            }
            if state.cdevs.contains(&dev) {
                return Err(PlatformError::Busy);
            }
            added.push(dev);
        }
        for dev in added {
            state.cdevs.insert(dev);
            state.journal.push(Event::CdevAdd(dev));
        }
        Ok(())
    }

    fn cdev_del(&self, dev: DevNum) {
        let mut state = self.state.lock();
        state.cdevs.remove(&dev);
        state.journal.push(Event::CdevDel(dev));
    }
}

impl ClassOps for SimPlatform {
    fn class_create(&self, name: &str) -> Result<ClassId, PlatformError> {
        let mut state = self.state.lock();
        if state.has_fault(&SimFault::Class) {
            return Err(PlatformError::NoMemory);
        }
        if state.classes.values().any(|existing| existing == name) {
            return Err(PlatformError::AlreadyExists);
        }
        let id = ClassId(state.next_class);
        state.next_class += 1;
        state.classes.insert(id, name.to_string());
        state.journal.push(Event::ClassCreate(name.to_string()));
        Ok(id)
    }

    fn class_destroy(&self, class: ClassId) {
        let mut state = self.state.lock();
        if let Some(name) = state.classes.remove(&class) {
            state.journal.push(Event::ClassDestroy(name));
        }
    }

    fn device_create(&self, class: ClassId, dev: DevNum, name: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if state.has_fault(&SimFault::DeviceCreate { minor: dev.minor() }) {
            return Err(PlatformError::NoMemory);
        }
        if !state.classes.contains_key(&class) {
            return Err(PlatformError::NotFound);
        }
        if state.nodes.contains_key(name) {
            return Err(PlatformError::AlreadyExists);
        }
        state.nodes.insert(name.to_string(), (class, dev));
        state.journal.push(Event::NodeCreate(name.to_string()));
        Ok(())
    }

    fn device_destroy(&self, class: ClassId, dev: DevNum) {
        let mut state = self.state.lock();
        let name = state
            .nodes
            .iter()
            .find(|(_, entry)| **entry == (class, dev))
            .map(|(name, _)| name.clone());
        if let Some(name) = name {
            state.nodes.remove(&name);
            state.journal.push(Event::NodeDestroy(name));
        }
    }
}

impl GpioConsumer for SimPlatform {
    type Line = SimLine;

    fn gpiod_get(&self, con_id: &str) -> Result<SimLine, PlatformError> {
        let mut state = self.state.lock();
        if state.has_fault(&SimFault::Line(con_id.to_string())) {
            return Err(PlatformError::Io);
        }
        let slot = state.lines.get_mut(con_id).ok_or(PlatformError::NotFound)?;
        if slot.held {
            return Err(PlatformError::Busy);
        }
        slot.held = true;
        let line = SimLine {
            name: con_id.to_string(),
            level: slot.level.clone(),
        };
        state.journal.push(Event::LineGet(con_id.to_string()));
        Ok(line)
    }

    fn gpiod_put(&self, line: SimLine) {
        let mut state = self.state.lock();
        if let Some(slot) = state.lines.get_mut(&line.name) {
            slot.held = false;
        }
        state.journal.push(Event::LinePut(line.name));
    }
}
