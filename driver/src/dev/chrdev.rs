//! Character device numbers.
//!
//! A [DevNum] packs a (major, minor) pair into 32 bits, with the minor in the low
//! [MINORBITS] bits. A [DevRegion] is a contiguous run of minors under one major.

use core::fmt;

pub const MINORBITS: u32 = 20;
pub const MINORMASK: u32 = (1 << MINORBITS) - 1;
/// Largest major that fits next to a full minor field.
pub const MAJOR_MAX: u32 = u32::MAX >> MINORBITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DevNum(u32);

impl DevNum {
    pub const fn new(major: u32, minor: u32) -> DevNum {
        DevNum((major << MINORBITS) | (minor & MINORMASK))
    }
    pub const fn from_raw(raw: u32) -> DevNum {
        DevNum(raw)
    }
    pub const fn raw(self) -> u32 {
        self.0
    }
    pub const fn major(self) -> u32 {
        self.0 >> MINORBITS
    }
    pub const fn minor(self) -> u32 {
        self.0 & MINORMASK
    }
    /// The number `index` minors after `self`, if it stays inside the minor space.
    pub fn offset(self, index: u32) -> Option<DevNum> {
        let minor = self.minor().checked_add(index)?;
        (minor <= MINORMASK).then(|| DevNum::new(self.major(), minor))
    }
}

impl fmt::Display for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major(), self.minor())
    }
}

/// `count` consecutive device numbers starting at `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevRegion {
    pub base: DevNum,
    pub count: u32,
}

impl DevRegion {
    /// `None` if the region would run past the end of the minor space.
    pub fn new(base: DevNum, count: u32) -> Option<DevRegion> {
        if count > 0 {
            base.offset(count - 1)?;
        }
        Some(DevRegion { base, count })
    }
    pub fn get(&self, index: u32) -> Option<DevNum> {
        if index < self.count {
            self.base.offset(index)
        } else {
            None
        }
    }
    /// Position of `dev` inside the region.
    pub fn index_of(&self, dev: DevNum) -> Option<u32> {
        if dev.major() != self.base.major() || dev.minor() < self.base.minor() {
            return None;
        }
        let index = dev.minor() - self.base.minor();
        (index < self.count).then_some(index)
    }
    pub fn contains(&self, dev: DevNum) -> bool {
        self.index_of(dev).is_some()
    }
    pub fn iter(&self) -> impl Iterator<Item = DevNum> + use<> {
        let base = self.base;
        (0..self.count).filter_map(move |i| base.offset(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let dev = DevNum::new(511, 3);
        assert_eq!(dev.major(), 511);
        assert_eq!(dev.minor(), 3);
        assert_eq!(DevNum::from_raw(dev.raw()), dev);
        assert_eq!(alloc::format!("{}", dev), "511:3");
    }

    #[test]
    fn offsets_stay_in_minor_space() {
        assert_eq!(DevNum::new(5, 1).offset(2), Some(DevNum::new(5, 3)));
        assert_eq!(DevNum::new(5, MINORMASK).offset(1), None);
        assert!(DevRegion::new(DevNum::new(5, MINORMASK), 2).is_none());
        assert!(DevRegion::new(DevNum::new(5, MINORMASK), 1).is_some());
    }

    #[test]
    fn region_membership() {
        let region = DevRegion::new(DevNum::new(240, 4), 3).unwrap();
        assert_eq!(region.index_of(DevNum::new(240, 4)), Some(0));
        assert_eq!(region.index_of(DevNum::new(240, 6)), Some(2));
        assert_eq!(region.index_of(DevNum::new(240, 7)), None);
        assert_eq!(region.index_of(DevNum::new(240, 3)), None);
        assert_eq!(region.index_of(DevNum::new(241, 4)), None);
        assert_eq!(region.get(3), None);
        let all: alloc::vec::Vec<_> = region.iter().map(DevNum::minor).collect();
        assert_eq!(all, [4, 5, 6]);
    }
}
