//! Control-operation numbers.
//!
//! Numbers follow the Linux `_IOC` layout:
//!
//! ```text
//!  31 30 29          16 15      8 7       0
//! +-----+--------------+---------+---------+
//! | dir |     size     |  type   |   nr    |
//! +-----+--------------+---------+---------+
//! ```
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

bitflags! {
    /// Transfer direction bits, seen from the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IocDir: u32 {
        /// Host writes, device reads.
        const WRITE = 0b01;
        /// Device writes, host reads.
        const READ  = 0b10;
    }
}

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = 8;
const IOC_SIZESHIFT: u32 = 16;
const IOC_DIRSHIFT: u32 = 30;
const IOC_SIZEMASK: u32 = (1 << 14) - 1;

/// Magic type byte shared by every GPIO command.
pub const IOC_MAGIC: u8 = b'm';

pub const fn ioc(dir: IocDir, ty: u8, nr: u8, size: usize) -> u32 {
    (dir.bits() << IOC_DIRSHIFT)
        | (((size as u32) & IOC_SIZEMASK) << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

pub const fn iow(ty: u8, nr: u8, size: usize) -> u32 {
    ioc(IocDir::WRITE, ty, nr, size)
}

pub const fn ior(ty: u8, nr: u8, size: usize) -> u32 {
    ioc(IocDir::READ, ty, nr, size)
}

/// Decode the direction bits of a raw command number.
pub fn ioc_dir(cmd: u32) -> IocDir {
    IocDir::from_bits_truncate(cmd >> IOC_DIRSHIFT)
}

/// Decode the payload size of a raw command number.
pub fn ioc_size(cmd: u32) -> usize {
    ((cmd >> IOC_SIZESHIFT) & IOC_SIZEMASK) as usize
}

/// The four control operations.
///
/// `SetLine` carries `_IOR` direction bits even though the host supplies the value; deployed
/// callers were built against that number, so it is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum Command {
    /// `_IOW('m', 1, int)`: overwrite the shadow register.
    SetShadow = 0x4004_6d01,
    /// `_IOR('m', 2, int)`: return the shadow register.
    GetShadow = 0x8004_6d02,
    /// `_IOR('m', 3, int)`: drive the line to the payload value.
    SetLine = 0x8004_6d03,
    /// `_IOR('m', 4, int)`: return the live line value.
    GetLine = 0x8004_6d04,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::SetShadow,
        Command::GetShadow,
        Command::SetLine,
        Command::GetLine,
    ];

    /// Whether the device copies the payload in from the caller.
    pub fn takes_input(self) -> bool {
        matches!(self, Command::SetShadow | Command::SetLine)
    }
}

/// The 32-bit payload every command carries, in native byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Payload(pub i32);

impl Payload {
    pub const LEN: usize = size_of::<i32>();

    pub fn to_bytes(self) -> [u8; Self::LEN] {
        self.0.to_ne_bytes()
    }

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Payload {
        Payload(i32::from_ne_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_numbers_match_ioc_encoding() {
        assert_eq!(u32::from(Command::SetShadow), iow(IOC_MAGIC, 1, Payload::LEN));
        assert_eq!(u32::from(Command::GetShadow), ior(IOC_MAGIC, 2, Payload::LEN));
        assert_eq!(u32::from(Command::SetLine), ior(IOC_MAGIC, 3, Payload::LEN));
        assert_eq!(u32::from(Command::GetLine), ior(IOC_MAGIC, 4, Payload::LEN));
    }

    #[test]
    fn decode_rejects_unknown_numbers() {
        for cmd in Command::ALL {
            assert_eq!(Command::try_from(u32::from(cmd)), Ok(cmd));
            assert_eq!(ioc_size(cmd.into()), Payload::LEN);
        }
        assert!(Command::try_from(iow(IOC_MAGIC, 5, Payload::LEN)).is_err());
        assert!(Command::try_from(0u32).is_err());
    }

    #[test]
    fn direction_bits() {
        assert_eq!(ioc_dir(Command::SetShadow.into()), IocDir::WRITE);
        assert_eq!(ioc_dir(Command::SetLine.into()), IocDir::READ);
        assert!(Command::SetLine.takes_input());
        assert!(!Command::GetLine.takes_input());
    }

    #[test]
    fn payload_is_native_endian() {
        let payload = Payload(42);
        assert_eq!(Payload::from_bytes(payload.to_bytes()), payload);
        assert_eq!(payload.to_bytes(), 42i32.to_ne_bytes());
    }
}
