use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Error numbers reported across the device boundary.
///
/// A failing call returns the negated value, as the Linux syscall ABI does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum Errno {
    ENOENT = 2,   // No such file or directory
    EIO = 5,      // I/O error
    ENXIO = 6,    // No such device or address
    ENOMEM = 12,  // Out of memory
    EFAULT = 14,  // Bad address
    EBUSY = 16,   // Device or resource busy
    EEXIST = 17,  // File exists
    ENODEV = 19,  // No such device
    EINVAL = 22,  // Invalid argument
    ENODATA = 61, // No data available
    EILSEQ = 84,  // Illegal byte sequence
}

impl Errno {
    /// Syscall-style return value.
    pub fn as_return(self) -> i32 {
        -i32::from(self)
    }

    /// Recover the errno from a negative syscall-style return value.
    pub fn from_return(ret: i32) -> Option<Errno> {
        if ret >= 0 {
            return None;
        }
        Errno::try_from(ret.checked_neg()?).ok()
    }
}
