//! Per-session file operations.
//!
//! Stream protocol: `read` yields the live line level as decimal text followed by a newline,
//! once per session; `write` takes a decimal integer, stores it in the shadow register and,
//! if it is 0 or 1, drives the line. Control protocol: see [Command].

use core::{fmt, str};
use config::IO_BUFFER_LEN;
use log::info;
use rgpio_api::Command;

use super::state::DeviceState;
use crate::{
    dev::platform::GpioLine,
    error::FileError,
    uaccess::{UserSlice, get_user_i32, put_user_i32},
};

/// An open session on one device.
#[derive(Debug)]
pub struct File<'a, L> {
    dev: &'a DeviceState<L>,
    pos: u64,
}

/// Fixed text buffer; output past its end is dropped.
struct Scratch {
    buf: [u8; IO_BUFFER_LEN],
    len: usize,
}

impl Scratch {
    fn new() -> Scratch {
        Scratch {
            buf: [0; IO_BUFFER_LEN],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl fmt::Write for Scratch {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.len;
        let take = s.len().min(room);
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// Decode a decimal `i32` the way `kstrtoint(s, 10, ..)` does: optional sign, digits, and at
/// most one trailing newline.
fn parse_value(bytes: &[u8]) -> Option<i32> {
    let digits = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    str::from_utf8(digits).ok()?.parse().ok()
}

impl<'a, L: GpioLine> File<'a, L> {
    pub(crate) fn open(dev: &'a DeviceState<L>) -> File<'a, L> {
        File { dev, pos: 0 }
    }

    pub fn device(&self) -> &'a DeviceState<L> {
        self.dev
    }

    /// Stream position. Non-zero once the value was read.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn release(self) {}

    /// Copy `"<level>\n"` to `buf` on the first call, then report end of stream.
    pub fn read<U: UserSlice + ?Sized>(&mut self, buf: &mut U) -> Result<usize, FileError> {
        if self.pos > 0 {
            return Ok(0);
        }
        if buf.len() < IO_BUFFER_LEN {
            return Err(FileError::InvalidArgument);
        }
        let value = self.dev.line_value();
        let mut text = Scratch::new();
        fmt::Write::write_fmt(&mut text, format_args!("{}\n", value))
            .map_err(|_| FileError::InvalidArgument)?;
        buf.copy_out(text.as_bytes()).inspect_err(|_| {
            info!("Unable to read value");
        })?;
        self.pos += text.len as u64;
        info!("Value read!");
        Ok(text.len)
    }

    /// Parse a decimal value from `buf`, store it as the shadow and drive the line with it.
    ///
    /// The shadow is stored even when the value is then rejected for not being 0 or 1.
    pub fn write<U: UserSlice + ?Sized>(&mut self, buf: &U) -> Result<usize, FileError> {
        let len = buf.len();
        if len == 0 || len >= IO_BUFFER_LEN {
            return Err(FileError::InvalidArgument);
        }
        let mut bytes = [0u8; IO_BUFFER_LEN];
        buf.copy_in(&mut bytes[..len]).inspect_err(|_| {
            info!("Unable to write value");
        })?;
        let text = bytes[..len].strip_suffix(b"\n").unwrap_or(&bytes[..len]);
        let Some(value) = parse_value(text) else {
            info!("Error converting to integer");
            return Err(FileError::InvalidArgument);
        };

        let mut state = self.dev.lock();
        state.shadow = value;
        if value != 0 && value != 1 {
            info!("Invalid GPIO value. Must be 0 or 1");
            return Err(FileError::InvalidArgument);
        }
        state.line.set_value(value);
        info!("Value written: {}", value);
        Ok(len)
    }

    /// Decode `cmd` and run it against the 4-byte payload at `arg`.
    pub fn ioctl<U: UserSlice + ?Sized>(&mut self, cmd: u32, arg: &mut U) -> Result<(), FileError> {
        let cmd = Command::try_from(cmd).map_err(|_| FileError::InvalidArgument)?;
        self.control(cmd, arg)
    }

    pub fn control<U: UserSlice + ?Sized>(&mut self, cmd: Command, arg: &mut U) -> Result<(), FileError> {
        match cmd {
            Command::SetShadow => {
                let value = get_user_i32(arg)?;
                self.dev.lock().shadow = value;
                info!("Store Value: {}", value);
            }
            Command::GetShadow => {
                let value = self.dev.shadow();
                put_user_i32(arg, value)?;
                info!("User accessed value: {}", value);
            }
            Command::SetLine => {
                let value = get_user_i32(arg)?;
                let mut state = self.dev.lock();
                state.line.set_value(value);
                info!("GPIO Value set: {}, Actual Value: {}", value, state.line.get_value());
            }
            Command::GetLine => {
                let value = self.dev.line_value();
                put_user_i32(arg, value)?;
                info!("User accessed gpio value: {}", value);
            }
        }
        Ok(())
    }
}
