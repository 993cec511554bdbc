//! Caller-owned memory.
//!
//! File operations never touch caller buffers directly; they go through [UserSlice], whose
//! copies may fail the way `copy_from_user`/`copy_to_user` do.

use rgpio_api::Payload;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bad address")]
pub struct Fault;

pub trait UserSlice {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `dst.len()` bytes from the start of the caller buffer.
    fn copy_in(&self, dst: &mut [u8]) -> Result<(), Fault>;

    /// Copy `src` to the start of the caller buffer.
    fn copy_out(&mut self, src: &[u8]) -> Result<(), Fault>;
}

impl UserSlice for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_in(&self, dst: &mut [u8]) -> Result<(), Fault> {
        let src = self.get(..dst.len()).ok_or(Fault)?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn copy_out(&mut self, src: &[u8]) -> Result<(), Fault> {
        self.get_mut(..src.len()).ok_or(Fault)?.copy_from_slice(src);
        Ok(())
    }
}

/// A caller buffer of `.0` bytes that is not mapped: every copy faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadAddress(pub usize);

impl UserSlice for BadAddress {
    fn len(&self) -> usize {
        self.0
    }

    fn copy_in(&self, _dst: &mut [u8]) -> Result<(), Fault> {
        Err(Fault)
    }

    fn copy_out(&mut self, _src: &[u8]) -> Result<(), Fault> {
        Err(Fault)
    }
}

pub fn get_user_i32<U: UserSlice + ?Sized>(src: &U) -> Result<i32, Fault> {
    let mut bytes = [0u8; Payload::LEN];
    src.copy_in(&mut bytes)?;
    Ok(Payload::from_bytes(bytes).0)
}

pub fn put_user_i32<U: UserSlice + ?Sized>(dst: &mut U, value: i32) -> Result<(), Fault> {
    dst.copy_out(&Payload(value).to_bytes())
}
