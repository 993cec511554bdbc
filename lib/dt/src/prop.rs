use alloc::{boxed::Box, vec::Vec};
use core::str;
use thiserror::Error;

/// A named property with its raw, flattened value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: Box<str>,
    pub data: Box<[u8]>,
}

impl Property {
    pub fn new(name: impl AsRef<str>, data: impl Into<Box<[u8]>>) -> Property {
        Property {
            name: Box::from(name.as_ref()),
            data: data.into(),
        }
    }

    /// A property that is present but carries no value.
    pub fn empty(name: impl AsRef<str>) -> Property {
        Property::new(name, Vec::new())
    }

    /// Encode a single string, NUL-terminated.
    pub fn with_str(name: impl AsRef<str>, value: &str) -> Property {
        Property::with_strs(name, &[value])
    }

    /// Encode a string list, each entry NUL-terminated.
    pub fn with_strs(name: impl AsRef<str>, values: &[&str]) -> Property {
        let mut data = Vec::with_capacity(values.iter().map(|s| s.len() + 1).sum());
        for value in values {
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        Property::new(name, data)
    }

    /// Encode one big-endian cell.
    pub fn with_u32(name: impl AsRef<str>, value: u32) -> Property {
        Property::new(name, value.to_be_bytes().to_vec())
    }
}

impl Property {
    pub fn value_as_u32(&self) -> Result<u32, PropertyError> {
        let cell: [u8; 4] = self
            .data
            .get(..4)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(PropertyError::InvalidFormat)?;
        Ok(u32::from_be_bytes(cell))
    }

    /// First string of the value.
    pub fn value_as_str(&self) -> Result<&str, PropertyError> {
        self.read_string_index(0)
    }

    /// Decode the whole string list.
    ///
    /// Fails with [PropertyError::NoData] on an empty value and with
    /// [PropertyError::NotTerminated] if the last entry runs off the end of the value.
    pub fn value_as_strlist(&self) -> Result<Vec<&str>, PropertyError> {
        if self.data.is_empty() {
            return Err(PropertyError::NoData);
        }
        let mut res = Vec::new();
        for (index, chunk) in self.data.split_inclusive(|b| *b == 0).enumerate() {
            let body = match chunk.split_last() {
                Some((&0, body)) => body,
                _ => return Err(PropertyError::NotTerminated { valid: res.len() }),
            };
            let s = str::from_utf8(body).map_err(|_| PropertyError::InvalidUtf8 { index })?;
            res.push(s);
        }
        Ok(res)
    }

    /// Decode the leading well-formed entries of the string list, stopping at the first
    /// entry that is unterminated or not UTF-8.
    pub fn terminated_strings(&self) -> Vec<&str> {
        self.data
            .split_inclusive(|b| *b == 0)
            .map_while(|chunk| match chunk.split_last() {
                Some((&0, body)) => str::from_utf8(body).ok(),
                _ => None,
            })
            .collect()
    }

    pub fn count_strings(&self) -> Result<usize, PropertyError> {
        self.value_as_strlist().map(|list| list.len())
    }

    pub fn read_string_index(&self, index: usize) -> Result<&str, PropertyError> {
        self.value_as_strlist()?
            .get(index)
            .copied()
            .ok_or(PropertyError::OutOfRange { index })
    }
}

/// Errors from property lookups and value decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("property does not exist")]
    NotFound,
    #[error("property does not have a value")]
    NoData,
    /// `valid` entries precede the unterminated one.
    #[error("string is not NUL-terminated within the property data ({valid} valid entries)")]
    NotTerminated { valid: usize },
    #[error("string #{index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },
    #[error("string index {index} is out of range")]
    OutOfRange { index: usize },
    #[error("property value has an invalid format")]
    InvalidFormat,
}
