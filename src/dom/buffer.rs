//! Byte arena backing a document
//!
//! Copy mode takes an owned copy of the caller's bytes; in-place mode borrows
//! the caller's writable buffer for the document's lifetime. Either way the
//! parser mutates the bytes to splice in terminators.

use std::ops::{Deref, DerefMut};

use crate::core::error::{Allocation, ParseError};

/// The writable buffer every span points into
#[derive(Debug)]
pub enum Buffer<'a> {
    /// Owned copy of the input
    Owned(Vec<u8>),
    /// Caller's buffer, parsed in place
    Borrowed(&'a mut [u8]),
}

impl Buffer<'static> {
    /// Take an owned copy of `data`, reporting allocation failure as an error
    pub fn copy_from(data: &[u8]) -> Result<Self, ParseError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(data.len())
            .map_err(|_| ParseError::OutOfMemory {
                what: Allocation::Buffer,
            })?;
        bytes.extend_from_slice(data);
        Ok(Buffer::Owned(bytes))
    }
}

impl<'a> Buffer<'a> {
    /// Parse the caller's buffer directly
    pub fn in_place(data: &'a mut [u8]) -> Self {
        Buffer::Borrowed(data)
    }

    /// True when the document owns a copy of the input
    pub fn is_copied(&self) -> bool {
        matches!(self, Buffer::Owned(_))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Buffer::Owned(v) => v,
            Buffer::Borrowed(s) => s,
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Buffer::Owned(v) => v,
            Buffer::Borrowed(s) => s,
        }
    }
}

impl Deref for Buffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl DerefMut for Buffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_bytes_mut()
    }
}

impl From<Vec<u8>> for Buffer<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        Buffer::Owned(bytes)
    }
}

impl<'a> From<&'a mut [u8]> for Buffer<'a> {
    fn from(bytes: &'a mut [u8]) -> Self {
        Buffer::Borrowed(bytes)
    }
}
