//! Span - offset and length into the document buffer
//!
//! Zero-copy reference to a portion of the (mutated) input.
//! Used for tag names, attribute names/values, and text content.

/// A span referencing a portion of the document buffer.
///
/// The byte at `end()` is the NUL terminator the parser spliced in, unless the
/// span runs to the very end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Span {
    /// Byte offset into the buffer
    pub offset: u32,
    /// Length in bytes, terminator excluded
    pub len: u32,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Create a span from a `start..end` byte range
    #[inline]
    pub const fn from_range(start: usize, end: usize) -> Self {
        Self {
            offset: start as u32,
            len: (end - start) as u32,
        }
    }

    /// Create an empty span (used for the document node tag)
    #[inline]
    pub const fn empty() -> Self {
        Self { offset: 0, len: 0 }
    }

    /// Check if this span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the end offset (exclusive)
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset as usize + self.len as usize
    }

    /// Extract the byte slice from the buffer
    #[inline]
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        let start = self.offset as usize;
        let end = self.end();
        if end <= buf.len() {
            &buf[start..end]
        } else {
            &[]
        }
    }

    /// Extract as UTF-8 string from the buffer
    #[inline]
    pub fn as_str<'a>(&self, buf: &'a [u8]) -> Option<&'a str> {
        std::str::from_utf8(self.slice(buf)).ok()
    }
}
