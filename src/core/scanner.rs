//! SIMD-accelerated cursor over the writable document buffer
//!
//! Delimiter searches go through memchr (SSE2/AVX2/NEON when available).
//! Unlike a read-only scanner this one owns a mutable borrow so the parser
//! can overwrite delimiters with NUL terminators as it goes.

use memchr::{memchr, memchr2, memmem};

/// Cursor over the mutable buffer
pub struct Scanner<'b> {
    input: &'b mut [u8],
    pos: usize,
}

impl<'b> Scanner<'b> {
    /// Create a new scanner for the given buffer
    #[inline]
    pub fn new(input: &'b mut [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Total buffer length
    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Get a slice from start to end positions
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        &self.input[start..end]
    }

    /// Skip whitespace characters (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    /// Advance to the first tag delimiter: whitespace, '>' or '/'
    ///
    /// Returns the delimiter byte, or None at end of input.
    pub fn scan_tag_name(&mut self) -> Option<u8> {
        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            if is_whitespace(c) || c == b'>' || c == b'/' {
                return Some(c);
            }
            self.pos += 1;
        }
        None
    }

    /// Advance to the end of an attribute name ('=' or whitespace)
    pub fn scan_attribute_name(&mut self) -> Option<u8> {
        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            if c == b'=' || is_whitespace(c) || c == b'>' || c == b'/' {
                return Some(c);
            }
            self.pos += 1;
        }
        None
    }

    /// Find next occurrence of a specific byte
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, self.input.get(self.pos..)?).map(|i| self.pos + i)
    }

    /// Find next occurrence of either of two bytes
    #[inline]
    pub fn find_byte2(&self, b1: u8, b2: u8) -> Option<usize> {
        memchr2(b1, b2, self.input.get(self.pos..)?).map(|i| self.pos + i)
    }

    /// Find the next occurrence of a byte sequence
    #[inline]
    pub fn find_seq(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(self.input.get(self.pos..)?, needle).map(|i| self.pos + i)
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.input[self.pos.min(self.input.len())..].starts_with(needle)
    }

    /// Overwrite the byte at `pos` with a NUL terminator
    ///
    /// Positions past the end are ignored: a span that runs to the end of the
    /// buffer is bounded by the buffer length instead.
    #[inline]
    pub fn terminate(&mut self, pos: usize) {
        if let Some(b) = self.input.get_mut(pos) {
            *b = 0;
        }
    }
}

/// XML whitespace
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Bytes that may begin an attribute name
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b':' || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_byte() {
        let mut buf = *b"hello <world>";
        let scanner = Scanner::new(&mut buf);
        assert_eq!(scanner.find_byte(b'<'), Some(6));
    }

    #[test]
    fn test_scan_tag_name() {
        let mut buf = *b"element-name attr=\"1\">";
        let mut scanner = Scanner::new(&mut buf);
        assert_eq!(scanner.scan_tag_name(), Some(b' '));
        assert_eq!(scanner.position(), 12);
    }

    #[test]
    fn test_scan_tag_name_self_closed() {
        let mut buf = *b"br/>";
        let mut scanner = Scanner::new(&mut buf);
        assert_eq!(scanner.scan_tag_name(), Some(b'/'));
        assert_eq!(scanner.position(), 2);
    }

    #[test]
    fn test_skip_whitespace() {
        let mut buf = *b"  \t\n hello";
        let mut scanner = Scanner::new(&mut buf);
        scanner.skip_whitespace();
        assert_eq!(scanner.position(), 5);
    }

    #[test]
    fn test_find_seq() {
        let mut buf = *b"<!-- a - b -->x";
        let mut scanner = Scanner::new(&mut buf);
        scanner.advance(4);
        assert_eq!(scanner.find_seq(b"-->"), Some(11));
    }

    #[test]
    fn test_terminate() {
        let mut buf = *b"a=b";
        {
            let mut scanner = Scanner::new(&mut buf);
            scanner.terminate(1);
            scanner.terminate(99);
        }
        assert_eq!(&buf, b"a\0b");
    }
}
