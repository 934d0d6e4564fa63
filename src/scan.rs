//! Byte scanner shared by the URI parser and the query splitter.

use crate::{
    error::{ErrorKind, ParseError},
    pct_enc::{self, table::Table},
};

pub(crate) type Result<T> = core::result::Result<T, ParseError>;

/// A cursor over the input bytes.
///
/// # Invariants
///
/// `pos <= len`, `pos` is non-decreasing and on the boundary of a UTF-8 code point.
pub(crate) struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Scanner { bytes, pos: 0 }
    }

    pub(crate) fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn has_remaining(&self) -> bool {
        self.pos < self.len()
    }

    pub(crate) fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    pub(crate) fn skip(&mut self, n: usize) {
        // INVARIANT: `pos` is non-decreasing.
        self.pos += n;
        debug_assert!(self.pos <= self.len());
    }

    /// Returns an error for the byte under the cursor.
    ///
    /// A non-ASCII byte belongs to an IRI character, which is reported
    /// as unsupported rather than as a plain syntax violation.
    #[cold]
    pub(crate) fn unexpected(&self) -> ParseError {
        unexpected_at(self.bytes, self.pos)
    }

    /// Reads the longest run of bytes allowed by `table`, starting at the cursor.
    ///
    /// Returns whether anything was read.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `table` allows percent-encoded octets and a `'%'`
    /// is not followed by two hexadecimal digits.
    pub(crate) fn read(&mut self, table: Table) -> Result<bool> {
        let start = self.pos;
        let mut i = self.pos;

        while i < self.len() {
            let x = self.bytes[i];
            if table.allows_pct_encoded() && x == b'%' {
                match self.bytes[i + 1..] {
                    [hi, lo, ..] if pct_enc::is_hexdig_pair(hi, lo) => i += 3,
                    _ => return Err(ParseError::new(i, ErrorKind::Syntax)),
                }
            } else if table.allows_ascii(x) {
                i += 1;
            } else {
                break;
            }
        }

        // INVARIANT: `i` is non-decreasing and only ASCII bytes were skipped.
        self.pos = i;
        Ok(self.pos > start)
    }

    pub(crate) fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            // INVARIANT: The remaining bytes start with `s` so it's fine to skip `s.len()`.
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    /// Reads ASCII digits, returning how many were read.
    pub(crate) fn read_digits(&mut self) -> usize {
        let mut i = 0;
        while self.peek(i).is_some_and(|x| x.is_ascii_digit()) {
            i += 1;
        }
        // INVARIANT: Skipping `i` digits is fine.
        self.skip(i);
        i
    }
}

pub(crate) fn unexpected_at(bytes: &[u8], index: usize) -> ParseError {
    let kind = match bytes.get(index) {
        Some(x) if !x.is_ascii() => ErrorKind::NotImplemented,
        _ => ErrorKind::Syntax,
    };
    ParseError::new(index, kind)
}

/// Checks that every `'%'` in `bytes` starts a well-formed percent-encoded octet.
///
/// No other byte is restricted.
pub(crate) fn check_pct_encoded(bytes: &[u8]) -> Result<()> {
    let mut i = 0;
    while let Some(off) = bytes[i..].iter().position(|&x| x == b'%') {
        i += off;
        match bytes[i + 1..] {
            [hi, lo, ..] if pct_enc::is_hexdig_pair(hi, lo) => i += 3,
            _ => return Err(ParseError::new(i, ErrorKind::Syntax)),
        }
    }
    Ok(())
}
