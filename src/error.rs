//! Error types.

use core::fmt;

/// Detailed cause of a [`ParseError`].
///
/// The set of kinds is closed: every failing operation in this crate
/// reports exactly one of them and never returns a partial result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The input violates the URI or query grammar: a malformed
    /// percent-encoded octet, a disallowed character or a missing delimiter.
    ///
    /// The error index points to the offending byte, or to the percent
    /// character "%" of a malformed octet.
    Syntax,
    /// A required input was empty.
    ///
    /// The error index is always `0`.
    NullInput,
    /// A component's boundaries are inconsistent with its grammar,
    /// such as a port containing a non-digit.
    ///
    /// The error index points to the first offending byte.
    RangeInvalid,
    /// Some output is too large for a fixed-capacity receiving buffer.
    ///
    /// All buffers in this crate grow on demand, so this kind is never
    /// produced by it. It is kept so that bindings can map the whole
    /// taxonomy one-to-one.
    OutputTooLarge,
    /// The input uses a production that is intentionally unsupported,
    /// such as the non-ASCII characters of an IRI.
    ///
    /// The error index points to the first byte of the character.
    NotImplemented,
}

impl ErrorKind {
    /// Returns a stable, human-readable description of the error kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_dissect::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::Syntax.description(), "parsed text violates expected format");
    /// ```
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Syntax => "parsed text violates expected format",
            Self::NullInput => "required input is empty",
            Self::RangeInvalid => "component contains an invalid range",
            Self::OutputTooLarge => "output is too large for the receiving buffer",
            Self::NotImplemented => "input uses an unsupported production",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// An error occurred when parsing a URI (reference) or a query string.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ParseError {
    index: usize,
    kind: ErrorKind,
}

impl ParseError {
    pub(crate) const fn new(index: usize, kind: ErrorKind) -> Self {
        Self { index, kind }
    }

    /// Returns the index at which the error occurred.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::NullInput => f.write_str(self.kind.description()),
            kind => write!(f, "{} at index {}", kind.description(), self.index),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}
