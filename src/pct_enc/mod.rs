//! Percent-encoded slices and their decoding.

pub(crate) mod table;

use alloc::{borrow::Cow, string::String, vec::Vec};
use core::{fmt, hash, iter::FusedIterator, str};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// A slice of a URI component that may contain percent-encoded octets.
///
/// An `EStr` only contains characters allowed in a [query] component
/// (`pchar`, `"/"` and `"?"`), and every `'%'` in it starts a well-formed
/// percent-encoded octet. [`ParsedUri`](crate::ParsedUri) hands out `EStr`
/// slices for the userinfo, path segments, query and fragment.
///
/// Equality compares the bytes as written: `"%7e"`, `"%7E"` and `"~"`
/// are three different slices until normalized.
///
/// [query]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.4
///
/// # Examples
///
/// ```
/// use uri_dissect::ParsedUri;
///
/// let uri = ParsedUri::parse("http://example.com/%C2%A1Hola%21")?;
/// let seg = uri.path().segments().next().unwrap();
/// assert_eq!(seg, "%C2%A1Hola%21");
/// assert_eq!(seg.decode().to_string().unwrap(), "¡Hola!");
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct EStr {
    inner: str,
}

impl EStr {
    #[ref_cast_custom]
    pub(crate) const fn new_validated(s: &str) -> &Self;

    /// The empty slice.
    pub const EMPTY: &'static Self = Self::new_validated("");

    /// Checks a string and converts it to an `EStr`.
    ///
    /// Returns `None` if it contains a character not allowed in a query
    /// or a `'%'` not followed by two hexadecimal digits.
    #[must_use]
    pub const fn new(s: &str) -> Option<&Self> {
        if table::QUERY.validate(s.as_bytes()) {
            Some(Self::new_validated(s))
        } else {
            None
        }
    }

    /// Like [`new`](Self::new), but panics on an invalid string.
    ///
    /// # Panics
    ///
    /// Panics if [`new`](Self::new) would return `None`.
    #[must_use]
    pub const fn new_or_panic(s: &str) -> &Self {
        match Self::new(s) {
            Some(s) => s,
            None => panic!("improperly encoded string"),
        }
    }

    /// Returns the slice as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks whether the slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Decodes every percent-encoded octet.
    ///
    /// Split the slice before decoding it, or decoded octets may be
    /// mistaken for delimiters. A `'+'` is kept as it is; query pairs
    /// can decode it as a space instead, see
    /// [`QuerySplitter::plus_as_space`](crate::query::QuerySplitter::plus_as_space).
    pub fn decode(&self) -> Decode<'_> {
        Decode::new(&self.inner)
    }

    /// Splits the slice on a reserved delimiter.
    ///
    /// # Panics
    ///
    /// Panics if `delim` is not a [reserved] character.
    ///
    /// [reserved]: https://datatracker.ietf.org/doc/html/rfc3986#section-2.2
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_dissect::pct_enc::EStr;
    ///
    /// assert!(EStr::new_or_panic("a,b,c").split(',').eq(["a", "b", "c"]));
    /// assert!(EStr::new_or_panic(",").split(',').eq(["", ""]));
    /// assert!(EStr::EMPTY.split(',').eq([""]));
    /// ```
    pub fn split(&self, delim: char) -> Split<'_> {
        assert!(
            delim.is_ascii() && table::RESERVED.allows_ascii(delim as u8),
            "splitting with non-reserved character"
        );
        Split {
            inner: self.inner.split(delim),
        }
    }
}

impl PartialEq for EStr {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl PartialEq<str> for EStr {
    fn eq(&self, other: &str) -> bool {
        &self.inner == other
    }
}

impl PartialEq<EStr> for str {
    fn eq(&self, other: &EStr) -> bool {
        self == &other.inner
    }
}

impl Eq for EStr {}

impl hash::Hash for EStr {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Debug for EStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for EStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

pub(crate) const fn is_hexdig_pair(hi: u8, lo: u8) -> bool {
    hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
}

pub(crate) fn decode_hexdigit(x: u8) -> Option<u8> {
    match x {
        b'0'..=b'9' => Some(x - b'0'),
        b'A'..=b'F' => Some(x - b'A' + 10),
        b'a'..=b'f' => Some(x - b'a' + 10),
        _ => None,
    }
}

/// `hi` and `lo` must be hexadecimal digits.
fn decode_octet(hi: u8, lo: u8) -> u8 {
    match (decode_hexdigit(hi), decode_hexdigit(lo)) {
        (Some(hi), Some(lo)) => hi << 4 | lo,
        _ => unreachable!("malformed octet in validated slice"),
    }
}

fn push_pct_encoded(buf: &mut String, x: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    buf.push('%');
    buf.push(HEX[usize::from(x >> 4)] as char);
    buf.push(HEX[usize::from(x & 0xf)] as char);
}

/// Writes `s` to `buf` in percent-encoding normal form.
///
/// Octets that decode to an unreserved character are written unencoded,
/// and every other octet with uppercase hexadecimal digits.
/// Unencoded characters, decoded ones included, are lowercased
/// if `to_ascii_lowercase` is set.
///
/// `s` must not contain any malformed percent-encoded octet.
pub(crate) fn normalize_into(buf: &mut String, s: &str, to_ascii_lowercase: bool) {
    for chunk in Decode::new(s) {
        match chunk {
            DecodedChunk::Unencoded(s) => {
                let i = buf.len();
                buf.push_str(s);
                if to_ascii_lowercase {
                    buf[i..].make_ascii_lowercase();
                }
            }
            DecodedChunk::PctDecoded(x) if table::UNRESERVED.allows_ascii(x) => {
                let x = if to_ascii_lowercase {
                    x.to_ascii_lowercase()
                } else {
                    x
                };
                buf.push(x as char);
            }
            DecodedChunk::PctDecoded(x) => push_pct_encoded(buf, x),
        }
    }
}

/// An iterator that decodes a percent-encoded slice.
///
/// Created by [`EStr::decode`], [`QueryPair::decode_key`] and
/// [`QueryPair::decode_value`]. The methods `to_bytes`, `to_string` and
/// `to_string_lossy` collect it, borrowing when nothing needs decoding.
///
/// [`QueryPair::decode_key`]: crate::query::QueryPair::decode_key
/// [`QueryPair::decode_value`]: crate::query::QueryPair::decode_value
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Decode<'a> {
    source: &'a str,
    plus_as_space: bool,
}

/// An item of the [`Decode`] iterator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodedChunk<'a> {
    /// A run of characters that need no decoding.
    /// A `'+'` decoded as a space is yielded as `" "`.
    Unencoded(&'a str),
    /// The value of a percent-encoded octet, such as `0x20` for `"%20"`.
    PctDecoded(u8),
}

impl<'a> Decode<'a> {
    /// `source` must not contain any malformed percent-encoded octet.
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            plus_as_space: false,
        }
    }

    pub(crate) fn plus_as_space(mut self, yes: bool) -> Self {
        self.plus_as_space = yes;
        self
    }

    fn is_special(&self, x: u8) -> bool {
        x == b'%' || (self.plus_as_space && x == b'+')
    }

    fn next_if_unencoded(&mut self) -> Option<&'a str> {
        let i = self
            .source
            .bytes()
            .position(|x| self.is_special(x))
            .unwrap_or(self.source.len());

        if i == 0 {
            return None;
        }
        let s;
        (s, self.source) = self.source.split_at(i);
        Some(s)
    }

    // A '+' decodes to one byte, so only triplets shrink.
    fn decoded_len(&self) -> usize {
        self.source.len() - self.source.bytes().filter(|&x| x == b'%').count() * 2
    }

    fn borrow_all_or_prep_buf(&mut self) -> Result<&'a str, Vec<u8>> {
        match self.next_if_unencoded() {
            Some(s) if self.source.is_empty() => Ok(s),
            Some(s) => {
                let mut buf = Vec::with_capacity(s.len() + self.decoded_len());
                buf.extend_from_slice(s.as_bytes());
                Err(buf)
            }
            None => Err(Vec::with_capacity(self.decoded_len())),
        }
    }

    fn decode_rest_into(self, buf: &mut Vec<u8>) {
        for chunk in self {
            match chunk {
                DecodedChunk::Unencoded(s) => buf.extend_from_slice(s.as_bytes()),
                DecodedChunk::PctDecoded(x) => buf.push(x),
            }
        }
    }

    /// Decodes to bytes.
    ///
    /// Allocates only when something was decoded.
    #[must_use]
    pub fn to_bytes(mut self) -> Cow<'a, [u8]> {
        if self.source.is_empty() {
            return Cow::Borrowed(&[]);
        }
        match self.borrow_all_or_prep_buf() {
            Ok(s) => Cow::Borrowed(s.as_bytes()),
            Err(mut buf) => {
                self.decode_rest_into(&mut buf);
                Cow::Owned(buf)
            }
        }
    }

    /// Decodes to a string.
    ///
    /// Allocates only when something was decoded.
    ///
    /// # Errors
    ///
    /// Returns `Err` with the decoded bytes if they are not valid UTF-8.
    pub fn to_string(self) -> Result<Cow<'a, str>, Vec<u8>> {
        match self.to_bytes() {
            Cow::Borrowed(bytes) => match str::from_utf8(bytes) {
                Ok(s) => Ok(Cow::Borrowed(s)),
                Err(_) => Err(bytes.to_vec()),
            },
            Cow::Owned(buf) => String::from_utf8(buf)
                .map(Cow::Owned)
                .map_err(|e| e.into_bytes()),
        }
    }

    /// Decodes to a string, replacing invalid UTF-8 sequences with
    /// [`U+FFFD`](char::REPLACEMENT_CHARACTER).
    #[must_use]
    pub fn to_string_lossy(self) -> Cow<'a, str> {
        match self.to_string() {
            Ok(s) => s,
            Err(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

impl<'a> Iterator for Decode<'a> {
    type Item = DecodedChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(s) = self.next_if_unencoded() {
            return Some(DecodedChunk::Unencoded(s));
        }
        match *self.source.as_bytes() {
            [] => None,
            [b'+', ..] => {
                self.source = &self.source[1..];
                Some(DecodedChunk::Unencoded(" "))
            }
            [_, hi, lo, ..] => {
                self.source = &self.source[3..];
                Some(DecodedChunk::PctDecoded(decode_octet(hi, lo)))
            }
            _ => unreachable!("malformed octet in validated slice"),
        }
    }
}

impl FusedIterator for Decode<'_> {}

/// An iterator over the subslices of an [`EStr`] between delimiters.
///
/// Created by [`EStr::split`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Split<'a> {
    inner: str::Split<'a, char>,
}

impl<'a> Iterator for Split<'a> {
    type Item = &'a EStr;

    fn next(&mut self) -> Option<&'a EStr> {
        self.inner.next().map(EStr::new_validated)
    }
}

impl<'a> DoubleEndedIterator for Split<'a> {
    fn next_back(&mut self) -> Option<&'a EStr> {
        self.inner.next_back().map(EStr::new_validated)
    }
}

impl FusedIterator for Split<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(s: &str, lowercase: bool) -> String {
        let mut buf = String::new();
        normalize_into(&mut buf, s, lowercase);
        buf
    }

    #[test]
    fn hexdigits() {
        assert_eq!(decode_hexdigit(b'7'), Some(7));
        assert_eq!(decode_hexdigit(b'c'), Some(12));
        assert_eq!(decode_hexdigit(b'F'), Some(15));
        assert_eq!(decode_hexdigit(b'g'), None);
        assert_eq!(decode_octet(b'2', b'f'), b'/');
        assert!(is_hexdig_pair(b'0', b'a'));
        assert!(!is_hexdig_pair(b'0', b'x'));
    }

    #[test]
    fn normalize_octets() {
        assert_eq!(normalized("%7e%2f%41", false), "~%2FA");
        assert_eq!(normalized("%7bfoo%7d", false), "%7Bfoo%7D");
        assert_eq!(normalized("%45XAMPLE", true), "example");
        assert_eq!(normalized("%00%ff", false), "%00%FF");
        assert_eq!(normalized("a+b", false), "a+b");
        assert_eq!(normalized("plain", false), "plain");
    }

    #[test]
    fn decode() {
        let dec = EStr::new_or_panic("%C2%A1Hola%21").decode();
        assert_eq!(*dec.clone().to_bytes(), [0xc2, 0xa1, 0x48, 0x6f, 0x6c, 0x61, 0x21]);
        assert_eq!(dec.to_string().unwrap(), "¡Hola!");

        assert!(matches!(EStr::new_or_panic("abc").decode().to_bytes(), Cow::Borrowed(_)));
        assert_eq!(EStr::new_or_panic("%FF").decode().to_string(), Err(alloc::vec![0xff]));
        assert_eq!(EStr::new_or_panic("a%FFb").decode().to_string_lossy(), "a\u{fffd}b");
    }

    #[test]
    fn decode_plus() {
        assert_eq!(Decode::new("a+b").to_string().unwrap(), "a+b");

        let dec = Decode::new("a+b%2B+").plus_as_space(true);
        assert!(dec.clone().eq([
            DecodedChunk::Unencoded("a"),
            DecodedChunk::Unencoded(" "),
            DecodedChunk::Unencoded("b"),
            DecodedChunk::PctDecoded(b'+'),
            DecodedChunk::Unencoded(" "),
        ]));
        assert_eq!(dec.to_string().unwrap(), "a b+ ");

        assert!(matches!(
            Decode::new("abc").plus_as_space(true).to_bytes(),
            Cow::Borrowed(b"abc")
        ));
        assert_eq!(Decode::new("+").plus_as_space(true).to_bytes(), &b" "[..]);
    }

    #[test]
    fn validation() {
        assert!(EStr::new("a%20b").is_some());
        assert!(EStr::new("a%2").is_none());
        assert!(EStr::new("a b").is_none());
        assert!(EStr::new("a#b").is_none());
    }
}
