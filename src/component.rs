//! URI components.

use crate::{
    pct_enc::{table, EStr, Split},
    uri::{AuthMeta, HostMeta},
};
use core::{
    fmt,
    net::{Ipv4Addr, Ipv6Addr},
    num::ParseIntError,
    ops::Range,
};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// A byte range into the string backing a parsed value.
///
/// It is always true that `start <= end`, and both ends lie on
/// character boundaries of that string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ByteRange {
    start: usize,
    end: usize,
}

impl ByteRange {
    pub(crate) const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Returns the start index.
    #[must_use]
    pub const fn start(self) -> usize {
        self.start
    }

    /// Returns the end index (exclusive).
    #[must_use]
    pub const fn end(self) -> usize {
        self.end
    }

    /// Returns the length of the range in bytes.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Checks whether the range is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Slices the given string with the range.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds of `s` or not on character boundaries.
    #[must_use]
    pub fn slice(self, s: &str) -> &str {
        &s[self.start..self.end]
    }
}

impl From<ByteRange> for Range<usize> {
    fn from(r: ByteRange) -> Self {
        r.start..r.end
    }
}

/// The byte ranges of all components of a [`ParsedUri`](crate::ParsedUri).
///
/// An absent component has no range at all, while an empty one has a
/// zero-length range. `userinfo`, `host` and `port` are absent whenever
/// the authority is absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Ranges {
    /// The scheme, without the trailing `':'`.
    pub scheme: Option<ByteRange>,
    /// The userinfo, without the trailing `'@'`.
    pub userinfo: Option<ByteRange>,
    /// The host, including the brackets of an IP literal.
    pub host: Option<ByteRange>,
    /// The port, without the leading `':'`. Never empty.
    pub port: Option<ByteRange>,
    /// The path. Always present, possibly empty.
    pub path: ByteRange,
    /// The query, without the leading `'?'`.
    pub query: Option<ByteRange>,
    /// The fragment, without the leading `'#'`.
    pub fragment: Option<ByteRange>,
}

/// A [scheme] component.
///
/// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
///
/// # Comparison
///
/// `Scheme`s are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use uri_dissect::{component::Scheme, ParsedUri};
///
/// const SCHEME_HTTP: &Scheme = Scheme::new_or_panic("http");
///
/// let scheme = ParsedUri::parse("HTTP://EXAMPLE.COM/")?.scheme().unwrap();
///
/// // Case-insensitive comparison.
/// assert_eq!(scheme, SCHEME_HTTP);
/// // Case-sensitive comparison.
/// assert_eq!(scheme.as_str(), "HTTP");
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct Scheme {
    inner: str,
}

/// Well-known default ports, keyed by lowercase scheme.
static DEFAULT_PORTS: &[(&str, u16)] = &[
    ("ftp", 21),
    ("ssh", 22),
    ("telnet", 23),
    ("gopher", 70),
    ("http", 80),
    ("ws", 80),
    ("pop", 110),
    ("nntp", 119),
    ("imap", 143),
    ("snmp", 161),
    ("ldap", 389),
    ("https", 443),
    ("wss", 443),
    ("rtsp", 554),
    ("ldaps", 636),
    ("imaps", 993),
    ("pops", 995),
    ("mqtt", 1883),
    ("sip", 5060),
    ("sips", 5061),
    ("amqp", 5672),
    ("redis", 6379),
];

impl Scheme {
    #[ref_cast_custom]
    #[inline]
    pub(crate) const fn new_validated(scheme: &str) -> &Scheme;

    /// Converts a string slice to `&Scheme`.
    ///
    /// # Panics
    ///
    /// Panics if the string is not a valid scheme name according to
    /// [Section 3.1 of RFC 3986][scheme]. For a non-panicking variant,
    /// use [`new`](Self::new).
    ///
    /// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
    #[inline]
    #[must_use]
    pub const fn new_or_panic(s: &str) -> &Scheme {
        match Self::new(s) {
            Some(scheme) => scheme,
            None => panic!("invalid scheme"),
        }
    }

    /// Converts a string slice to `&Scheme`, returning `None` if the conversion fails.
    #[inline]
    #[must_use]
    pub const fn new(s: &str) -> Option<&Scheme> {
        if matches!(s.as_bytes(), [first, rem @ ..]
        if first.is_ascii_alphabetic() && table::SCHEME.validate(rem))
        {
            Some(Scheme::new_validated(s))
        } else {
            None
        }
    }

    /// Returns the scheme component as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the well-known default port of the scheme, if any.
    ///
    /// The lookup table is immutable. Schemes missing from it have no default port.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_dissect::component::Scheme;
    ///
    /// assert_eq!(Scheme::new_or_panic("HTTPS").default_port(), Some(443));
    /// assert_eq!(Scheme::new_or_panic("foo").default_port(), None);
    /// ```
    #[must_use]
    pub fn default_port(&self) -> Option<u16> {
        DEFAULT_PORTS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.inner))
            .map(|&(_, port)| port)
    }
}

impl PartialEq for Scheme {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq_ignore_ascii_case(&other.inner)
    }
}

impl Eq for Scheme {}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// An [authority] component.
///
/// [authority]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2
#[derive(Clone, Copy)]
pub struct Authority<'a> {
    val: &'a str,
    meta: AuthMeta,
}

impl<'a> Authority<'a> {
    pub(crate) fn new(val: &'a str, meta: AuthMeta) -> Self {
        Self { val, meta }
    }

    /// Returns the authority component as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.meta.bounds.slice(self.val)
    }

    /// Returns the optional [userinfo] subcomponent.
    ///
    /// [userinfo]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.1
    #[must_use]
    pub fn userinfo(&self) -> Option<&'a EStr> {
        self.meta
            .userinfo
            .map(|r| EStr::new_validated(r.slice(self.val)))
    }

    /// Returns the [host] subcomponent as a string slice.
    ///
    /// The square brackets enclosing an IP literal are included.
    ///
    /// [host]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.2
    #[must_use]
    pub fn host(&self) -> &'a str {
        self.meta.host.slice(self.val)
    }

    /// Returns the parsed [host] subcomponent.
    ///
    /// [host]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.2
    #[must_use]
    pub fn host_parsed(&self) -> Host<'a> {
        match self.meta.host_meta {
            HostMeta::Ipv4(addr) => Host::Ipv4(addr),
            HostMeta::Ipv6(addr) => Host::Ipv6(addr),
            HostMeta::IpvFuture => Host::IpvFuture,
            HostMeta::RegName => Host::RegName(EStr::new_validated(self.host())),
        }
    }

    /// Returns the optional [port] subcomponent.
    ///
    /// An empty port (as in `"http://host:/"`) is reported as absent.
    ///
    /// [port]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.3
    #[must_use]
    pub fn port(&self) -> Option<&'a str> {
        self.meta.port.map(|r| r.slice(self.val))
    }

    /// Converts the [port] subcomponent to `u16`, if present.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the port cannot be converted to `u16`.
    ///
    /// [port]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.3
    pub fn port_to_u16(&self) -> Result<Option<u16>, ParseIntError> {
        self.port().map(str::parse).transpose()
    }
}

impl fmt::Debug for Authority<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authority")
            .field("userinfo", &self.userinfo())
            .field("host", &self.host())
            .field("port", &self.port())
            .finish()
    }
}

/// A parsed [host] component.
///
/// [host]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.2
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Host<'a> {
    /// An IPv4 address.
    Ipv4(Ipv4Addr),
    /// An IPv6 address.
    Ipv6(Ipv6Addr),
    /// An IP address of future version.
    IpvFuture,
    /// A registered name.
    ///
    /// Note that registered names are *case-insensitive*.
    RegName(&'a EStr),
}

/// A [path] component.
///
/// [path]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.3
///
/// # Examples
///
/// ```
/// use uri_dissect::ParsedUri;
///
/// let path = ParsedUri::parse("file:///path/to//dir/")?.path();
/// assert_eq!(path.as_str(), "/path/to//dir/");
/// assert!(path.is_absolute());
/// assert!(path.has_trailing_slash());
/// assert!(path.segments().eq(["path", "to", "", "dir"]));
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Path<'a> {
    inner: &'a EStr,
}

impl<'a> Path<'a> {
    pub(crate) fn new(inner: &'a EStr) -> Self {
        Self { inner }
    }

    /// Returns the path as a string slice.
    ///
    /// This is the reconstruction of the path from its segments:
    /// a leading `'/'` if it is absolute, the segments joined with `'/'`
    /// and a trailing `'/'` if it has one.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.inner.as_str()
    }

    /// Checks whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Checks whether the path is absolute, i.e., starting with `'/'`.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.as_str().starts_with('/')
    }

    /// Checks whether the path has a trailing `'/'` after its last segment.
    ///
    /// The root path `"/"` has no segment and thus no trailing slash.
    #[must_use]
    pub fn has_trailing_slash(&self) -> bool {
        let s = self.as_str();
        s.ends_with('/') && s != "/"
    }

    /// Returns an iterator over the path segments, in order.
    ///
    /// The empty string before a leading `'/'` is not a segment, and neither is
    /// the empty string after a trailing `'/'` (see [`has_trailing_slash`]).
    /// Segments can be empty in the other cases.
    ///
    /// [`has_trailing_slash`]: Self::has_trailing_slash
    pub fn segments(&self) -> Segments<'a> {
        let mut s = self.as_str();
        s = s.strip_prefix('/').unwrap_or(s);
        s = s.strip_suffix('/').unwrap_or(s);
        Segments {
            inner: (!s.is_empty() || self.has_trailing_slash())
                .then(|| EStr::new_validated(s).split('/')),
        }
    }
}

impl PartialEq<str> for Path<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Path<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

/// An iterator over the segments of a [`Path`].
///
/// This struct is created by [`Path::segments`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Segments<'a> {
    inner: Option<Split<'a>>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a EStr;

    fn next(&mut self) -> Option<&'a EStr> {
        self.inner.as_mut()?.next()
    }
}

impl<'a> DoubleEndedIterator for Segments<'a> {
    fn next_back(&mut self) -> Option<&'a EStr> {
        self.inner.as_mut()?.next_back()
    }
}

impl core::iter::FusedIterator for Segments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(s: &str) -> alloc::vec::Vec<&str> {
        Path::new(EStr::new_or_panic(s))
            .segments()
            .map(EStr::as_str)
            .collect()
    }

    #[test]
    fn path_segments() {
        assert_eq!(segments(""), [""; 0]);
        assert_eq!(segments("/"), [""; 0]);
        assert_eq!(segments("//"), [""]);
        assert_eq!(segments("/a"), ["a"]);
        assert_eq!(segments("/a/"), ["a"]);
        assert_eq!(segments("/a//"), ["a", ""]);
        assert_eq!(segments("a/b"), ["a", "b"]);
        assert_eq!(segments("a/"), ["a"]);
    }

    #[test]
    fn trailing_slash() {
        let path = |s| Path::new(EStr::new_or_panic(s));
        assert!(!path("/").has_trailing_slash());
        assert!(path("/a/").has_trailing_slash());
        assert!(path("a/").has_trailing_slash());
        assert!(!path("/a").has_trailing_slash());
        assert!(!path("").has_trailing_slash());
        assert!(path("//").has_trailing_slash());
    }

    #[test]
    fn default_ports() {
        assert_eq!(Scheme::new_or_panic("http").default_port(), Some(80));
        assert_eq!(Scheme::new_or_panic("Ws").default_port(), Some(80));
        assert_eq!(Scheme::new_or_panic("wss").default_port(), Some(443));
        assert_eq!(Scheme::new_or_panic("x-http").default_port(), None);
    }

    #[test]
    fn scheme_validation() {
        assert!(Scheme::new("a+b-c.d").is_some());
        assert!(Scheme::new("1a").is_none());
        assert!(Scheme::new("").is_none());
        assert!(Scheme::new("a%41").is_none());
    }
}
