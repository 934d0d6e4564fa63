use crate::{
    component::{Authority, ByteRange, Host, Path, Ranges, Scheme},
    error::{ErrorKind, ParseError},
    log::{debug, trace},
    normalize::Normalizer,
    parse,
    pct_enc::EStr,
    query::{QueryList, QuerySplitter},
};
use alloc::{borrow::ToOwned, string::String};
use borrow_or_share::{BorrowOrShare, Bos};
use core::{
    fmt, hash,
    net::{Ipv4Addr, Ipv6Addr},
    num::ParseIntError,
};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Component boundaries of a parsed URI (reference).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Meta {
    pub scheme: Option<ByteRange>,
    pub auth: Option<AuthMeta>,
    pub path: ByteRange,
    pub query: Option<ByteRange>,
    pub fragment: Option<ByteRange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AuthMeta {
    pub bounds: ByteRange,
    pub userinfo: Option<ByteRange>,
    pub host: ByteRange,
    pub host_meta: HostMeta,
    pub port: Option<ByteRange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HostMeta {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    IpvFuture,
    RegName,
}

/// A URI reference decomposed into its components.
///
/// A `ParsedUri` consists of a backing string and the byte ranges of its
/// components within that string. Nothing is copied out of the backing
/// string: every accessor returns a slice of it.
///
/// # Variants
///
/// Two variants of `ParsedUri` are available:
///
/// - `ParsedUri<&str>` borrows the caller's input. It is created by
///   [`ParsedUri::parse`] and describes the input exactly as written.
/// - `ParsedUri<String>` owns its backing string. It is created by
///   [`normalize`](Self::normalize) or [`crate::parse()`], and is always
///   in normal form.
///
/// `ParsedUri<&'a str>` outputs references with lifetime `'a` where possible
/// (thanks to [`borrow-or-share`](borrow_or_share)):
///
/// ```
/// use uri_dissect::ParsedUri;
///
/// // Keep a reference to the path after dropping the `ParsedUri`.
/// let path = ParsedUri::parse("foo:bar")?.path();
/// assert_eq!(path, "bar");
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
///
/// # Comparison
///
/// `ParsedUri`s are compared by their backing strings.
/// Normalization is **not** performed prior to comparison.
///
/// # Examples
///
/// Parse and extract components from a URI:
///
/// ```
/// use uri_dissect::{component::Host, ParsedUri};
///
/// let s = "foo://user@example.com:8042/over/there?name=ferret#nose";
/// let uri = ParsedUri::parse(s)?;
///
/// assert_eq!(uri.scheme().unwrap().as_str(), "foo");
///
/// let auth = uri.authority().unwrap();
/// assert_eq!(auth.as_str(), "user@example.com:8042");
/// assert_eq!(auth.userinfo().unwrap(), "user");
/// assert_eq!(auth.host(), "example.com");
/// assert!(matches!(auth.host_parsed(), Host::RegName(name) if name == "example.com"));
/// assert_eq!(auth.port(), Some("8042"));
/// assert_eq!(auth.port_to_u16(), Ok(Some(8042)));
///
/// assert_eq!(uri.path(), "/over/there");
/// assert_eq!(uri.query().unwrap(), "name=ferret");
/// assert_eq!(uri.fragment().unwrap(), "nose");
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
#[derive(Clone, Copy)]
pub struct ParsedUri<T> {
    val: T,
    meta: Meta,
}

impl<'a> ParsedUri<&'a str> {
    /// Parses a URI reference from a string without normalizing it.
    ///
    /// The result borrows `s`; its components are exactly as written.
    /// Use [`crate::parse()`] to parse and normalize in one go.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is empty ([`ErrorKind::NullInput`]),
    /// contains a non-ASCII character ([`ErrorKind::NotImplemented`]),
    /// has a port that is not all digits ([`ErrorKind::RangeInvalid`]),
    /// or does not match the [`URI-reference`] ABNF rule from RFC 3986
    /// ([`ErrorKind::Syntax`]).
    ///
    /// [`URI-reference`]: https://datatracker.ietf.org/doc/html/rfc3986#section-4.1
    pub fn parse(s: &'a str) -> Result<Self, ParseError> {
        if s.is_empty() {
            debug!("rejected empty input");
            return Err(ParseError::new(0, ErrorKind::NullInput));
        }
        match parse::parse(s.as_bytes()) {
            Ok(meta) => {
                trace!("parsed {:?} into {:?}", s, meta);
                Ok(Self { val: s, meta })
            }
            Err(e) => {
                debug!("rejected {:?}: {}", s, e);
                Err(e)
            }
        }
    }

    /// Creates a new `ParsedUri<String>` by cloning the contents of this `ParsedUri<&str>`.
    #[must_use]
    pub fn to_owned(&self) -> ParsedUri<String> {
        ParsedUri {
            val: self.val.to_owned(),
            meta: self.meta,
        }
    }
}

impl ParsedUri<String> {
    pub(crate) fn from_parts(val: String, meta: Meta) -> Self {
        Self { val, meta }
    }

    /// Borrows this `ParsedUri<String>` as `ParsedUri<&str>`.
    #[must_use]
    pub fn borrow(&self) -> ParsedUri<&str> {
        ParsedUri {
            val: &self.val,
            meta: self.meta,
        }
    }

    /// Consumes this `ParsedUri<String>` and yields the underlying [`String`].
    #[must_use]
    pub fn into_string(self) -> String {
        self.val
    }
}

impl<'i, 'o, T: BorrowOrShare<'i, 'o, str>> ParsedUri<T> {
    /// Returns the URI reference as a string slice.
    #[must_use]
    pub fn as_str(&'i self) -> &'o str {
        self.val.borrow_or_share()
    }

    fn eslice(&'i self, r: ByteRange) -> &'o EStr {
        EStr::new_validated(r.slice(self.as_str()))
    }

    /// Returns the optional [scheme] component.
    ///
    /// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_dissect::{component::Scheme, ParsedUri};
    ///
    /// const SCHEME_HTTP: &Scheme = Scheme::new_or_panic("http");
    ///
    /// let uri = ParsedUri::parse("http://example.com/")?;
    /// assert_eq!(uri.scheme(), Some(SCHEME_HTTP));
    ///
    /// let uri = ParsedUri::parse("/path/to/file")?;
    /// assert_eq!(uri.scheme(), None);
    /// # Ok::<_, uri_dissect::ParseError>(())
    /// ```
    #[must_use]
    pub fn scheme(&'i self) -> Option<&'o Scheme> {
        self.meta
            .scheme
            .map(|r| Scheme::new_validated(r.slice(self.as_str())))
    }

    /// Returns the optional [authority] component.
    ///
    /// [authority]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2
    #[must_use]
    pub fn authority(&'i self) -> Option<Authority<'o>> {
        self.meta
            .auth
            .map(|meta| Authority::new(self.as_str(), meta))
    }

    /// Returns the optional userinfo subcomponent of the authority.
    #[must_use]
    pub fn userinfo(&'i self) -> Option<&'o EStr> {
        self.meta.auth?.userinfo.map(|r| self.eslice(r))
    }

    /// Returns the host subcomponent of the authority as a string slice,
    /// or `None` if the authority is absent.
    #[must_use]
    pub fn host(&'i self) -> Option<&'o str> {
        self.meta.auth.map(|auth| auth.host.slice(self.as_str()))
    }

    /// Returns the parsed host subcomponent of the authority,
    /// or `None` if the authority is absent.
    #[must_use]
    pub fn host_parsed(&'i self) -> Option<Host<'o>> {
        self.authority().map(|auth| auth.host_parsed())
    }

    /// Returns the optional port subcomponent of the authority.
    ///
    /// An empty port is reported as absent.
    #[must_use]
    pub fn port(&'i self) -> Option<&'o str> {
        self.meta.auth?.port.map(|r| r.slice(self.as_str()))
    }

    /// Converts the port subcomponent to `u16`, if present.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the port cannot be converted to `u16`.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_dissect::ParsedUri;
    ///
    /// let uri = ParsedUri::parse("http://localhost:8080/")?;
    /// assert_eq!(uri.port_to_u16(), Ok(Some(8080)));
    ///
    /// let uri = ParsedUri::parse("http://localhost:66666/")?;
    /// assert!(uri.port_to_u16().is_err());
    /// # Ok::<_, uri_dissect::ParseError>(())
    /// ```
    pub fn port_to_u16(&'i self) -> Result<Option<u16>, ParseIntError> {
        self.port().map(str::parse).transpose()
    }

    /// Returns the [path] component.
    ///
    /// The path component is always present, although it may be empty.
    ///
    /// [path]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.3
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_dissect::ParsedUri;
    ///
    /// let uri = ParsedUri::parse("http://example.com/")?;
    /// assert_eq!(uri.path(), "/");
    ///
    /// let uri = ParsedUri::parse("mailto:user@example.com")?;
    /// assert_eq!(uri.path(), "user@example.com");
    ///
    /// let uri = ParsedUri::parse("http://example.com")?;
    /// assert_eq!(uri.path(), "");
    /// # Ok::<_, uri_dissect::ParseError>(())
    /// ```
    #[must_use]
    pub fn path(&'i self) -> Path<'o> {
        Path::new(self.eslice(self.meta.path))
    }

    /// Returns the optional [query] component.
    ///
    /// [query]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.4
    #[must_use]
    pub fn query(&'i self) -> Option<&'o EStr> {
        self.meta.query.map(|r| self.eslice(r))
    }

    /// Returns the optional [fragment] component.
    ///
    /// [fragment]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.5
    #[must_use]
    pub fn fragment(&'i self) -> Option<&'o EStr> {
        self.meta.fragment.map(|r| self.eslice(r))
    }

    /// Decomposes the query component into key-value pairs,
    /// splitting on `'&'` and `';'`.
    ///
    /// Returns `None` if the query is absent. The pairs are slices of the
    /// query as it appears in this `ParsedUri`, so they are in normal form
    /// exactly when the `ParsedUri` is.
    ///
    /// # Examples
    ///
    /// ```
    /// let uri = uri_dissect::parse("http://example.com/?a=%7e1&b=&c")?;
    /// let pairs = uri.query_pairs().unwrap();
    ///
    /// assert!(pairs
    ///     .iter()
    ///     .map(|p| (p.key(), p.value()))
    ///     .eq([("a", Some("~1")), ("b", Some("")), ("c", None)]));
    /// # Ok::<_, uri_dissect::ParseError>(())
    /// ```
    #[must_use]
    pub fn query_pairs(&'i self) -> Option<QueryList<&'o str>> {
        self.query_pairs_with(&QuerySplitter::new())
    }

    /// Decomposes the query component into key-value pairs with the given splitter.
    ///
    /// Returns `None` if the query is absent.
    #[must_use]
    pub fn query_pairs_with(&'i self, splitter: &QuerySplitter) -> Option<QueryList<&'o str>> {
        self.query()
            .map(|query| splitter.split_validated(query.as_str()))
    }

    /// Returns the byte ranges of all components within [`as_str`](Self::as_str).
    #[must_use]
    pub fn ranges(&self) -> Ranges {
        let auth = self.meta.auth;
        Ranges {
            scheme: self.meta.scheme,
            userinfo: auth.and_then(|a| a.userinfo),
            host: auth.map(|a| a.host),
            port: auth.and_then(|a| a.port),
            path: self.meta.path,
            query: self.meta.query,
            fragment: self.meta.fragment,
        }
    }
}

impl<T: Bos<str>> ParsedUri<T> {
    /// Normalizes the URI reference.
    ///
    /// This applies, in order:
    ///
    /// - Lowercasing of the scheme and of a registered name or IP literal host.
    /// - Decoding of every percent-encoded octet that encodes an unreserved
    ///   character, and uppercasing of the hexadecimal digits of every other one.
    /// - Removal of dot segments from the path. A `".."` segment that has
    ///   no preceding segment to remove is dropped from an absolute path
    ///   and preserved in a relative one.
    /// - Removal of a port equal to the default port of the scheme.
    ///
    /// Normalization never fails and is idempotent.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_dissect::ParsedUri;
    ///
    /// let uri = ParsedUri::parse("eXAMPLE://a/./b/../b/%63/%7bfoo%7d")?;
    /// assert_eq!(uri.normalize().as_str(), "example://a/b/c/%7Bfoo%7D");
    /// # Ok::<_, uri_dissect::ParseError>(())
    /// ```
    #[must_use]
    pub fn normalize(&self) -> ParsedUri<String> {
        Normalizer::new().normalize(self)
    }

    /// Normalizes the URI reference with the given normalizer.
    #[must_use]
    pub fn normalize_with(&self, normalizer: &Normalizer) -> ParsedUri<String> {
        normalizer.normalize(self)
    }

    pub(crate) fn parts(&self) -> (&str, &Meta) {
        (self.val.borrow_or_share(), &self.meta)
    }
}

impl<T: Bos<str>, U: Bos<str>> PartialEq<ParsedUri<U>> for ParsedUri<T> {
    fn eq(&self, other: &ParsedUri<U>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<T: Bos<str>> PartialEq<str> for ParsedUri<T> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<T: Bos<str>> PartialEq<&str> for ParsedUri<T> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<T: Bos<str>> Eq for ParsedUri<T> {}

impl<T: Bos<str>> hash::Hash for ParsedUri<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl<T: Bos<str>> fmt::Debug for ParsedUri<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedUri")
            .field("scheme", &self.scheme())
            .field("authority", &self.authority())
            .field("path", &self.path())
            .field("query", &self.query())
            .field("fragment", &self.fragment())
            .finish()
    }
}

impl<T: Bos<str>> fmt::Display for ParsedUri<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl<'a> From<ParsedUri<&'a str>> for &'a str {
    fn from(value: ParsedUri<&'a str>) -> Self {
        value.val
    }
}

impl From<ParsedUri<String>> for String {
    fn from(value: ParsedUri<String>) -> Self {
        value.val
    }
}

#[cfg(feature = "serde")]
impl<T: Bos<str>> Serialize for ParsedUri<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ParsedUri<&'de str> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        ParsedUri::parse(s).map_err(|e| {
            de::Error::custom(format_args!("failed to parse {s:?} as URI reference: {e}"))
        })
    }
}

/// Deserializes and normalizes.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ParsedUri<String> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        crate::parse(&s).map_err(|e| {
            de::Error::custom(format_args!("failed to parse {s:?} as URI reference: {e}"))
        })
    }
}
