#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A URI parser and normalizer following IETF [RFC 3986], with query decomposition.
//!
//! [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986/
//!
//! **Parsing.** [`ParsedUri::parse`] validates a URI reference and records the
//! boundaries of its components without copying. Components are accessed with
//! the getter methods on [`ParsedUri`].
//!
//! **Normalization.** [`ParsedUri::normalize`] produces the syntax-based normal
//! form: the scheme and host are lowercased, percent-encoded octets are brought
//! to normal form, dot segments are removed from the path and a port equal to
//! the default port of the scheme is elided. [`parse()`] parses and normalizes
//! in one go.
//!
//! **Query decomposition.** [`ParsedUri::query_pairs`] and [`parse_query`]
//! split a query into an ordered list of key-value pairs.
//!
//! # Examples
//!
//! ```
//! let uri = uri_dissect::parse("HTTP://User@Example.COM:80/a/./b/../c?x=1&y=%7e#top")?;
//!
//! assert_eq!(uri.as_str(), "http://User@example.com/a/c?x=1&y=~#top");
//! assert_eq!(uri.scheme().unwrap().as_str(), "http");
//! assert_eq!(uri.userinfo().unwrap(), "User");
//! assert_eq!(uri.host(), Some("example.com"));
//! assert_eq!(uri.port(), None);
//! assert!(uri.path().segments().eq(["a", "c"]));
//!
//! let pairs = uri.query_pairs().unwrap();
//! assert!(pairs
//!     .iter()
//!     .map(|p| (p.key(), p.value()))
//!     .eq([("x", Some("1")), ("y", Some("~"))]));
//! # Ok::<_, uri_dissect::ParseError>(())
//! ```
//!
//! # Feature flags
//!
//! All features except `std` are disabled by default.
//!
//! - `std`: Enables `std` support. This includes [`Error`] implementations.
//!
//! - `serde`: Provides `Serialize` and `Deserialize` implementations for
//!   [`ParsedUri`], and `Serialize` implementations for [`QueryList`] and
//!   [`QueryPair`].
//!
//! - `log`: Emits diagnostics through the [`log`] facade: rejected inputs
//!   at debug level and successful operations at trace level.
//!
//! [`Error`]: std::error::Error
//! [`QueryPair`]: query::QueryPair
//! [`log`]: https://docs.rs/log

extern crate alloc;

pub mod component;
mod error;
mod log;
pub mod normalize;
mod parse;
pub mod pct_enc;
pub mod query;
mod scan;
mod uri;

pub use error::{ErrorKind, ParseError};
pub use query::QueryList;
pub use uri::ParsedUri;

use alloc::string::String;

/// Parses and normalizes a URI reference.
///
/// This is [`ParsedUri::parse`] followed by [`ParsedUri::normalize`].
/// To decompose the query, call [`ParsedUri::query_pairs`] on the result.
///
/// # Errors
///
/// Returns `Err` if the string is not a valid URI reference.
/// See [`ParsedUri::parse`] for the possible kinds of error.
///
/// # Examples
///
/// ```
/// use uri_dissect::ErrorKind;
///
/// let uri = uri_dissect::parse("http://h/a/b/../c")?;
/// assert!(uri.path().segments().eq(["a", "c"]));
///
/// let err = uri_dissect::parse("http://h/%G1").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Syntax);
/// assert_eq!(err.index(), 9);
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
pub fn parse(s: &str) -> Result<ParsedUri<String>, ParseError> {
    ParsedUri::parse(s).map(|uri| uri.normalize())
}

/// Normalizes a standalone query string and splits it into key-value pairs.
///
/// This is [`QuerySplitter::parse`] with the default splitter.
/// An empty string yields an empty list.
///
/// # Errors
///
/// Returns `Err` with [`ErrorKind::Syntax`] if a `'%'` is not followed
/// by two hexadecimal digits.
///
/// # Examples
///
/// ```
/// let list = uri_dissect::parse_query("a=1&b=&c")?;
///
/// assert!(list
///     .iter()
///     .map(|p| (p.key(), p.value()))
///     .eq([("a", Some("1")), ("b", Some("")), ("c", None)]));
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
///
/// [`QuerySplitter::parse`]: query::QuerySplitter::parse
pub fn parse_query(s: &str) -> Result<QueryList<String>, ParseError> {
    query::QuerySplitter::new().parse(s)
}
