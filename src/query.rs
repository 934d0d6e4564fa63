//! Query decomposition.

use crate::{
    component::ByteRange,
    error::ParseError,
    log::{debug, trace},
    pct_enc::{self, Decode},
    scan,
};
use alloc::{string::String, vec::Vec};
use borrow_or_share::{BorrowOrShare, Bos};
use core::{fmt, iter::FusedIterator, slice};

#[cfg(feature = "serde")]
use serde::{ser::SerializeStruct, Serialize, Serializer};

/// Splits query strings into key-value pairs.
///
/// Pairs are separated by `'&'` and, unless disabled, by `';'`.
/// Each pair is split into a key and an optional value on its first `'='`.
/// Empty pairs are skipped, while duplicate keys are kept in source order.
///
/// Form-encoded queries write a space as `'+'`. Enable
/// [`plus_as_space`](Self::plus_as_space) to decode it that way in
/// [`QueryPair::decode_key`] and [`QueryPair::decode_value`].
///
/// # Examples
///
/// ```
/// use uri_dissect::query::QuerySplitter;
///
/// let list = QuerySplitter::new().semicolon(false).split("a=1;b=2&a")?;
///
/// assert!(list
///     .iter()
///     .map(|p| (p.key(), p.value()))
///     .eq([("a", Some("1;b=2")), ("a", None)]));
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct QuerySplitter {
    semicolon: bool,
    plus_as_space: bool,
}

impl Default for QuerySplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuerySplitter {
    /// Creates a new `QuerySplitter` that splits on both `'&'` and `';'`
    /// and keeps `'+'` as it is.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            semicolon: true,
            plus_as_space: false,
        }
    }

    /// Sets whether `';'` separates pairs.
    #[must_use]
    pub const fn semicolon(mut self, yes: bool) -> Self {
        self.semicolon = yes;
        self
    }

    /// Sets whether a `'+'` in a key or a value decodes as a space.
    ///
    /// Only decoding is affected: [`QueryPair::key`] and
    /// [`QueryPair::value`] still return the `'+'`, and `"%2B"` always
    /// decodes as `'+'`.
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_dissect::query::QuerySplitter;
    ///
    /// let list = QuerySplitter::new().plus_as_space(true).parse("q=rust+uri%2B")?;
    /// let pair = list.get(0).unwrap();
    ///
    /// assert_eq!(pair.value(), Some("rust+uri%2B"));
    /// assert_eq!(pair.decode_value().unwrap().to_string_lossy(), "rust uri+");
    /// # Ok::<_, uri_dissect::ParseError>(())
    /// ```
    #[must_use]
    pub const fn plus_as_space(mut self, yes: bool) -> Self {
        self.plus_as_space = yes;
        self
    }

    /// Splits a query string as it is, without normalizing it.
    ///
    /// # Errors
    ///
    /// Returns `Err` with [`ErrorKind::Syntax`] if a `'%'` is not followed
    /// by two hexadecimal digits.
    ///
    /// [`ErrorKind::Syntax`]: crate::ErrorKind::Syntax
    pub fn split<'a>(&self, s: &'a str) -> Result<QueryList<&'a str>, ParseError> {
        match scan::check_pct_encoded(s.as_bytes()) {
            Ok(()) => Ok(self.split_validated(s)),
            Err(e) => {
                debug!("rejected query {:?}: {}", s, e);
                Err(e)
            }
        }
    }

    /// Normalizes a query string and splits it.
    ///
    /// Every percent-encoded octet that encodes an unreserved character
    /// is decoded, and the hexadecimal digits of every other one are
    /// uppercased. Separators that are percent-encoded stay encoded
    /// and never split a pair.
    ///
    /// # Errors
    ///
    /// Returns `Err` with [`ErrorKind::Syntax`] if a `'%'` is not followed
    /// by two hexadecimal digits.
    ///
    /// [`ErrorKind::Syntax`]: crate::ErrorKind::Syntax
    pub fn parse(&self, s: &str) -> Result<QueryList<String>, ParseError> {
        if let Err(e) = scan::check_pct_encoded(s.as_bytes()) {
            debug!("rejected query {:?}: {}", s, e);
            return Err(e);
        }

        let mut buf = String::with_capacity(s.len());
        pct_enc::normalize_into(&mut buf, s, false);
        let pairs = self.split_ranges(&buf);

        trace!("split query {:?} into {} pairs", buf, pairs.len());
        Ok(QueryList {
            val: buf,
            pairs,
            plus_as_space: self.plus_as_space,
        })
    }

    /// Splits a query string whose percent-encoded octets are known to be well-formed.
    pub(crate) fn split_validated<'a>(&self, s: &'a str) -> QueryList<&'a str> {
        QueryList {
            val: s,
            pairs: self.split_ranges(s),
            plus_as_space: self.plus_as_space,
        }
    }

    fn split_ranges(&self, s: &str) -> Vec<PairMeta> {
        let semicolon = self.semicolon;
        let mut pairs = Vec::new();
        let mut start = 0;

        for pair in s.split(|c| c == '&' || (semicolon && c == ';')) {
            let end = start + pair.len();
            if !pair.is_empty() {
                pairs.push(match pair.find('=') {
                    Some(i) => PairMeta {
                        key: ByteRange::new(start, start + i),
                        value: Some(ByteRange::new(start + i + 1, end)),
                    },
                    None => PairMeta {
                        key: ByteRange::new(start, end),
                        value: None,
                    },
                });
            }
            // Skip the separator.
            start = end + 1;
        }
        pairs
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PairMeta {
    key: ByteRange,
    value: Option<ByteRange>,
}

/// A key-value pair of a query.
///
/// The key and the value are slices of the query string and remain
/// percent-encoded. Use [`decode_key`] and [`decode_value`] to decode them.
///
/// [`decode_key`]: Self::decode_key
/// [`decode_value`]: Self::decode_value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QueryPair<'a> {
    key: &'a str,
    value: Option<&'a str>,
    plus_as_space: bool,
}

impl<'a> QueryPair<'a> {
    /// Returns the key.
    #[must_use]
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Returns the value.
    ///
    /// `None` means that the pair has no `'='`,
    /// while `Some("")` means that the value is empty.
    #[must_use]
    pub fn value(&self) -> Option<&'a str> {
        self.value
    }

    /// Decodes the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let list = uri_dissect::parse_query("a%20b=c%26d")?;
    /// let pair = list.get(0).unwrap();
    ///
    /// assert_eq!(pair.decode_key().to_string_lossy(), "a b");
    /// assert_eq!(pair.decode_value().unwrap().to_string_lossy(), "c&d");
    /// # Ok::<_, uri_dissect::ParseError>(())
    /// ```
    pub fn decode_key(&self) -> Decode<'a> {
        Decode::new(self.key).plus_as_space(self.plus_as_space)
    }

    /// Decodes the value, if any.
    #[must_use]
    pub fn decode_value(&self) -> Option<Decode<'a>> {
        self.value
            .map(|v| Decode::new(v).plus_as_space(self.plus_as_space))
    }
}

#[cfg(feature = "serde")]
impl Serialize for QueryPair<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("QueryPair", 2)?;
        state.serialize_field("key", self.key)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// An ordered list of query pairs, along with the query string they are sliced from.
///
/// This struct is created by [`QuerySplitter`], [`crate::parse_query`]
/// and [`ParsedUri::query_pairs`].
///
/// [`ParsedUri::query_pairs`]: crate::ParsedUri::query_pairs
#[derive(Clone)]
pub struct QueryList<T> {
    val: T,
    pairs: Vec<PairMeta>,
    plus_as_space: bool,
}

impl<'i, 'o, T: BorrowOrShare<'i, 'o, str>> QueryList<T> {
    /// Returns the query string the pairs are sliced from.
    #[must_use]
    pub fn as_str(&'i self) -> &'o str {
        self.val.borrow_or_share()
    }

    /// Returns the pair at the given position.
    #[must_use]
    pub fn get(&'i self, index: usize) -> Option<QueryPair<'o>> {
        let s = self.as_str();
        self.pairs
            .get(index)
            .map(|meta| pair_at(s, meta, self.plus_as_space))
    }

    /// Returns the first pair with the given key, compared without decoding.
    #[must_use]
    pub fn get_first(&'i self, key: &str) -> Option<QueryPair<'o>> {
        self.iter().find(|pair| pair.key == key)
    }

    /// Returns an iterator over the pairs in source order.
    pub fn iter(&'i self) -> Pairs<'i, 'o> {
        Pairs {
            s: self.as_str(),
            metas: self.pairs.iter(),
            plus_as_space: self.plus_as_space,
        }
    }
}

impl<T> QueryList<T> {
    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Checks whether there is no pair.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn pair_at<'a>(s: &'a str, meta: &PairMeta, plus_as_space: bool) -> QueryPair<'a> {
    QueryPair {
        key: meta.key.slice(s),
        value: meta.value.map(|r| r.slice(s)),
        plus_as_space,
    }
}

impl<'a, T: Bos<str>> IntoIterator for &'a QueryList<T> {
    type Item = QueryPair<'a>;
    type IntoIter = Pairs<'a, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Bos<str>> fmt::Debug for QueryList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
impl<T: Bos<str>> Serialize for QueryList<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

/// An iterator over the pairs of a [`QueryList`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Pairs<'i, 'o> {
    s: &'o str,
    metas: slice::Iter<'i, PairMeta>,
    plus_as_space: bool,
}

impl<'o> Iterator for Pairs<'_, 'o> {
    type Item = QueryPair<'o>;

    fn next(&mut self) -> Option<Self::Item> {
        let (s, plus) = (self.s, self.plus_as_space);
        self.metas.next().map(|meta| pair_at(s, meta, plus))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.metas.size_hint()
    }
}

impl DoubleEndedIterator for Pairs<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (s, plus) = (self.s, self.plus_as_space);
        self.metas.next_back().map(|meta| pair_at(s, meta, plus))
    }
}

impl ExactSizeIterator for Pairs<'_, '_> {}

impl FusedIterator for Pairs<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use alloc::borrow::ToOwned;

    fn pairs<T: Bos<str>>(list: &QueryList<T>) -> Vec<(&str, Option<&str>)> {
        list.iter().map(|p| (p.key(), p.value())).collect()
    }

    #[test]
    fn separators() {
        let splitter = QuerySplitter::new();
        let list = splitter.split("a=1&b=2;c=3").unwrap();
        assert_eq!(
            pairs(&list),
            [("a", Some("1")), ("b", Some("2")), ("c", Some("3"))]
        );

        let list = splitter.semicolon(false).split("a=1&b=2;c=3").unwrap();
        assert_eq!(pairs(&list), [("a", Some("1")), ("b", Some("2;c=3"))]);
    }

    #[test]
    fn empty_pairs_skipped() {
        let list = QuerySplitter::new().split("&&a&;&b=&").unwrap();
        assert_eq!(pairs(&list), [("a", None), ("b", Some(""))]);

        let list = QuerySplitter::new().split("").unwrap();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn first_equals_sign() {
        let list = QuerySplitter::new().split("a==b=c&=d").unwrap();
        assert_eq!(pairs(&list), [("a", Some("=b=c")), ("", Some("d"))]);
    }

    #[test]
    fn ranges_follow_source() {
        let list = QuerySplitter::new().split("k1=v1&k2").unwrap();
        assert_eq!(
            list.pairs,
            [
                PairMeta {
                    key: ByteRange::new(0, 2),
                    value: Some(ByteRange::new(3, 5)),
                },
                PairMeta {
                    key: ByteRange::new(6, 8),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn parse_normalizes() {
        let list = QuerySplitter::new().parse("%7e=%2f&x=%26%3d").unwrap();
        assert_eq!(list.as_str(), "~=%2F&x=%26%3D");
        assert_eq!(pairs(&list), [("~", Some("%2F")), ("x", Some("%26%3D"))]);

        let pair = list.get(1).unwrap();
        assert_eq!(pair.decode_value().unwrap().to_string_lossy(), "&=");
    }

    #[test]
    fn bad_triplets() {
        let err = QuerySplitter::new().split("a=%zz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.index(), 2);

        let err = QuerySplitter::new().parse("a=1&b=%4").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.index(), 6);
    }

    #[test]
    fn plus_as_space() {
        let s = "a+b=c+d&e%2Bf=+";
        let list = QuerySplitter::new().split(s).unwrap();
        let pair = list.get(0).unwrap();
        assert_eq!(pair.key(), "a+b");
        assert_eq!(pair.decode_key().to_string_lossy(), "a+b");
        assert_eq!(pair.decode_value().unwrap().to_string_lossy(), "c+d");

        let list = QuerySplitter::new().plus_as_space(true).split(s).unwrap();
        assert_eq!(pairs(&list), [("a+b", Some("c+d")), ("e%2Bf", Some("+"))]);
        let decoded: Vec<_> = list
            .iter()
            .map(|p| {
                (
                    p.decode_key().to_string_lossy().into_owned(),
                    p.decode_value().map(|v| v.to_string_lossy().into_owned()),
                )
            })
            .collect();
        assert_eq!(
            decoded,
            [
                ("a b".to_owned(), Some("c d".to_owned())),
                ("e+f".to_owned(), Some(" ".to_owned())),
            ]
        );
    }

    #[test]
    fn lookup() {
        let list = QuerySplitter::new().split("a=1&b=2&a=3").unwrap();
        assert_eq!(list.get_first("a").unwrap().value(), Some("1"));
        assert_eq!(list.get_first("c"), None);
        assert_eq!(list.iter().rev().next().unwrap().value(), Some("3"));
        assert_eq!(list.iter().len(), 3);
    }
}
