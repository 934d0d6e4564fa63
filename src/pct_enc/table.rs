//! Byte classes of the URI grammar, written in the ABNF of RFC 3986.

use crate::pct_enc;

const PCT_BIT: u64 = 1 << b'%';

/// A set of ASCII bytes, plus a flag for percent-encoded octets.
///
/// `'%'` itself is never a member: its bit in the low word is the flag.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Table(u64, u64);

impl Table {
    const fn new(mut bytes: &[u8]) -> Self {
        let mut bits = 0u128;
        while let [x, rem @ ..] = bytes {
            assert!(*x < 128 && *x != b'%');
            bits |= 1u128 << *x;
            bytes = rem;
        }
        Self(bits as u64, (bits >> 64) as u64)
    }

    const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0, self.1 | other.1)
    }

    const fn pct_encoded(self) -> Self {
        Self(self.0 | PCT_BIT, self.1)
    }

    #[inline]
    pub(crate) const fn allows_ascii(self, x: u8) -> bool {
        match x {
            b'%' | 128.. => false,
            0..64 => self.0 >> x & 1 != 0,
            _ => self.1 >> (x - 64) & 1 != 0,
        }
    }

    #[inline]
    pub(crate) const fn allows_pct_encoded(self) -> bool {
        self.0 & PCT_BIT != 0
    }

    /// Checks that every byte is a member and every `'%'` starts a
    /// well-formed triplet, when triplets are allowed at all.
    pub(crate) const fn validate(self, s: &[u8]) -> bool {
        let mut i = 0;
        while i < s.len() {
            if s[i] == b'%' && self.allows_pct_encoded() {
                if i + 2 >= s.len() || !pct_enc::is_hexdig_pair(s[i + 1], s[i + 2]) {
                    return false;
                }
                i += 3;
            } else if self.allows_ascii(s[i]) {
                i += 1;
            } else {
                return false;
            }
        }
        true
    }
}

const ALPHA: Table = Table::new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");
const DIGIT: Table = Table::new(b"0123456789");
const SUB_DELIMS: Table = Table::new(b"!$&'()*+,;=");
const GEN_DELIMS: Table = Table::new(b":/?#[]@");

/// `HEXDIG`
pub(crate) const HEXDIG: Table = DIGIT.or(Table::new(b"ABCDEFabcdef"));

/// `ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub(crate) const UNRESERVED: Table = ALPHA.or(DIGIT).or(Table::new(b"-._~"));

/// `gen-delims / sub-delims`
pub(crate) const RESERVED: Table = GEN_DELIMS.or(SUB_DELIMS);

/// Trailing characters of a scheme; the first one must be `ALPHA`.
pub(crate) const SCHEME: Table = ALPHA.or(DIGIT).or(Table::new(b"+-."));

pub(crate) const USERINFO: Table = UNRESERVED.or(SUB_DELIMS).or(Table::new(b":")).pct_encoded();

/// Trailing characters of an IPvFuture literal, after `"v" 1*HEXDIG "."`.
pub(crate) const IPV_FUTURE: Table = UNRESERVED.or(SUB_DELIMS).or(Table::new(b":"));

pub(crate) const REG_NAME: Table = UNRESERVED.or(SUB_DELIMS).pct_encoded();

/// First segment of a relative-path reference: `pchar` without `":"`.
pub(crate) const SEGMENT_NZ_NC: Table = REG_NAME.or(Table::new(b"@"));

const PCHAR: Table = SEGMENT_NZ_NC.or(Table::new(b":"));

pub(crate) const PATH: Table = PCHAR.or(Table::new(b"/"));

pub(crate) const QUERY: Table = PATH.or(Table::new(b"?"));

pub(crate) const FRAGMENT: Table = QUERY;
