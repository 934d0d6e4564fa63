use crate::{
    component::ByteRange,
    error::{ErrorKind, ParseError},
    pct_enc::{
        self,
        table::{FRAGMENT, HEXDIG, IPV_FUTURE, PATH, QUERY, REG_NAME, SCHEME, SEGMENT_NZ_NC, USERINFO},
    },
    scan::{Result, Scanner},
    uri::{AuthMeta, HostMeta, Meta},
};
use core::{
    net::{Ipv4Addr, Ipv6Addr},
    ops::{Deref, DerefMut},
};

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError::new($index, ErrorKind::$kind))
    };
}

/// Parses a URI reference, returning the boundaries of its components.
///
/// `bytes` must be valid UTF-8 and non-empty.
pub(crate) fn parse(bytes: &[u8]) -> Result<Meta> {
    let mut parser = Parser {
        scanner: Scanner::new(bytes),
        out: Meta::default(),
    };
    parser.run()?;
    Ok(parser.out)
}

/// URI reference parser.
///
/// # Preconditions and guarantees
///
/// Before parsing, ensure that the scanner is at position 0, `out` is
/// default initialized and the input is valid UTF-8.
///
/// Start and finish parsing by calling `run`.
/// The following are guaranteed when parsing succeeds:
///
/// - All output ranges are within bounds, correctly ordered
///   and on the boundary of a UTF-8 code point.
/// - All components defined by output ranges are validated.
struct Parser<'a> {
    scanner: Scanner<'a>,
    out: Meta,
}

impl<'a> Deref for Parser<'a> {
    type Target = Scanner<'a>;

    fn deref(&self) -> &Self::Target {
        &self.scanner
    }
}

impl DerefMut for Parser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scanner
    }
}

/// States of the parser.
///
/// `Start -> Authority? -> Path -> Query? -> Fragment? -> Done`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Start,
    Authority,
    Path(PathKind),
    Query,
    Fragment,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PathKind {
    /// After a scheme without authority.
    General,
    /// After an authority: empty or starting with `'/'`.
    AbEmpty,
    /// A relative reference: the first segment must not contain `':'`.
    NoScheme,
}

enum Seg {
    // *1":" 1*4HEXDIG
    Normal(u16, bool),
    // "::"
    Ellipsis,
    // *1":" 1*4HEXDIG "."
    MaybeV4(bool),
    // ":"
    SingleColon,
}

impl Parser<'_> {
    fn run(&mut self) -> Result<()> {
        let mut state = State::Start;
        while state != State::Done {
            state = match state {
                State::Start => self.parse_start()?,
                State::Authority => self.parse_authority()?,
                State::Path(kind) => self.parse_path(kind)?,
                State::Query => self.parse_query()?,
                State::Fragment => self.parse_fragment()?,
                State::Done => State::Done,
            };
        }
        Ok(())
    }

    /// Recognizes the scheme, or falls back to a relative reference.
    fn parse_start(&mut self) -> Result<State> {
        self.read(SCHEME)?;

        if self.pos() > 0 && self.peek(0) == Some(b':') && self.bytes()[0].is_ascii_alphabetic() {
            self.out.scheme = Some(ByteRange::new(0, self.pos()));
            // INVARIANT: Skipping ":" is fine.
            self.skip(1);
            return Ok(if self.read_str("//") {
                State::Authority
            } else {
                State::Path(PathKind::General)
            });
        }

        // Not a scheme: reread everything as a relative reference.
        self.scanner = Scanner::new(self.bytes());
        Ok(if self.read_str("//") {
            State::Authority
        } else {
            State::Path(PathKind::NoScheme)
        })
    }

    fn parse_authority(&mut self) -> Result<State> {
        let start = self.pos();
        let rem = &self.bytes()[start..];
        let end = start
            + rem
                .iter()
                .position(|x| matches!(x, b'/' | b'?' | b'#'))
                .unwrap_or(rem.len());

        let mut auth = AuthMeta {
            bounds: ByteRange::new(start, end),
            userinfo: None,
            host: ByteRange::default(),
            host_meta: HostMeta::RegName,
            port: None,
        };

        // Userinfo extends up to the last '@' of the authority.
        if let Some(i) = self.bytes()[start..end].iter().rposition(|&x| x == b'@') {
            let userinfo_end = start + i;
            self.read(USERINFO)?;
            if self.pos() != userinfo_end {
                return Err(self.unexpected());
            }
            auth.userinfo = Some(ByteRange::new(start, userinfo_end));
            // INVARIANT: Skipping "@" is fine.
            self.skip(1);
        }

        let host_start = self.pos();
        auth.host_meta = self.read_host()?;
        auth.host = ByteRange::new(host_start, self.pos());

        if self.read_str(":") {
            let port_start = self.pos();
            self.read_digits();
            if self.pos() != end {
                err!(self.pos(), RangeInvalid);
            }
            if self.pos() > port_start {
                auth.port = Some(ByteRange::new(port_start, self.pos()));
            }
        }

        if self.pos() != end {
            return Err(self.unexpected());
        }

        self.out.auth = Some(auth);
        Ok(State::Path(PathKind::AbEmpty))
    }

    fn parse_path(&mut self, kind: PathKind) -> Result<State> {
        let start = self.pos();

        if kind == PathKind::NoScheme {
            self.read(SEGMENT_NZ_NC)?;
            if self.peek(0) == Some(b':') {
                // In a relative reference, the first path
                // segment cannot contain a colon character.
                return Err(self.unexpected());
            }
        }
        self.read(PATH)?;
        self.out.path = ByteRange::new(start, self.pos());

        self.next_after(true)
    }

    fn parse_query(&mut self) -> Result<State> {
        let start = self.pos();
        self.read(QUERY)?;
        self.out.query = Some(ByteRange::new(start, self.pos()));
        self.next_after(false)
    }

    fn parse_fragment(&mut self) -> Result<State> {
        let start = self.pos();
        self.read(FRAGMENT)?;
        self.out.fragment = Some(ByteRange::new(start, self.pos()));

        if self.has_remaining() {
            return Err(self.unexpected());
        }
        Ok(State::Done)
    }

    /// Picks the state following a path or a query.
    fn next_after(&mut self, allow_query: bool) -> Result<State> {
        if allow_query && self.read_str("?") {
            Ok(State::Query)
        } else if self.read_str("#") {
            Ok(State::Fragment)
        } else if self.has_remaining() {
            Err(self.unexpected())
        } else {
            Ok(State::Done)
        }
    }

    fn read_host(&mut self) -> Result<HostMeta> {
        match self.read_ip_literal()? {
            Some(host) => Ok(host),
            None => self.read_v4_or_reg_name(),
        }
    }

    fn read_v4_or_reg_name(&mut self) -> Result<HostMeta> {
        Ok(match (self.read_v4(), self.read(REG_NAME)?) {
            (Some(addr), false) => HostMeta::Ipv4(addr.into()),
            _ => HostMeta::RegName,
        })
    }

    fn read_ip_literal(&mut self) -> Result<Option<HostMeta>> {
        if !self.read_str("[") {
            return Ok(None);
        }

        let start = self.pos();

        let meta = if let Some(addr) = self.read_v6() {
            HostMeta::Ipv6(Ipv6Addr::from(addr))
        } else if self.pos() == start {
            self.read_ipv_future()?;
            HostMeta::IpvFuture
        } else {
            err!(start, Syntax);
        };

        if !self.read_str("]") {
            return Err(self.unexpected());
        }
        Ok(Some(meta))
    }

    fn read_ipv_future(&mut self) -> Result<()> {
        if let Some(b'v' | b'V') = self.peek(0) {
            // INVARIANT: Skipping "v" or "V" is fine.
            self.skip(1);
            if self.read(HEXDIG)? && self.read_str(".") && self.read(IPV_FUTURE)? {
                return Ok(());
            }
        }
        Err(self.unexpected())
    }
}

impl Scanner<'_> {
    fn read_v6(&mut self) -> Option<[u16; 8]> {
        let mut segs = [0; 8];
        let mut ellipsis_idx = 8;

        let mut i = 0;
        while i < 8 {
            match self.read_v6_segment() {
                Some(Seg::Normal(seg, colon)) => {
                    if colon == (i == 0 || i == ellipsis_idx) {
                        // Leading colon, triple colons, or no colon.
                        return None;
                    }
                    segs[i] = seg;
                    i += 1;
                }
                Some(Seg::Ellipsis) => {
                    if ellipsis_idx != 8 {
                        // Multiple ellipses.
                        return None;
                    }
                    ellipsis_idx = i;
                }
                Some(Seg::MaybeV4(colon)) => {
                    if i > 6 || colon == (i == ellipsis_idx) {
                        // Not enough space, triple colons, or no colon.
                        return None;
                    }
                    let octets = self.read_v4()?.to_be_bytes();
                    segs[i] = u16::from_be_bytes([octets[0], octets[1]]);
                    segs[i + 1] = u16::from_be_bytes([octets[2], octets[3]]);
                    i += 2;
                    break;
                }
                Some(Seg::SingleColon) => return None,
                None => break,
            }
        }

        if ellipsis_idx == 8 {
            // No ellipsis.
            if i != 8 {
                // Too short.
                return None;
            }
        } else if i == 8 {
            // Eliding nothing.
            return None;
        } else {
            // Shift the segments after the ellipsis to the right.
            for j in (ellipsis_idx..i).rev() {
                segs[8 - (i - j)] = segs[j];
                segs[j] = 0;
            }
        }

        Some(segs)
    }

    fn read_v6_segment(&mut self) -> Option<Seg> {
        let colon = self.read_str(":");
        let first = match self.peek(0) {
            Some(x) => x,
            None => return colon.then_some(Seg::SingleColon),
        };

        let mut x = match pct_enc::decode_hexdigit(first) {
            Some(v) => v as u16,
            None => {
                return colon.then(|| {
                    if first == b':' {
                        // INVARIANT: Skipping ":" is fine.
                        self.skip(1);
                        Seg::Ellipsis
                    } else {
                        Seg::SingleColon
                    }
                });
            }
        };
        let mut i = 1;

        while i < 4 {
            let Some(b) = self.peek(i) else {
                // INVARIANT: Skipping `i` hexadecimal digits is fine.
                self.skip(i);
                return None;
            };
            match pct_enc::decode_hexdigit(b) {
                Some(v) => {
                    x = (x << 4) | v as u16;
                    i += 1;
                }
                None if b == b'.' => return Some(Seg::MaybeV4(colon)),
                None => break,
            }
        }
        // INVARIANT: Skipping `i` hexadecimal digits is fine.
        self.skip(i);
        Some(Seg::Normal(x, colon))
    }

    fn read_v4(&mut self) -> Option<u32> {
        let mut addr = self.read_v4_octet()? << 24;
        for i in (0..3).rev() {
            if !self.read_str(".") {
                return None;
            }
            addr |= self.read_v4_octet()? << (i * 8);
        }
        Some(addr)
    }

    fn read_v4_octet(&mut self) -> Option<u32> {
        let mut res = self.peek_digit(0)?;
        if res == 0 {
            // INVARIANT: Skipping "0" is fine.
            self.skip(1);
            return Some(0);
        }

        for i in 1..3 {
            let Some(x) = self.peek_digit(i) else {
                // INVARIANT: Skipping `i` digits is fine.
                self.skip(i);
                return Some(res);
            };
            res = res * 10 + x;
        }
        // INVARIANT: Skipping 3 digits is fine.
        self.skip(3);

        u8::try_from(res).is_ok().then_some(res)
    }

    fn peek_digit(&self, i: usize) -> Option<u32> {
        self.peek(i).and_then(|x| (x as char).to_digit(10))
    }
}

/// Classifies a host that has been validated as a `reg-name`.
pub(crate) fn classify_reg_name(bytes: &[u8]) -> HostMeta {
    let mut scanner = Scanner::new(bytes);
    match scanner.read_v4() {
        Some(addr) if !scanner.has_remaining() => HostMeta::Ipv4(Ipv4Addr::from(addr)),
        _ => HostMeta::RegName,
    }
}
