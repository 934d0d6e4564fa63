//! Syntax-based normalization.

use crate::{
    component::{ByteRange, Scheme},
    log::trace,
    parse,
    pct_enc,
    uri::{AuthMeta, HostMeta, Meta},
    ParsedUri,
};
use alloc::{string::String, vec::Vec};
use borrow_or_share::Bos;
use core::fmt;

/// A configurable URI normalizer.
///
/// Normalization lowercases the scheme and the host, brings every
/// percent-encoded octet to normal form, removes dot segments from the path
/// and elides a port equal to the default port of the scheme.
///
/// # Examples
///
/// ```
/// use uri_dissect::{component::Scheme, normalize::Normalizer, ParsedUri};
///
/// fn no_default_port(_: &Scheme) -> Option<u16> {
///     None
/// }
///
/// let uri = ParsedUri::parse("HTTP://Example.COM:80/%7euser")?;
///
/// assert_eq!(uri.normalize(), "http://example.com/~user");
///
/// let normalizer = Normalizer::new().default_port_with(no_default_port);
/// assert_eq!(uri.normalize_with(&normalizer), "http://example.com:80/~user");
/// # Ok::<_, uri_dissect::ParseError>(())
/// ```
#[derive(Clone, Copy)]
pub struct Normalizer {
    default_port_f: fn(&Scheme) -> Option<u16>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

impl Normalizer {
    /// Creates a new `Normalizer` with default configuration.
    ///
    /// Default ports are looked up with [`Scheme::default_port`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_port_f: Scheme::default_port,
        }
    }

    /// Sets the function with which to get the default port of a scheme.
    ///
    /// A port is elided only when the function returns `Some` port equal to it.
    #[must_use]
    pub fn default_port_with(mut self, f: fn(&Scheme) -> Option<u16>) -> Self {
        self.default_port_f = f;
        self
    }

    /// Normalizes the given URI reference.
    #[must_use]
    pub fn normalize<T: Bos<str>>(&self, uri: &ParsedUri<T>) -> ParsedUri<String> {
        let (s, meta) = uri.parts();
        let mut buf = String::with_capacity(s.len());
        let mut out = Meta::default();

        let mut default_port = None;
        if let Some(r) = meta.scheme {
            let scheme = r.slice(s);
            default_port = (self.default_port_f)(Scheme::new_validated(scheme));

            buf.push_str(scheme);
            buf.make_ascii_lowercase();
            out.scheme = Some(ByteRange::new(0, buf.len()));
            buf.push(':');
        }

        if let Some(auth) = meta.auth {
            buf.push_str("//");
            out.auth = Some(normalize_authority(&mut buf, s, auth, default_port));
        }

        let path_start = buf.len();
        let mut path = String::with_capacity(meta.path.len());
        pct_enc::normalize_into(&mut path, meta.path.slice(s), false);
        let path = remove_dot_segments(&path);

        if buf.is_empty() && path.is_empty() && meta.query.is_none() && meta.fragment.is_none() {
            // An empty reference does not parse.
            buf.push_str("./");
        } else if out.auth.is_none() && path.starts_with("//") {
            // Keep the path from being read as an authority.
            buf.push_str("/.");
        } else if out.scheme.is_none()
            && !path.starts_with('/')
            && path.split('/').next().is_some_and(|seg| seg.contains(':'))
        {
            // Keep the first segment from being read as a scheme.
            buf.push_str("./");
        }
        buf.push_str(&path);
        out.path = ByteRange::new(path_start, buf.len());

        if let Some(r) = meta.query {
            buf.push('?');
            let start = buf.len();
            pct_enc::normalize_into(&mut buf, r.slice(s), false);
            out.query = Some(ByteRange::new(start, buf.len()));
        }

        if let Some(r) = meta.fragment {
            buf.push('#');
            let start = buf.len();
            pct_enc::normalize_into(&mut buf, r.slice(s), false);
            out.fragment = Some(ByteRange::new(start, buf.len()));
        }

        trace!("normalized {:?} into {:?}", s, buf);
        ParsedUri::from_parts(buf, out)
    }
}

fn normalize_authority(
    buf: &mut String,
    s: &str,
    auth: AuthMeta,
    default_port: Option<u16>,
) -> AuthMeta {
    let start = buf.len();

    let userinfo = auth.userinfo.map(|r| {
        let userinfo_start = buf.len();
        pct_enc::normalize_into(buf, r.slice(s), false);
        let userinfo = ByteRange::new(userinfo_start, buf.len());
        buf.push('@');
        userinfo
    });

    let host_start = buf.len();
    let host = auth.host.slice(s);
    let host_meta = match auth.host_meta {
        HostMeta::Ipv4(_) => {
            buf.push_str(host);
            auth.host_meta
        }
        HostMeta::Ipv6(_) | HostMeta::IpvFuture => {
            buf.push_str(host);
            buf[host_start..].make_ascii_lowercase();
            auth.host_meta
        }
        HostMeta::RegName => {
            pct_enc::normalize_into(buf, host, true);
            if buf.len() - host_start == host.len() {
                HostMeta::RegName
            } else {
                // Decoding may have revealed a dotted-quad.
                parse::classify_reg_name(buf[host_start..].as_bytes())
            }
        }
    };
    let host = ByteRange::new(host_start, buf.len());

    let port = auth.port.and_then(|r| {
        let port = r.slice(s);
        if default_port.is_some() && port.parse::<u16>().ok() == default_port {
            return None;
        }
        buf.push(':');
        let port_start = buf.len();
        buf.push_str(port);
        Some(ByteRange::new(port_start, buf.len()))
    });

    AuthMeta {
        bounds: ByteRange::new(start, buf.len()),
        userinfo,
        host,
        host_meta,
        port,
    }
}

/// Removes dot segments from a path.
///
/// A `".."` segment removes the segment before it. With nothing to remove,
/// it is dropped from an absolute path and kept in a relative one.
/// A final `"."` or removing `".."` leaves a trailing slash.
/// A relative result whose first segment is empty is prefixed with `"./"`.
pub(crate) fn remove_dot_segments(path: &str) -> String {
    let (absolute, rel) = match path.strip_prefix('/') {
        Some(rel) => (true, rel),
        None => (false, path),
    };

    let mut stack: Vec<&str> = Vec::new();
    let mut segs = rel.split('/').peekable();

    while let Some(seg) = segs.next() {
        let last = segs.peek().is_none();
        match seg {
            "." => {
                if last {
                    stack.push("");
                }
            }
            ".." => {
                if stack.last().is_some_and(|&top| top != "..") {
                    stack.pop();
                } else if !absolute {
                    stack.push("..");
                    continue;
                }
                if last {
                    stack.push("");
                }
            }
            _ => stack.push(seg),
        }
    }

    let mut buf = String::with_capacity(path.len());
    if absolute {
        buf.push('/');
    } else if stack.len() > 1 && stack[0].is_empty() {
        buf.push_str("./");
    }
    for (i, seg) in stack.iter().enumerate() {
        if i > 0 {
            buf.push('/');
        }
        buf.push_str(seg);
    }
    buf
}
