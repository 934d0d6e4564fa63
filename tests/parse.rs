use std::net::{Ipv4Addr, Ipv6Addr};

use uri_dissect::{component::Host, pct_enc::EStr, ErrorKind::*, *};

#[test]
fn parse_absolute() {
    let u = ParsedUri::parse("file:///etc/hosts").unwrap();
    assert_eq!(u.as_str(), "file:///etc/hosts");
    assert_eq!(u.scheme().unwrap().as_str(), "file");
    let a = u.authority().unwrap();
    assert_eq!(a.as_str(), "");
    assert_eq!(a.userinfo(), None);
    assert_eq!(a.host(), "");
    assert_eq!(a.host_parsed(), Host::RegName(EStr::EMPTY));
    assert_eq!(a.port(), None);
    assert_eq!(u.path().as_str(), "/etc/hosts");
    assert!(u.path().segments().eq(["etc", "hosts"]));
    assert_eq!(u.query(), None);
    assert_eq!(u.fragment(), None);

    let u = ParsedUri::parse("ftp://ftp.is.co.za/rfc/rfc1808.txt").unwrap();
    assert_eq!(u.scheme().unwrap().as_str(), "ftp");
    let a = u.authority().unwrap();
    assert_eq!(a.as_str(), "ftp.is.co.za");
    assert_eq!(a.userinfo(), None);
    assert_eq!(a.host(), "ftp.is.co.za");
    assert_eq!(
        a.host_parsed(),
        Host::RegName(EStr::new_or_panic("ftp.is.co.za"))
    );
    assert_eq!(a.port(), None);
    assert_eq!(u.path().as_str(), "/rfc/rfc1808.txt");
    assert!(u.path().segments().eq(["rfc", "rfc1808.txt"]));

    let u = ParsedUri::parse("ldap://[2001:db8::7]/c=GB?objectClass?one").unwrap();
    assert_eq!(u.scheme().unwrap().as_str(), "ldap");
    let a = u.authority().unwrap();
    assert_eq!(a.as_str(), "[2001:db8::7]");
    assert_eq!(a.host(), "[2001:db8::7]");
    assert_eq!(
        a.host_parsed(),
        Host::Ipv6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0x7))
    );
    assert_eq!(u.path().as_str(), "/c=GB");
    assert!(u.path().segments().eq(["c=GB"]));
    assert_eq!(u.query(), Some(EStr::new_or_panic("objectClass?one")));
    assert_eq!(u.fragment(), None);

    let u = ParsedUri::parse("mailto:John.Doe@example.com").unwrap();
    assert_eq!(u.scheme().unwrap().as_str(), "mailto");
    assert!(u.authority().is_none());
    assert_eq!(u.host(), None);
    assert_eq!(u.path().as_str(), "John.Doe@example.com");
    assert!(u.path().segments().eq(["John.Doe@example.com"]));
    assert!(!u.path().is_absolute());

    let u = ParsedUri::parse("tel:+1-816-555-1212").unwrap();
    assert_eq!(u.scheme().unwrap().as_str(), "tel");
    assert!(u.authority().is_none());
    assert_eq!(u.path().as_str(), "+1-816-555-1212");

    let u = ParsedUri::parse("telnet://192.0.2.16:80/").unwrap();
    assert_eq!(u.scheme().unwrap().as_str(), "telnet");
    let a = u.authority().unwrap();
    assert_eq!(a.as_str(), "192.0.2.16:80");
    assert_eq!(a.host(), "192.0.2.16");
    assert_eq!(a.host_parsed(), Host::Ipv4(Ipv4Addr::new(192, 0, 2, 16)));
    assert_eq!(a.port(), Some("80"));
    assert_eq!(a.port_to_u16(), Ok(Some(80)));
    assert_eq!(u.path().as_str(), "/");
    assert!(u.path().segments().eq(None::<&str>));
    assert!(!u.path().has_trailing_slash());

    let u = ParsedUri::parse("urn:oasis:names:specification:docbook:dtd:xml:4.1.2").unwrap();
    assert_eq!(u.scheme().unwrap().as_str(), "urn");
    assert_eq!(
        u.path().as_str(),
        "oasis:names:specification:docbook:dtd:xml:4.1.2"
    );

    let u = ParsedUri::parse("foo://example.com:8042/over/there?name=ferret#nose").unwrap();
    assert_eq!(u.scheme().unwrap().as_str(), "foo");
    let a = u.authority().unwrap();
    assert_eq!(a.as_str(), "example.com:8042");
    assert_eq!(a.port(), Some("8042"));
    assert_eq!(u.path().as_str(), "/over/there");
    assert_eq!(u.query(), Some(EStr::new_or_panic("name=ferret")));
    assert_eq!(u.fragment(), Some(EStr::new_or_panic("nose")));

    let u =
        ParsedUri::parse("ftp://cnn.example.com&story=breaking_news@10.0.0.1/top_story.htm")
            .unwrap();
    let a = u.authority().unwrap();
    assert_eq!(a.as_str(), "cnn.example.com&story=breaking_news@10.0.0.1");
    assert_eq!(
        a.userinfo(),
        Some(EStr::new_or_panic("cnn.example.com&story=breaking_news"))
    );
    assert_eq!(a.host(), "10.0.0.1");
    assert_eq!(a.host_parsed(), Host::Ipv4(Ipv4Addr::new(10, 0, 0, 1)));

    let u = ParsedUri::parse("http://[vFe.foo.bar]").unwrap();
    let a = u.authority().unwrap();
    assert_eq!(a.host(), "[vFe.foo.bar]");
    assert_eq!(a.host_parsed(), Host::IpvFuture);
    assert_eq!(u.path().as_str(), "");
    assert!(u.path().segments().eq(None::<&str>));

    let u = ParsedUri::parse("http://127.0.0.1:/").unwrap();
    let a = u.authority().unwrap();
    assert_eq!(a.as_str(), "127.0.0.1:");
    assert_eq!(a.host(), "127.0.0.1");
    assert_eq!(a.port(), None);
    assert_eq!(a.port_to_u16(), Ok(None));

    let u = ParsedUri::parse("http://127.0.0.1:8080/").unwrap();
    assert_eq!(u.port(), Some("8080"));

    let u = ParsedUri::parse("http://example.com:65536/").unwrap();
    let a = u.authority().unwrap();
    assert_eq!(a.port(), Some("65536"));
    assert!(a.port_to_u16().is_err());
}

#[test]
fn parse_relative() {
    let u = ParsedUri::parse("").err().unwrap();
    assert_eq!(u.kind(), NullInput);

    let u = ParsedUri::parse("foo.txt").unwrap();
    assert_eq!(u.scheme(), None);
    assert!(u.authority().is_none());
    assert_eq!(u.path().as_str(), "foo.txt");
    assert!(u.path().segments().eq(["foo.txt"]));

    let u = ParsedUri::parse(".").unwrap();
    assert_eq!(u.path().as_str(), ".");
    assert!(u.path().segments().eq(["."]));

    let u = ParsedUri::parse("./this:that").unwrap();
    assert_eq!(u.scheme(), None);
    assert_eq!(u.path().as_str(), "./this:that");
    assert!(u.path().segments().eq([".", "this:that"]));

    let u = ParsedUri::parse("//example.com").unwrap();
    assert_eq!(u.scheme(), None);
    let a = u.authority().unwrap();
    assert_eq!(a.as_str(), "example.com");
    assert_eq!(u.path().as_str(), "");

    let u = ParsedUri::parse("?query").unwrap();
    assert_eq!(u.path().as_str(), "");
    assert_eq!(u.query(), Some(EStr::new_or_panic("query")));
    assert_eq!(u.fragment(), None);

    let u = ParsedUri::parse("#fragment").unwrap();
    assert_eq!(u.path().as_str(), "");
    assert_eq!(u.query(), None);
    assert_eq!(u.fragment(), Some(EStr::new_or_panic("fragment")));

    let u = ParsedUri::parse("/a/b?c?d#e?f#").err().unwrap();
    assert_eq!(u.kind(), Syntax);
    assert_eq!(u.index(), 12);

    let u = ParsedUri::parse("/a/b?c?d#e?f").unwrap();
    assert_eq!(u.path().as_str(), "/a/b");
    assert_eq!(u.query(), Some(EStr::new_or_panic("c?d")));
    assert_eq!(u.fragment(), Some(EStr::new_or_panic("e?f")));
}

#[test]
fn parse_components() {
    let u = ParsedUri::parse("http://user@www.example.com:8080/a/b?x=1#frag").unwrap();
    assert_eq!(u.scheme().unwrap().as_str(), "http");
    assert_eq!(u.userinfo(), Some(EStr::new_or_panic("user")));
    assert_eq!(u.host(), Some("www.example.com"));
    assert_eq!(u.port(), Some("8080"));
    assert!(u.path().segments().eq(["a", "b"]));
    assert_eq!(u.query(), Some(EStr::new_or_panic("x=1")));
    assert_eq!(u.fragment(), Some(EStr::new_or_panic("frag")));

    let r = u.ranges();
    assert_eq!(r.scheme.unwrap().slice(u.as_str()), "http");
    assert_eq!(r.userinfo.unwrap().slice(u.as_str()), "user");
    assert_eq!(r.host.unwrap().slice(u.as_str()), "www.example.com");
    assert_eq!(r.port.unwrap().slice(u.as_str()), "8080");
    assert_eq!(r.path.slice(u.as_str()), "/a/b");
    assert_eq!(r.query.unwrap().slice(u.as_str()), "x=1");
    assert_eq!(r.fragment.unwrap().slice(u.as_str()), "frag");
}

#[test]
fn trailing_slash() {
    let u = ParsedUri::parse("http://h/a/").unwrap();
    assert!(u.path().has_trailing_slash());
    assert!(u.path().is_absolute());
    assert!(u.path().segments().eq(["a"]));
    assert_eq!(u.path().as_str(), "/a/");

    let u = ParsedUri::parse("http://h/a").unwrap();
    assert!(!u.path().has_trailing_slash());
    assert_eq!(u.path().as_str(), "/a");
}

#[test]
fn userinfo_up_to_last_at() {
    let u = ParsedUri::parse("http://a@b@c/").unwrap_err();
    assert_eq!(u.kind(), Syntax);
    assert_eq!(u.index(), 8);

    let u = ParsedUri::parse("http://a%40b@c/").unwrap();
    assert_eq!(u.userinfo(), Some(EStr::new_or_panic("a%40b")));
    assert_eq!(u.host(), Some("c"));
}

#[test]
fn parse_error() {
    // Empty scheme.
    let e = ParsedUri::parse(":hello").unwrap_err();
    assert_eq!(e.index(), 0);
    assert_eq!(e.kind(), Syntax);

    // Scheme starts with non-letter.
    let e = ParsedUri::parse("3ttp://a.com").unwrap_err();
    assert_eq!(e.index(), 4);
    assert_eq!(e.kind(), Syntax);

    // After rewriting the parser, the following two cases are interpreted as
    // containing colon in the first path segment of a relative reference.

    // Unexpected char in scheme.
    let e = ParsedUri::parse("exam=ple:foo").unwrap_err();
    assert_eq!(e.index(), 8);
    assert_eq!(e.kind(), Syntax);

    let e = ParsedUri::parse("(:").unwrap_err();
    assert_eq!(e.index(), 1);
    assert_eq!(e.kind(), Syntax);

    // Percent-encoded scheme.
    let e = ParsedUri::parse("a%20:foo").unwrap_err();
    assert_eq!(e.index(), 4);
    assert_eq!(e.kind(), Syntax);

    // Incomplete percent-encoded octet.
    let e = ParsedUri::parse("foo%xxd").unwrap_err();
    assert_eq!(e.index(), 3);
    assert_eq!(e.kind(), Syntax);

    // Non-hexadecimal percent-encoded octet.
    let e = ParsedUri::parse("http://h/%G1").unwrap_err();
    assert_eq!(e.index(), 9);
    assert_eq!(e.kind(), Syntax);

    // Truncated percent-encoded octet.
    let e = ParsedUri::parse("http://h/a?b=%2").unwrap_err();
    assert_eq!(e.index(), 13);
    assert_eq!(e.kind(), Syntax);

    // Space in path.
    let e = ParsedUri::parse("http://h/a b").unwrap_err();
    assert_eq!(e.index(), 10);
    assert_eq!(e.kind(), Syntax);

    // Non-numeric port.
    let e = ParsedUri::parse("http://h:8a/").unwrap_err();
    assert_eq!(e.index(), 10);
    assert_eq!(e.kind(), RangeInvalid);

    let e = ParsedUri::parse("http://[::1]:x").unwrap_err();
    assert_eq!(e.index(), 13);
    assert_eq!(e.kind(), RangeInvalid);

    // Colon in the host.
    let e = ParsedUri::parse("http://h:80:90/").unwrap_err();
    assert_eq!(e.index(), 11);
    assert_eq!(e.kind(), RangeInvalid);

    // Bad IP literals.
    let e = ParsedUri::parse("http://[::1/").unwrap_err();
    assert_eq!(e.kind(), Syntax);

    let e = ParsedUri::parse("http://[1:2:3:4:5:6:7]/").unwrap_err();
    assert_eq!(e.index(), 8);
    assert_eq!(e.kind(), Syntax);

    let e = ParsedUri::parse("http://[::1]x/").unwrap_err();
    assert_eq!(e.index(), 12);
    assert_eq!(e.kind(), Syntax);

    // Non-ASCII character.
    let e = ParsedUri::parse("http://example.com/caf\u{e9}").unwrap_err();
    assert_eq!(e.index(), 22);
    assert_eq!(e.kind(), NotImplemented);

    let e = ParsedUri::parse("http://\u{4f8b}.com/").unwrap_err();
    assert_eq!(e.index(), 7);
    assert_eq!(e.kind(), NotImplemented);
}

#[test]
fn strict_ip_addr() {
    let u = ParsedUri::parse("//127.0.0.001").unwrap();
    assert!(matches!(u.host_parsed(), Some(Host::RegName(_))));

    let u = ParsedUri::parse("//127.1").unwrap();
    assert!(matches!(u.host_parsed(), Some(Host::RegName(_))));

    let u = ParsedUri::parse("//127.00.00.1").unwrap();
    assert!(matches!(u.host_parsed(), Some(Host::RegName(_))));

    let u = ParsedUri::parse("//0x7f.0.0.1").unwrap();
    assert!(matches!(u.host_parsed(), Some(Host::RegName(_))));

    let u = ParsedUri::parse("//127.0.0.1").unwrap();
    assert!(matches!(u.host_parsed(), Some(Host::Ipv4(_))));
}

#[test]
fn borrowed_and_owned() {
    let s = String::from("http://example.com/path");
    let u = ParsedUri::parse(&s).unwrap();
    let owned = u.to_owned();
    assert_eq!(owned, u);
    assert_eq!(owned.borrow(), u);
    assert_eq!(owned.path(), "/path");
    assert_eq!(format!("{owned}"), "http://example.com/path");
    assert_eq!(owned.into_string(), s);
}
