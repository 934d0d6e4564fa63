#![no_main]
use libfuzzer_sys::fuzz_target;
use uri_dissect::ParsedUri;

fuzz_target!(|data: &str| {
    let Ok(r) = ParsedUri::parse(data) else {
        return;
    };
    let mut buf = String::with_capacity(data.len());
    if let Some(s) = r.scheme() {
        buf.push_str(s.as_str());
        buf.push(':');
    }
    if let Some(a) = r.authority() {
        buf.push_str("//");
        let start = buf.len();
        if let Some(ui) = a.userinfo() {
            buf.push_str(ui.as_str());
            buf.push('@');
        }
        buf.push_str(a.host());
        if let Some(p) = a.port() {
            buf.push(':');
            buf.push_str(p);
        } else if a.as_str().ends_with(':') {
            // Empty port.
            buf.push(':');
        }
        assert_eq!(&buf[start..], a.as_str());
    }

    let path = r.path();
    if path.is_absolute() {
        buf.push('/');
    }
    for (i, seg) in path.segments().enumerate() {
        if i > 0 {
            buf.push('/');
        }
        buf.push_str(seg.as_str());
    }
    if path.has_trailing_slash() {
        buf.push('/');
    }

    if let Some(q) = r.query() {
        buf.push('?');
        buf.push_str(q.as_str());
    }
    if let Some(f) = r.fragment() {
        buf.push('#');
        buf.push_str(f.as_str());
    }
    assert_eq!(data, buf);
});
