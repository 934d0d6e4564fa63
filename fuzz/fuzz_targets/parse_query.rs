#![no_main]
use libfuzzer_sys::fuzz_target;
use uri_dissect::query::QuerySplitter;

fuzz_target!(|data: &str| {
    let Ok(raw) = QuerySplitter::new().split(data) else {
        assert!(uri_dissect::parse_query(data).is_err());
        return;
    };
    let normalized = uri_dissect::parse_query(data).unwrap();

    assert_eq!(raw.len(), normalized.len());
    for (a, b) in raw.iter().zip(&normalized) {
        assert!(!a.key().is_empty() || a.value().is_some());
        assert_eq!(a.decode_key().to_bytes(), b.decode_key().to_bytes());
        assert_eq!(
            a.decode_value().map(|v| v.to_bytes().into_owned()),
            b.decode_value().map(|v| v.to_bytes().into_owned())
        );
    }

    // Normalized pairs are stable under another round.
    let again = uri_dissect::parse_query(normalized.as_str()).unwrap();
    assert_eq!(again.as_str(), normalized.as_str());
});
