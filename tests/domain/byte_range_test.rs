use dubrelay::domain::{ByteRange, RangeError, ResolvedRange};

#[test]
fn given_closed_range_when_parsing_then_start_and_end_are_kept() {
    let range = ByteRange::parse("bytes=0-99").unwrap();
    assert_eq!(
        range,
        ByteRange::From {
            start: 0,
            end: Some(99)
        }
    );
}

#[test]
fn given_open_ended_range_when_resolving_then_end_is_last_byte() {
    let range = ByteRange::parse("bytes=500-").unwrap();
    let resolved = range.resolve(1000).unwrap();
    assert_eq!(resolved, ResolvedRange { start: 500, end: 999 });
    assert_eq!(resolved.length(), 500);
}

#[test]
fn given_end_past_size_when_resolving_then_end_is_clamped() {
    let range = ByteRange::parse("bytes=10-5000").unwrap();
    let resolved = range.resolve(100).unwrap();
    assert_eq!(resolved.end, 99);
    assert_eq!(resolved.length(), 90);
}

#[test]
fn given_suffix_range_when_resolving_then_last_bytes_are_selected() {
    let range = ByteRange::parse("bytes=-10").unwrap();
    assert_eq!(range, ByteRange::Suffix(10));
    assert_eq!(
        range.resolve(100).unwrap(),
        ResolvedRange { start: 90, end: 99 }
    );
}

#[test]
fn given_suffix_longer_than_size_when_resolving_then_whole_object_is_selected() {
    let resolved = ByteRange::Suffix(1000).resolve(10).unwrap();
    assert_eq!(resolved, ResolvedRange { start: 0, end: 9 });
}

#[test]
fn given_start_past_end_of_object_when_resolving_then_unsatisfiable() {
    let range = ByteRange::parse("bytes=100-200").unwrap();
    assert_eq!(range.resolve(100), Err(RangeError::Unsatisfiable(100)));
}

#[test]
fn given_empty_object_when_resolving_then_unsatisfiable() {
    let range = ByteRange::parse("bytes=0-").unwrap();
    assert_eq!(range.resolve(0), Err(RangeError::Unsatisfiable(0)));
}

#[test]
fn given_malformed_headers_when_parsing_then_errors() {
    for raw in [
        "items=0-1",
        "bytes=",
        "bytes=-",
        "bytes=abc-10",
        "bytes=10-5",
        "bytes=0-1,4-5",
    ] {
        assert!(
            matches!(ByteRange::parse(raw), Err(RangeError::Malformed(_))),
            "expected {raw} to be rejected"
        );
    }
}

#[test]
fn given_parsed_range_when_rendering_header_then_matches_input() {
    for raw in ["bytes=0-99", "bytes=42-", "bytes=-7"] {
        assert_eq!(ByteRange::parse(raw).unwrap().to_header_value(), raw);
    }
}
