mod common;

use resdec::error::Error;
use resdec::stream::ByteCursor;
use resdec::string_pool::{StringPool, StyleSpan};

fn parse(bytes: &[u8], strict: bool) -> StringPool {
    let mut cursor = ByteCursor::new(bytes);
    let header = cursor.read_chunk_header().unwrap();
    StringPool::parse(&mut cursor, &header, strict).unwrap()
}

#[test]
fn utf8_pool_basic() {
    let bytes = common::string_pool(&["hello", "wörld"], true, &[]);
    let pool = parse(&bytes, true);

    assert_eq!(pool.len(), 2);
    assert!(pool.is_utf8());
    assert_eq!(pool.get(0), Some("hello"));
    assert_eq!(pool.get(1), Some("wörld"));
}

#[test]
fn utf16_pool_basic() {
    let bytes = common::string_pool(&["app_name", "héllo"], false, &[]);
    let pool = parse(&bytes, true);

    assert_eq!(pool.len(), 2);
    assert!(!pool.is_utf8());
    assert_eq!(pool.get(0), Some("app_name"));
    assert_eq!(pool.get(1), Some("héllo"));
}

#[test]
fn empty_pool_is_not_an_error() {
    let bytes = common::string_pool(&[], true, &[]);
    let pool = parse(&bytes, true);

    assert_eq!(pool.len(), 0);
    assert!(pool.is_empty());
    assert_eq!(pool.get(0), None);
}

#[test]
fn out_of_range_returns_sentinel_in_lenient_mode() {
    let bytes = common::string_pool(&["only"], true, &[]);
    let pool = parse(&bytes, true);

    assert_eq!(pool.get_checked(5, false).unwrap(), "");
}

#[test]
fn out_of_range_fails_in_strict_mode() {
    let bytes = common::string_pool(&["only"], true, &[]);
    let pool = parse(&bytes, true);

    match pool.get_checked(5, true) {
        Err(Error::StringPoolIndexOutOfRange { index, count }) => {
            assert_eq!(index, 5);
            assert_eq!(count, 1);
        }
        other => panic!("expected StringPoolIndexOutOfRange, got {other:?}"),
    }
}

#[test]
fn long_utf8_string_uses_extended_length() {
    let long = "A".repeat(0x1a5);
    let bytes = common::string_pool(&[&long], true, &[]);
    let pool = parse(&bytes, true);

    assert_eq!(pool.get(0), Some(long.as_str()));
}

#[test]
fn style_spans_are_preserved() {
    let bytes = common::string_pool(&["Hello World", "b"], true, &[vec![(1, 0, 4)]]);
    let pool = parse(&bytes, true);

    assert_eq!(
        pool.spans(0),
        &[StyleSpan {
            name: 1,
            first_char: 0,
            last_char: 4,
        }]
    );
    assert!(pool.spans(1).is_empty());
    assert_eq!(pool.get(1), Some("b"));
}

#[test]
fn parse_consumes_exactly_the_chunk() {
    let bytes = common::string_pool(&["a", "bb", "ccc"], false, &[]);
    let mut cursor = ByteCursor::new(&bytes);
    let header = cursor.read_chunk_header().unwrap();
    StringPool::parse(&mut cursor, &header, true).unwrap();

    assert_eq!(cursor.pos(), bytes.len() as u64);
}
