//! Edge case integration tests for the TNET decoder.
//!
//! - **Boundaries**: zero-length payloads for every type and leading zeros
//!   in the size prefix.
//! - **Malformed grammar**: bad size bytes, empty or overlong prefixes,
//!   unknown tags, payloads that do not fit their tag. Every failure must
//!   carry the absolute byte offset of the problem.
//! - **Limits**: `DecoderOptions` depth and size caps.
//! - **Trailing data**: one-shot decode rejects bytes after the value.

use tnet_decoder::{DecodeError, DecoderOptions, TnetDecoder};
use tnet_encoder::encode;
use tnet_tests::nested;
use tnet_types::{TnetValue, TypeError};
use tnet_wire::{Tag, WireError, MAX_SIZE_DIGITS};

// ── Boundaries ────────────────────────────────────────────────────────────────

#[test]
fn zero_length_payloads() {
    assert_eq!(TnetDecoder::decode(b"0:,").unwrap(), TnetValue::from(""));
    assert_eq!(TnetDecoder::decode(b"0:]").unwrap(), TnetValue::List(vec![]));
    assert_eq!(TnetDecoder::decode(b"0:}").unwrap(), TnetValue::dict::<&str, _>([]));
    assert_eq!(TnetDecoder::decode(b"0:~").unwrap(), TnetValue::Null);
}

#[test]
fn zero_length_scalars_are_malformed() {
    assert!(matches!(
        TnetDecoder::decode(b"0:#"),
        Err(DecodeError::Type { source: TypeError::InvalidInteger { .. }, .. })
    ));
    assert!(matches!(
        TnetDecoder::decode(b"0:!"),
        Err(DecodeError::Type { source: TypeError::InvalidBoolean { .. }, .. })
    ));
}

#[test]
fn leading_zeros_in_size_are_accepted() {
    assert_eq!(TnetDecoder::decode(b"003:abc,").unwrap(), TnetValue::from("abc"));
}

// ── Malformed grammar ─────────────────────────────────────────────────────────

#[test]
fn bad_size_byte_reports_offset() {
    let err = TnetDecoder::decode(b"12x:").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Wire(WireError::InvalidSizeByte { byte: b'x', offset: 2 })
    ));
    assert!(err.is_malformed());
}

#[test]
fn empty_size_prefix() {
    assert!(matches!(
        TnetDecoder::decode(b":abc,"),
        Err(DecodeError::Wire(WireError::EmptySize { offset: 0 }))
    ));
}

#[test]
fn overlong_size_prefix() {
    let digits = "1".repeat(MAX_SIZE_DIGITS + 1);
    let err = TnetDecoder::decode(digits.as_bytes()).unwrap_err();
    assert!(matches!(err, DecodeError::Wire(WireError::SizeTooLong { .. })));
}

#[test]
fn unknown_tag_reports_offset() {
    for bad in [b'?', b'x', b'\0', b'{', b'['] {
        let mut input = b"1:a".to_vec();
        input.push(bad);
        let err = TnetDecoder::decode(&input).unwrap_err();
        assert!(
            matches!(err, DecodeError::Wire(WireError::UnknownTag { byte, offset: 3 }) if byte == bad),
            "tag {bad:#04x}: {err:?}"
        );
    }
}

#[test]
fn every_tag_byte_is_recognised() {
    for tag in Tag::ALL {
        assert_eq!(Tag::from_byte(tag.to_byte(), 0).unwrap(), tag);
    }
}

#[test]
fn non_string_dict_key_points_at_the_key() {
    // Payload starts at offset 3; the integer key is the third element.
    let err = TnetDecoder::decode(b"16:1:a,1:1#1:2#1:b,}").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Type { source: TypeError::NonStringKey { found: Tag::Integer }, offset: 11 }
    ));
}

#[test]
fn container_payload_ending_inside_element() {
    // The list declares 5 payload bytes but its element needs 7.
    let err = TnetDecoder::decode(b"5:4:abc]").unwrap_err();
    assert!(matches!(err, DecodeError::TruncatedElement { offset: 2 }));
}

#[test]
fn integer_overflow_is_malformed() {
    assert!(matches!(
        TnetDecoder::decode(b"19:9223372036854775808#"),
        Err(DecodeError::Type { source: TypeError::InvalidInteger { .. }, offset: 3 })
    ));
}

// ── Limits ────────────────────────────────────────────────────────────────────

#[test]
fn depth_limit() {
    let value = nested(1, 10);
    let bytes = encode(&value).unwrap();

    let tight = DecoderOptions { max_depth: 5, ..DecoderOptions::default() };
    assert!(matches!(
        TnetDecoder::decode_with(&bytes, tight),
        Err(DecodeError::TooDeep { .. })
    ));

    let roomy = DecoderOptions { max_depth: 11, ..DecoderOptions::default() };
    assert_eq!(TnetDecoder::decode_with(&bytes, roomy).unwrap(), value);
}

#[test]
fn size_limit_fires_on_the_prefix() {
    let options = DecoderOptions { max_size: 4, ..DecoderOptions::default() };
    // Only the prefix is present: the limit does not wait for the payload.
    assert!(matches!(
        TnetDecoder::decode_with(b"5:", options),
        Err(DecodeError::SizeLimit { size: 5, limit: 4, offset: 0 })
    ));
    assert_eq!(
        TnetDecoder::decode_with(b"4:abcd,", options).unwrap(),
        TnetValue::from("abcd")
    );
}

// ── Trailing data ─────────────────────────────────────────────────────────────

#[test]
fn trailing_data_after_value() {
    let err = TnetDecoder::decode(b"1:a,xyz").unwrap_err();
    assert!(matches!(err, DecodeError::TrailingData { extra_bytes: 3, offset: 4 }));
}

#[test]
fn non_utf8_string_decodes_but_has_no_text() {
    let value = TnetDecoder::decode(b"2:\xC3\x28,").unwrap();
    assert_eq!(value.as_bytes(), Some(&[0xC3, 0x28][..]));
    assert!(matches!(value.as_str(), Err(TypeError::InvalidUtf8 { valid_up_to: 0 })));
}
