#![no_main]

use std::collections::BTreeMap;

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use tnet_decoder::TnetDecoder;
use tnet_encoder::{encode, TnetEncoder};
use tnet_types::TnetValue;

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Vec<u8>),
    List(Vec<FuzzValue>),
    Dict(Vec<(Vec<u8>, FuzzValue)>),
}

// Below the decoder's default depth limit.
const MAX_DEPTH: usize = 32;

impl FuzzValue {
    fn into_value(self, depth: usize) -> TnetValue {
        match self {
            Self::List(_) | Self::Dict(_) if depth >= MAX_DEPTH => TnetValue::Null,
            Self::Null => TnetValue::Null,
            Self::Boolean(b) => TnetValue::Boolean(b),
            Self::Integer(i) => TnetValue::Integer(i),
            // NaN never compares equal; infinities round-trip as `inf`.
            Self::Float(f) if f.is_nan() => TnetValue::Float(0.0),
            Self::Float(f) => TnetValue::Float(f),
            Self::String(s) => TnetValue::String(s),
            Self::List(items) => TnetValue::List(items.into_iter().map(|v| v.into_value(depth + 1)).collect()),
            Self::Dict(pairs) => TnetValue::Dict(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k, v.into_value(depth + 1)))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    values: Vec<FuzzValue>,
}

// Fuzz target: encoder → decoder roundtrip.
//
// Everything the encoder produces must decode back to the same values,
// both one at a time and as a back-to-back stream.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(input) = FuzzInput::arbitrary(&mut u) else {
        return;
    };

    let values: Vec<TnetValue> = input.values.into_iter().take(32).map(|v| v.into_value(0)).collect();

    let mut encoder = TnetEncoder::new();
    for value in &values {
        let bytes = encode(value).unwrap();
        let decoded = TnetDecoder::decode(&bytes);
        assert_eq!(decoded.as_ref().ok(), Some(value), "{:?}", decoded.err());
        encoder.add(value.clone());
    }

    let stream = encoder.encode().unwrap();
    assert_eq!(TnetDecoder::decode_all(&stream).unwrap(), values);
});
