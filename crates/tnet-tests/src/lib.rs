//! Shared fixtures for the integration tests and benches.

use quickcheck::{Arbitrary, Gen};
use tnet_encoder::{encode, EncodeError};
use tnet_types::{Dict, TnetValue};

/// The UTF-8 test string: 28 characters, 29 bytes.
pub const PI_TEXT: &str = "The π character is called pi";

/// The values the echo client sends by default.
#[must_use]
pub fn default_tests() -> Vec<TnetValue> {
    vec![TnetValue::Integer(1), TnetValue::from("a"), TnetValue::from("a")]
}

/// One value of every type, containers included.
#[must_use]
pub fn every_type() -> TnetValue {
    TnetValue::dict([
        ("null", TnetValue::Null),
        ("bool", TnetValue::Boolean(true)),
        ("int", TnetValue::Integer(-42)),
        ("float", TnetValue::Float(0.25)),
        ("text", TnetValue::from(PI_TEXT)),
        (
            "list",
            TnetValue::List(vec![TnetValue::Integer(1), TnetValue::List(vec![]), TnetValue::dict::<&str, _>([])]),
        ),
    ])
}

/// A list `width` wide whose elements nest `depth` lists deep.
#[must_use]
pub fn nested(width: usize, depth: usize) -> TnetValue {
    let mut leaf = TnetValue::from("leaf");
    for _ in 0..depth {
        leaf = TnetValue::List(vec![leaf]);
    }
    TnetValue::List(vec![leaf; width])
}

/// Encode `values` back to back, as one stream.
///
/// # Errors
///
/// Any [`EncodeError`] from a single value.
pub fn encode_all(values: &[TnetValue]) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    for value in values {
        out.extend(encode(value)?);
    }
    Ok(out)
}

/// Generated value trees, at most three containers deep. Floats are never
/// NaN, so equality is meaningful.
#[derive(Clone, Debug)]
pub struct ArbValue(pub TnetValue);

impl Arbitrary for ArbValue {
    fn arbitrary(g: &mut Gen) -> Self {
        fn scalar(g: &mut Gen) -> TnetValue {
            match usize::arbitrary(g) % 5 {
                0 => TnetValue::Null,
                1 => TnetValue::Boolean(bool::arbitrary(g)),
                2 => TnetValue::Integer(i64::arbitrary(g)),
                3 => {
                    let mut f = f64::arbitrary(g);
                    while f.is_nan() {
                        f = f64::arbitrary(g);
                    }
                    TnetValue::Float(f)
                }
                _ => TnetValue::String(Vec::<u8>::arbitrary(g)),
            }
        }

        fn gen_val(g: &mut Gen, depth: usize) -> TnetValue {
            if depth == 0 {
                return scalar(g);
            }
            match usize::arbitrary(g) % 7 {
                0 => {
                    let len = usize::arbitrary(g) % 4;
                    TnetValue::List((0..len).map(|_| gen_val(g, depth - 1)).collect())
                }
                1 => {
                    let len = usize::arbitrary(g) % 4;
                    let mut dict = Dict::new();
                    for _ in 0..len {
                        dict.insert(Vec::<u8>::arbitrary(g), gen_val(g, depth - 1));
                    }
                    TnetValue::Dict(dict)
                }
                _ => scalar(g),
            }
        }

        let depth = usize::arbitrary(g) % 4;
        Self(gen_val(g, depth))
    }
}
