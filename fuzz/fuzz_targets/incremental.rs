#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tnet_decoder::{DecodeError, Stage, Step, TnetDecoder, TnetMachine};
use tnet_types::{ParseData, TnetValue};
use tnet_wire::ByteCursor;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bytes: Vec<u8>,
    fragments: Vec<u8>,
}

fn feed(bytes: &[u8], fragments: &[u8]) -> Result<Vec<TnetValue>, DecodeError> {
    let mut machine = TnetMachine::new("fuzz");
    let mut data = ParseData::new();
    let mut cursor = ByteCursor::new();
    let mut values = Vec::new();
    let mut rest = bytes;
    let mut sizes = fragments.iter().map(|&n| usize::from(n));

    while !rest.is_empty() {
        let n = sizes.next().unwrap_or(rest.len()).clamp(1, rest.len());
        let (fragment, tail) = rest.split_at(n);
        rest = tail;
        cursor.append(fragment);
        loop {
            match machine.step(&mut cursor, &mut data)? {
                Step::Advanced(Stage::Terminal) => {
                    values.extend(machine.take_value());
                    machine.reset();
                }
                Step::Advanced(_) => {}
                Step::Pending => break,
            }
        }
        cursor.compact();
    }

    if machine.is_untouched() {
        Ok(values)
    } else {
        machine.finish(&cursor).map(|_| values)
    }
}

// Fuzz target: TnetMachine fed in arbitrary fragments.
//
// Fragmentation must never change the outcome: the values and the error
// (including its offset) match a one-shot decode of the same bytes.
fuzz_target!(|input: FuzzInput| {
    let fed = feed(&input.bytes, &input.fragments);
    let whole = TnetDecoder::decode_all(&input.bytes);
    match (fed, whole) {
        (Ok(a), Ok(b)) => assert_eq!(a.len(), b.len()),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        (a, b) => panic!("fragmented {a:?} vs whole {b:?}"),
    }
});
