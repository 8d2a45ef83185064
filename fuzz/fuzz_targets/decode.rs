#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: one-shot TnetDecoder over arbitrary bytes.
//
// Catches bugs in:
// - Size prefix parsing and the digit cap
// - Tag dispatch and scalar payload validation
// - Nested container parsing and depth accounting
// - Trailing data detection
fuzz_target!(|data: &[u8]| {
    let _ = tnet_decoder::TnetDecoder::decode(data);
    let _ = tnet_decoder::TnetDecoder::decode_all(data);
});
