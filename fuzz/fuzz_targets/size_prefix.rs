#![no_main]

use libfuzzer_sys::fuzz_target;
use tnet_wire::{ByteCursor, SizePrefix, MAX_SIZE_DIGITS};

// Fuzz target: SizePrefix fed one byte at a time.
//
// A completed prefix never has more than MAX_SIZE_DIGITS digits, and an
// error always points inside the input.
fuzz_target!(|data: &[u8]| {
    let mut prefix = SizePrefix::new();
    let mut cursor = ByteCursor::new();
    for byte in data {
        cursor.append(std::slice::from_ref(byte));
        match prefix.advance(&mut cursor) {
            Ok(None) => {}
            Ok(Some(_)) => {
                assert!(prefix.digits() <= MAX_SIZE_DIGITS);
                return;
            }
            Err(e) => {
                assert!(e.offset() < data.len());
                return;
            }
        }
    }
});
