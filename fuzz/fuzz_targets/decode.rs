//! Fuzz target for bencode::decode with arbitrary byte input.
//!
//! Run with: cargo +nightly fuzz run decode
//!
//! Properties checked:
//! - Decoding never panics, including on deeply nested input
//! - Anything that decodes re-encodes to exactly the input bytes
//! - Applying the orpheus preset to a decoded tree never panics

#![no_main]

use announcebulk::bencode::{decode, encode};
use announcebulk::presets;
use announcebulk::transform::apply_all;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut value) = decode(data) else {
        return;
    };

    // Canonical input only: dictionary keys are kept in stored order and
    // integers/lengths reject non-canonical forms, so the encoding is exact.
    assert_eq!(encode(&value), data, "re-encode differs from input");

    let _ = apply_all(&presets::orpheus(), &mut value);
    let _ = encode(&value);
});
