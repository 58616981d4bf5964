//! Fuzz target for KeyPath::parse with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run key_path
//!
//! A parsed path must display back to the input and contain no empty
//! segment.

#![no_main]

use announcebulk::KeyPath;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(path) = KeyPath::parse(text) {
        assert_eq!(path.to_string(), text);
        assert!(path.keys().iter().all(|key| !key.is_empty()));
    }
});
