//! Fuzz target for the XML nesting-depth scan.
//!
//! The scan runs on raw text before roxmltree, so it must never panic on
//! arbitrary input (unterminated comments, quotes, tags).

#![no_main]

use dataconv::tree::io_xml::fuzz_check_depth;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(input) = std::str::from_utf8(data) {
        let _ = fuzz_check_depth(input);
    }
});
