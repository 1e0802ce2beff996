//! Fuzz target for XML parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the XML reader,
//! checking for panics, crashes, or hangs.

#![no_main]

use dataconv::tree::io_xml::{from_xml_slice, to_xml_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(tree) = from_xml_slice(data) {
        let _ = to_xml_string(&tree);
    }
});
