//! Fuzz target for JSON parsing.
//!
//! Feeds arbitrary bytes to the JSON reader and, when they parse, renders
//! the tree in every output format.

#![no_main]

use dataconv::tree::{io_json, io_xml, io_yaml};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(tree) = io_json::from_json_slice(data) {
        let _ = io_json::to_json_string(&tree);
        let _ = io_xml::to_xml_string(&tree);
        let _ = io_yaml::to_yaml_string(&tree);
    }
});
