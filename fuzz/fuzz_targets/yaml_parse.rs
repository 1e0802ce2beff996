//! Fuzz target for YAML parsing.

#![no_main]

use dataconv::tree::io_yaml::from_yaml_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let _ = from_yaml_slice(data);
});
