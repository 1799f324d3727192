#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = cbor_tree::decode(data) {
        _ = format!("{doc:?}");
    }
});
