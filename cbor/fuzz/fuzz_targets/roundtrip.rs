#![no_main]

use libfuzzer_sys::fuzz_target;

// Re-encoding is canonicalising, so a second pass must be stable
fuzz_target!(|data: &[u8]| {
    let Ok(doc) = cbor_tree::decode(data) else {
        return;
    };
    let Ok(once) = doc.root().to_vec() else {
        return;
    };
    let again = cbor_tree::decode(&once).expect("Re-encoded data does not decode");
    assert_eq!(
        again.root().to_vec().expect("Re-encoded data does not encode"),
        once
    );
});
