#![cfg(test)]

use std::io::Read;

fn replay(corpus: &str, f: impl Fn(&[u8])) {
    match std::fs::read_dir(corpus) {
        Err(e) => {
            eprintln!(
                "Failed to open dir: {e}, curr dir: {}",
                std::env::current_dir().unwrap().to_string_lossy()
            );
        }
        Ok(dir) => {
            for entry in dir.flatten() {
                let path = entry.path();
                if path.is_file()
                    && let Ok(mut file) = std::fs::File::open(&path)
                {
                    let mut buffer = Vec::new();
                    if file.read_to_end(&mut buffer).is_ok() {
                        f(&buffer);
                    }
                }
            }
        }
    }
}

#[test]
fn test_decode() {
    replay("./corpus/decode", |data| {
        if let Ok(doc) = cbor_tree::decode(data) {
            _ = format!("{doc:?}");
        }
    });
}

#[test]
fn test_roundtrip() {
    replay("./corpus/roundtrip", |data| {
        if let Ok(doc) = cbor_tree::decode(data)
            && let Ok(once) = doc.root().to_vec()
        {
            let again = cbor_tree::decode(&once).unwrap();
            assert_eq!(again.root().to_vec().unwrap(), once);
        }
    });
}
