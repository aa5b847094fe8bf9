#![no_main]

use libfuzzer_sys::fuzz_target;
use sombra_csr::primitives::bytes::var;

fuzz_target!(|data: &[u8]| {
    let mut off = 0;
    while off < data.len() {
        let start = off;
        match var::try_decode_u64(data, &mut off) {
            Ok(value) => {
                // Canonical encodings round-trip byte for byte.
                let len = off - start;
                if len == var::encoded_size(value) {
                    let mut out = Vec::new();
                    var::encode_u64(value, &mut out);
                    assert_eq!(&out[..], &data[start..off]);
                }
                let mut hot = start;
                assert_eq!(var::decode_u64(data, &mut hot), value);
                assert_eq!(hot, off);
            }
            Err(_) => break,
        }
    }
});
