#![no_main]

use libfuzzer_sys::fuzz_target;
use sombra_csr::storage::{
    AdjacencyCursor, AdjacencyListBuilder, AdjacencyOptions, Compression,
};
use sombra_csr::types::NOT_FOUND;

const NODE_COUNT: u64 = 1 << 16;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = (split as usize * 2).min(rest.len());
    let (targets, ops) = rest.split_at(split);
    let mut model: Vec<u64> = targets
        .chunks_exact(2)
        .map(|pair| u64::from(u16::from_le_bytes([pair[0], pair[1]])))
        .collect();
    model.sort_unstable();

    for compression in [Compression::DeltaVarLong, Compression::Uncompressed] {
        let mut adjacency = vec![Vec::new(); NODE_COUNT as usize];
        adjacency[0] = model.clone();
        let Ok(list) = AdjacencyListBuilder::from_adjacency(
            &adjacency,
            AdjacencyOptions::new().compression(compression),
        ) else {
            return;
        };
        let mut cursor = list.cursor(0);
        let mut pos = 0usize;
        for op in ops.chunks_exact(3) {
            let target = u64::from(u16::from_le_bytes([op[1], op[2]]));
            let expected_peek = model.get(pos).copied().unwrap_or(NOT_FOUND);
            match op[0] % 3 {
                0 => {
                    assert_eq!(cursor.peek_target(), expected_peek);
                }
                1 => {
                    let found = model[pos..].iter().position(|&t| t > target);
                    let expected = match found {
                        Some(i) => {
                            pos += i + 1;
                            model[pos - 1]
                        }
                        None => {
                            pos = model.len();
                            NOT_FOUND
                        }
                    };
                    assert_eq!(cursor.skip_until(target), expected);
                }
                _ => {
                    let found = model[pos..].iter().position(|&t| t >= target);
                    let expected = match found {
                        Some(i) => {
                            pos += i + 1;
                            model[pos - 1]
                        }
                        None => {
                            pos = model.len();
                            NOT_FOUND
                        }
                    };
                    assert_eq!(cursor.advance(target), expected);
                }
            }
            assert_eq!(cursor.remaining(), model.len() - pos);
        }
    }
});
