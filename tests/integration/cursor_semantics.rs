#![allow(missing_docs)]

use std::sync::Once;

use sombra_csr::{
    storage::{
        AdjacencyCursor, AdjacencyList, AdjacencyListBuilder, AdjacencyOptions, Compression,
        Cursor, UnionAdjacency,
    },
    types::{Result, NOT_FOUND},
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("sombra_csr=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

const COMPRESSIONS: [Compression; 2] = [Compression::DeltaVarLong, Compression::Uncompressed];

/// Node 0 gets `targets`; the other 31 nodes stay empty.
fn list_with(targets: &[u64], compression: Compression) -> Result<AdjacencyList> {
    let mut adjacency = vec![Vec::new(); 32];
    adjacency[0] = targets.to_vec();
    AdjacencyListBuilder::from_adjacency(
        &adjacency,
        AdjacencyOptions::new().compression(compression),
    )
}

#[test]
fn skip_until_returns_first_strictly_greater() -> Result<()> {
    init_tracing();
    for compression in COMPRESSIONS {
        let list = list_with(&[2, 5, 9, 20], compression)?;
        let mut cursor = list.cursor(0);
        assert_eq!(cursor.skip_until(5), 9, "{compression:?}");
        assert!(cursor.has_next());
        assert_eq!(cursor.next_target(), 20);
        assert!(!cursor.has_next());
    }
    Ok(())
}

#[test]
fn advance_returns_first_at_least_and_always_steps() -> Result<()> {
    init_tracing();
    for compression in COMPRESSIONS {
        let list = list_with(&[2, 5, 9, 20], compression)?;
        let mut cursor = list.cursor(0);
        assert_eq!(cursor.advance(5), 5);
        assert_eq!(cursor.remaining(), 2);

        let mut cursor = list.cursor(0);
        assert_eq!(cursor.advance(0), 2);
        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.peek_target(), 5);
    }
    Ok(())
}

#[test]
fn exhaustion_yields_sentinel() -> Result<()> {
    init_tracing();
    for compression in COMPRESSIONS {
        let list = list_with(&[2, 5, 9, 20], compression)?;
        let mut cursor = list.cursor(0);
        assert_eq!(cursor.skip_until(20), NOT_FOUND);
        assert!(!cursor.has_next());
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.peek_target(), NOT_FOUND);
        assert_eq!(cursor.advance(0), NOT_FOUND);
        assert_eq!(cursor.skip_until(0), NOT_FOUND);

        let mut cursor = list.cursor(0);
        assert_eq!(cursor.advance(21), NOT_FOUND);
        assert!(!cursor.has_next());
    }
    Ok(())
}

#[test]
fn empty_node_yields_exhausted_cursor() -> Result<()> {
    init_tracing();
    for compression in COMPRESSIONS {
        let list = list_with(&[2, 5], compression)?;
        let cursor = list.cursor(1);
        assert!(matches!(cursor, Cursor::Empty(_)));
        assert_eq!(cursor.size(), 0);
        assert!(!cursor.has_next());
        assert_eq!(list.degree(1), 0);
        assert_eq!(cursor.into_targets().count(), 0);
    }
    Ok(())
}

#[test]
fn shallow_copies_iterate_independently() -> Result<()> {
    init_tracing();
    for compression in COMPRESSIONS {
        let list = list_with(&[2, 5, 9, 20], compression)?;
        let mut a = list.cursor(0);
        assert_eq!(a.next_target(), 2);

        let mut b = a.shallow_copy(None);
        assert_eq!(a.next_target(), 5);
        assert_eq!(a.next_target(), 9);
        assert_eq!(b.remaining(), 3);
        assert_eq!(b.next_target(), 5);

        assert_eq!(b.skip_until(9), 20);
        assert_eq!(a.remaining(), 1);
        assert_eq!(a.next_target(), 20);

        // A compatible destination is rebound instead of rebuilt.
        let c = list.cursor(0);
        let reused = c.shallow_copy(Some(b));
        assert_eq!(reused.remaining(), 4);
        assert_eq!(reused.into_targets().collect::<Vec<_>>(), vec![2, 5, 9, 20]);
    }
    Ok(())
}

#[test]
fn duplicate_targets_survive_delta_encoding() -> Result<()> {
    init_tracing();
    for compression in COMPRESSIONS {
        let list = list_with(&[5, 5, 9, 30], compression)?;
        assert_eq!(list.targets(0), vec![5, 5, 9, 30]);
        let mut cursor = list.cursor(0);
        assert_eq!(cursor.skip_until(4), 5);
        assert_eq!(cursor.skip_until(5), 9);
    }
    Ok(())
}

#[test]
fn long_lists_cross_decode_chunks() -> Result<()> {
    init_tracing();
    let targets: Vec<u64> = (0..500).map(|i| i * 3).collect();
    let mut adjacency = vec![Vec::new(); 1_500];
    adjacency[7] = targets.clone();
    for compression in COMPRESSIONS {
        let list = AdjacencyListBuilder::from_adjacency(
            &adjacency,
            AdjacencyOptions::new().compression(compression),
        )?;
        let mut cursor = list.cursor(7);
        assert_eq!(cursor.advance(200), 201);
        assert_eq!(cursor.skip_until(201), 204);
        assert_eq!(cursor.advance(1_000), 1_002);
        assert_eq!(cursor.remaining(), 500 - 335);
        let rest: Vec<u64> = cursor.into_targets().collect();
        assert_eq!(rest, targets[335..].to_vec());
    }
    Ok(())
}

#[test]
fn raw_cursor_can_be_bound_later() -> Result<()> {
    init_tracing();
    let list = list_with(&[3, 4], Compression::DeltaVarLong)?;
    let raw = list.raw_cursor();
    assert!(!raw.has_next());
    let bound = list.cursor_into(Some(raw), 0);
    assert_eq!(bound.into_targets().collect::<Vec<_>>(), vec![3, 4]);
    Ok(())
}

#[test]
fn union_cursor_merges_lists() -> Result<()> {
    init_tracing();
    let knows = AdjacencyListBuilder::from_adjacency(
        &[vec![1, 4], vec![], vec![], vec![], vec![]],
        AdjacencyOptions::new(),
    )?;
    let likes = AdjacencyListBuilder::from_adjacency(
        &[vec![2, 4], vec![], vec![], vec![], vec![]],
        AdjacencyOptions::new().compression(Compression::Uncompressed),
    )?;
    let union = UnionAdjacency::new([&knows, &likes])?;
    let mut cursor = union.cursor(0);
    assert_eq!(cursor.size(), 4);
    assert_eq!(cursor.skip_until(1), 2);
    assert_eq!(cursor.advance(4), 4);
    assert_eq!(cursor.next_target(), 4);
    assert!(!cursor.has_next());
    assert_eq!(union.cursor(3).size(), 0);
    Ok(())
}
