#![allow(missing_docs)]

use proptest::prelude::*;
use sombra_csr::{
    storage::{
        AdjacencyCursor, AdjacencyListBuilder, AdjacencyOptions, Aggregation, Compression,
    },
    types::NOT_FOUND,
};

const NODE_COUNT: u64 = 1 << 16;

#[derive(Clone, Debug)]
enum Op {
    Next,
    Peek,
    SkipUntil(u64),
    Advance(u64),
    Fork,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Next),
        Just(Op::Peek),
        (0..NODE_COUNT).prop_map(Op::SkipUntil),
        (0..NODE_COUNT).prop_map(Op::Advance),
        Just(Op::Fork),
    ]
}

fn compression_strategy() -> impl Strategy<Value = Compression> {
    prop_oneof![Just(Compression::DeltaVarLong), Just(Compression::Uncompressed)]
}

/// Position of the first element after `pos` matching `pred`, consuming it.
fn model_seek(model: &[u64], pos: &mut usize, pred: impl Fn(u64) -> bool) -> u64 {
    match model[*pos..].iter().position(|&t| pred(t)) {
        Some(i) => {
            *pos += i + 1;
            model[*pos - 1]
        }
        None => {
            *pos = model.len();
            NOT_FOUND
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn targets_round_trip(
        mut targets in prop::collection::vec(0..NODE_COUNT, 0..400),
        compression in compression_strategy(),
    ) {
        targets.sort_unstable();
        let mut builder = AdjacencyListBuilder::new(
            NODE_COUNT as usize,
            AdjacencyOptions::new().compression(compression),
        );
        builder.add(1, &targets, None).unwrap();
        let rels = builder.build();
        let list = rels.adjacency();
        prop_assert_eq!(list.degree(1), targets.len());
        prop_assert_eq!(list.targets(1), targets);
    }

    #[test]
    fn cursor_ops_follow_model(
        mut model in prop::collection::vec(0..NODE_COUNT, 0..300),
        ops in prop::collection::vec(op_strategy(), 1..60),
        compression in compression_strategy(),
    ) {
        model.sort_unstable();
        let mut builder = AdjacencyListBuilder::new(
            NODE_COUNT as usize,
            AdjacencyOptions::new().compression(compression),
        );
        builder.add(0, &model, None).unwrap();
        let rels = builder.build();
        let list = rels.adjacency();

        let mut cursor = list.cursor(0);
        let mut pos = 0usize;
        let mut forks = Vec::new();
        for op in ops {
            match op {
                Op::Next => {
                    if pos < model.len() {
                        prop_assert_eq!(cursor.next_target(), model[pos]);
                        pos += 1;
                    }
                }
                Op::Peek => {
                    let expected = model.get(pos).copied().unwrap_or(NOT_FOUND);
                    prop_assert_eq!(cursor.peek_target(), expected);
                }
                Op::SkipUntil(target) => {
                    let expected = model_seek(&model, &mut pos, |t| t > target);
                    prop_assert_eq!(cursor.skip_until(target), expected);
                }
                Op::Advance(target) => {
                    let expected = model_seek(&model, &mut pos, |t| t >= target);
                    prop_assert_eq!(cursor.advance(target), expected);
                }
                Op::Fork => forks.push((cursor.shallow_copy(None), pos)),
            }
            prop_assert_eq!(cursor.remaining(), model.len() - pos);
            prop_assert_eq!(cursor.has_next(), pos < model.len());
        }
        for (fork, at) in forks {
            prop_assert_eq!(fork.into_targets().collect::<Vec<_>>(), model[at..].to_vec());
        }
    }

    #[test]
    fn weighted_properties_stay_aligned(
        edges in prop::collection::vec((0u64..16, 0u64..16, -1e6f64..1e6), 0..200),
        compression in compression_strategy(),
    ) {
        let rels = AdjacencyListBuilder::from_weighted_edges(
            16,
            &edges,
            AdjacencyOptions::new()
                .compression(compression)
                .aggregation(Aggregation::Sum),
        ).unwrap();
        for node in 0..16u64 {
            let mut expected: Vec<(u64, f64)> = Vec::new();
            let mut per_node: Vec<(u64, f64)> = edges
                .iter()
                .filter(|(s, _, _)| *s == node)
                .map(|&(_, t, v)| (t, v))
                .collect();
            per_node.sort_by_key(|(t, _)| *t);
            for (t, v) in per_node {
                match expected.last_mut() {
                    Some(last) if last.0 == t => last.1 += v,
                    _ => expected.push((t, v)),
                }
            }
            let actual: Vec<(u64, f64)> = rels.cursor(node, f64::NAN).collect();
            prop_assert_eq!(actual.len(), expected.len());
            for ((at, av), (et, ev)) in actual.iter().zip(expected.iter()) {
                prop_assert_eq!(at, et);
                prop_assert!((av - ev).abs() <= 1e-6 * (1.0 + ev.abs()));
            }
        }
    }
}
