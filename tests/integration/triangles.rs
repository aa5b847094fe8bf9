#![allow(missing_docs)]

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sombra_csr::{
    admin::{self, VerifyLevel},
    storage::{
        triangles, AdjacencyListBuilder, AdjacencyOptions, Aggregation, Compression,
        TriangleCountConfig, UnionAdjacency,
    },
    types::Result,
};

fn random_edges(nodes: u64, count: usize, seed: u64) -> Vec<(u64, u64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.gen_range(0..nodes), rng.gen_range(0..nodes)))
        .filter(|(s, t)| s != t)
        .collect()
}

fn brute_force(nodes: u64, edges: &[(u64, u64)]) -> BTreeSet<(u64, u64, u64)> {
    let set: BTreeSet<(u64, u64)> = edges
        .iter()
        .flat_map(|&(s, t)| [(s, t), (t, s)])
        .collect();
    let mut found = BTreeSet::new();
    for &(a, b) in &set {
        if a >= b {
            continue;
        }
        for c in (b + 1)..nodes {
            if set.contains(&(a, c)) && set.contains(&(b, c)) {
                found.insert((a, b, c));
            }
        }
    }
    found
}

#[test]
fn parallel_count_matches_brute_force() -> Result<()> {
    let nodes = 300;
    let edges = random_edges(nodes, 3_000, 7);
    let expected = brute_force(nodes, &edges);
    for compression in [Compression::DeltaVarLong, Compression::Uncompressed] {
        let list = AdjacencyListBuilder::undirected_from_edges(
            nodes as usize,
            &edges,
            AdjacencyOptions::new()
                .compression(compression)
                .aggregation(Aggregation::Single),
        )?;
        assert!(admin::verify(&list, VerifyLevel::Full).success);
        for concurrency in [1, 2, 8] {
            let config = TriangleCountConfig::default().concurrency(concurrency);
            let result = triangles::count(&list, &config)?;
            assert_eq!(result.global, expected.len() as u64, "{compression:?}/{concurrency}");
            let local_total: u64 = result.local.iter().flatten().sum();
            assert_eq!(local_total, 3 * result.global);

            let listed = triangles::stream(&list, &config)?;
            let listed: BTreeSet<_> = listed.iter().map(|t| (t.a, t.b, t.c)).collect();
            assert_eq!(listed, expected);
        }
    }
    Ok(())
}

#[test]
fn parallel_edges_do_not_inflate_counts() -> Result<()> {
    let nodes = 120;
    let mut edges = random_edges(nodes, 900, 11);
    let doubled = edges.clone();
    edges.extend(doubled);
    let expected = brute_force(nodes, &edges);
    let list = AdjacencyListBuilder::undirected_from_edges(
        nodes as usize,
        &edges,
        AdjacencyOptions::new(),
    )?;
    let result = triangles::count(&list, &TriangleCountConfig::default().concurrency(4))?;
    assert_eq!(result.global, expected.len() as u64);
    Ok(())
}

#[test]
fn degree_filter_counts_skipped_sources() -> Result<()> {
    let edges = [(0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (1, 2), (3, 4)];
    let list = AdjacencyListBuilder::undirected_from_edges(6, &edges, AdjacencyOptions::new())?;
    let unfiltered = triangles::count(&list, &TriangleCountConfig::default())?;
    assert_eq!(unfiltered.global, 2);
    assert_eq!(unfiltered.local[0], Some(2));

    let filtered = triangles::count(&list, &TriangleCountConfig::default().max_degree(2))?;
    assert_eq!(filtered.global, 0);
    assert_eq!(filtered.skipped_nodes, 1);
    assert_eq!(filtered.local, vec![None, Some(0), Some(0), Some(0), Some(0), Some(0)]);
    Ok(())
}

#[test]
fn degree_filter_applies_to_closing_nodes() -> Result<()> {
    // Hubs 2 and 12 (degree 5) close (0, 1, 2) and (4, 5, 12).
    let edges = [
        (0, 1),
        (0, 2),
        (1, 2),
        (2, 3),
        (2, 7),
        (2, 8),
        (4, 5),
        (4, 12),
        (5, 12),
        (9, 12),
        (10, 12),
        (11, 12),
        (0, 6),
        (1, 6),
    ];
    let nodes = 13;
    let list = AdjacencyListBuilder::undirected_from_edges(nodes, &edges, AdjacencyOptions::new())?;
    for concurrency in [1, 3] {
        let config = TriangleCountConfig::default()
            .concurrency(concurrency)
            .max_degree(3);
        let result = triangles::count(&list, &config)?;
        assert_eq!(result.global, 1);
        assert_eq!(result.skipped_nodes, 2);
        assert_eq!(result.local[2], None);
        assert_eq!(result.local[12], None);
        assert_eq!(result.local[3], Some(0));
        assert_eq!(result.local[4], Some(0));
        assert_eq!(result.local[6], Some(1));

        let listed = triangles::stream(&list, &config)?;
        let listed: Vec<_> = listed.iter().map(|t| (t.a, t.b, t.c)).collect();
        assert_eq!(listed, vec![(0, 1, 6)]);
    }
    Ok(())
}

#[test]
fn union_of_relationship_types_closes_triangles() -> Result<()> {
    let knows = AdjacencyListBuilder::undirected_from_edges(
        4,
        &[(0, 1), (1, 2)],
        AdjacencyOptions::new(),
    )?;
    let likes = AdjacencyListBuilder::undirected_from_edges(
        4,
        &[(0, 2), (2, 3)],
        AdjacencyOptions::new().compression(Compression::Uncompressed),
    )?;
    assert_eq!(triangles::count(&knows, &TriangleCountConfig::default())?.global, 0);

    let union = UnionAdjacency::new([&knows, &likes])?;
    let result = triangles::count(&union, &TriangleCountConfig::default().concurrency(2))?;
    assert_eq!(result.global, 1);
    assert_eq!(result.local, vec![Some(1), Some(1), Some(1), Some(0)]);
    Ok(())
}

#[test]
fn empty_graph_has_no_triangles() -> Result<()> {
    let list = AdjacencyListBuilder::from_adjacency(&[], AdjacencyOptions::new())?;
    let result = triangles::count(&list, &TriangleCountConfig::default())?;
    assert_eq!(result.global, 0);
    assert!(result.local.is_empty());
    assert_eq!(result.average_clustering(&list), 0.0);
    Ok(())
}
