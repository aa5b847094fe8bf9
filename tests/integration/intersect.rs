#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use sombra_csr::{
    storage::{
        AdjacencyList, AdjacencyListBuilder, AdjacencyOptions, Aggregation, Compression,
        CounterMetrics, RelationshipIntersect,
    },
    types::Result,
};

const COMPRESSIONS: [Compression; 2] = [Compression::DeltaVarLong, Compression::Uncompressed];

fn undirected(node_count: usize, edges: &[(u64, u64)], compression: Compression) -> Result<AdjacencyList> {
    AdjacencyListBuilder::undirected_from_edges(
        node_count,
        edges,
        AdjacencyOptions::new().compression(compression),
    )
}

fn rooted_at(list: &AdjacencyList, a: u64, max_degree: u64) -> (bool, Vec<(u64, u64, u64)>) {
    let mut found = Vec::new();
    let mut intersect = RelationshipIntersect::new(list, max_degree);
    let accepted = intersect.intersect_all(a, &mut |a, b, c| found.push((a, b, c)));
    (accepted, found)
}

fn all_triangles(list: &AdjacencyList, max_degree: u64) -> Vec<(u64, u64, u64)> {
    let mut found = Vec::new();
    let mut intersect = RelationshipIntersect::new(list, max_degree);
    for a in 0..list.node_count() as u64 {
        intersect.intersect_all(a, &mut |a, b, c| found.push((a, b, c)));
    }
    found
}

#[test]
fn single_triangle_rooted_at_smallest_node() -> Result<()> {
    for compression in COMPRESSIONS {
        let list = undirected(3, &[(0, 1), (0, 2), (1, 2)], compression)?;
        let (accepted, found) = rooted_at(&list, 0, u64::MAX);
        assert!(accepted);
        assert_eq!(found, vec![(0, 1, 2)]);
        // Larger roots never see the triangle again.
        assert!(rooted_at(&list, 1, u64::MAX).1.is_empty());
        assert!(rooted_at(&list, 2, u64::MAX).1.is_empty());
    }
    Ok(())
}

#[test]
fn path_has_no_triangles() -> Result<()> {
    for compression in COMPRESSIONS {
        let list = undirected(4, &[(0, 1), (1, 2), (2, 3)], compression)?;
        assert!(all_triangles(&list, u64::MAX).is_empty());
    }
    Ok(())
}

#[test]
fn parallel_edges_report_one_triangle() -> Result<()> {
    for compression in COMPRESSIONS {
        let list = undirected(3, &[(0, 1), (0, 1), (0, 2), (1, 2)], compression)?;
        assert_eq!(list.targets(0), vec![1, 1, 2]);
        assert_eq!(all_triangles(&list, u64::MAX), vec![(0, 1, 2)]);
    }
    Ok(())
}

#[test]
fn parallel_closing_edges_report_one_triangle() -> Result<()> {
    // Duplicates on the (a, c) and (b, c) sides exercise the last-c guard.
    let edges = [(0, 1), (0, 2), (0, 2), (1, 2), (1, 2), (1, 2)];
    for compression in COMPRESSIONS {
        let list = undirected(3, &edges, compression)?;
        assert_eq!(all_triangles(&list, u64::MAX), vec![(0, 1, 2)]);
    }
    Ok(())
}

#[test]
fn degree_filter_skips_high_degree_apex() -> Result<()> {
    // Node 0 has degree 5 and is the only possible apex.
    let edges = [(0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (1, 2)];
    for compression in COMPRESSIONS {
        let list = undirected(6, &edges, compression)?;
        assert_eq!(list.degree(0), 5);
        let (accepted, found) = rooted_at(&list, 0, 1);
        assert!(!accepted);
        assert!(found.is_empty());
        assert!(all_triangles(&list, 1).is_empty());
        assert_eq!(all_triangles(&list, u64::MAX), vec![(0, 1, 2)]);
    }
    Ok(())
}

#[test]
fn degree_filter_applies_to_middle_vertex() -> Result<()> {
    // Node 1 has degree 4; node 0 degree 2.
    let edges = [(0, 1), (0, 2), (1, 2), (1, 3), (1, 4)];
    let list = undirected(5, &edges, Compression::DeltaVarLong)?;
    let (accepted, found) = rooted_at(&list, 0, 2);
    assert!(accepted);
    assert!(found.is_empty());
    assert_eq!(rooted_at(&list, 0, 4).1, vec![(0, 1, 2)]);
    Ok(())
}

#[test]
fn clique_triangles_are_reported_once() -> Result<()> {
    let n = 8u64;
    let mut edges = Vec::new();
    for a in 0..n {
        for b in (a + 1)..n {
            edges.push((a, b));
        }
    }
    for compression in COMPRESSIONS {
        let list = undirected(n as usize, &edges, compression)?;
        let mut found = all_triangles(&list, u64::MAX);
        assert_eq!(found.len(), 56);
        found.sort_unstable();
        found.dedup();
        assert_eq!(found.len(), 56);
        assert!(found.iter().all(|&(a, b, c)| a < b && b < c));
    }
    Ok(())
}

#[test]
fn aggregated_lists_drop_parallel_edges() -> Result<()> {
    let metrics = Arc::new(CounterMetrics::default());
    let list = AdjacencyListBuilder::undirected_from_edges(
        3,
        &[(0, 1), (0, 1), (0, 2), (1, 2)],
        AdjacencyOptions::new()
            .aggregation(Aggregation::Single)
            .metrics(metrics.clone()),
    )?;
    assert_eq!(list.targets(0), vec![1, 2]);
    assert_eq!(all_triangles(&list, u64::MAX), vec![(0, 1, 2)]);
    assert!(metrics.compressed_cursors.load(Ordering::Relaxed) > 0);
    assert!(metrics.degree_queries.load(Ordering::Relaxed) > 0);
    Ok(())
}
