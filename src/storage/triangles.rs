//! Parallel triangle counting and listing on top of [`RelationshipIntersect`].
//!
//! Source nodes are split across a dedicated rayon pool sized by
//! [`TriangleCountConfig::concurrency`]. Each pool thread owns one
//! intersector and its cursors; all of them read the same immutable source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::storage::intersect::{CursorSource, RelationshipIntersect};
use crate::storage::options::TriangleCountConfig;
use crate::types::{Result, SombraError};

/// Smallest run of source nodes handed to one pool thread.
const BATCH_SIZE: usize = 64;

/// A triangle with `a < b < c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Triangle {
    /// Smallest node.
    pub a: u64,
    /// Middle node.
    pub b: u64,
    /// Largest node.
    pub c: u64,
}

/// Output of [`count`].
#[derive(Clone, Debug, Serialize)]
pub struct TriangleCountResult {
    /// Number of distinct triangles.
    pub global: u64,
    /// Triangles each node takes part in. `None` marks a node whose degree
    /// exceeds the configured maximum; such nodes were never counted.
    pub local: Vec<Option<u64>>,
    /// Nodes rejected by the degree filter.
    pub skipped_nodes: u64,
}

impl TriangleCountResult {
    /// Local clustering coefficient of `node`, given its degree in an
    /// undirected, aggregated graph. `None` for excluded nodes.
    pub fn clustering_coefficient(&self, node: u64, degree: usize) -> Option<f64> {
        let triangles = self.local[node as usize]?;
        if degree < 2 {
            return Some(0.0);
        }
        let possible = degree as f64 * (degree as f64 - 1.0);
        Some(2.0 * triangles as f64 / possible)
    }

    /// Mean of [`Self::clustering_coefficient`] over the nodes of `source`
    /// that were not excluded.
    pub fn average_clustering<S: CursorSource + ?Sized>(&self, source: &S) -> f64 {
        let (total, counted) = (0..source.node_count() as u64)
            .filter_map(|node| self.clustering_coefficient(node, source.degree(node)))
            .fold((0.0, 0u64), |(total, counted), c| (total + c, counted + 1));
        if counted == 0 {
            return 0.0;
        }
        total / counted as f64
    }
}

/// Counts triangles globally and per node.
pub fn count<S: CursorSource + ?Sized>(
    source: &S,
    config: &TriangleCountConfig,
) -> Result<TriangleCountResult> {
    config.validate()?;
    let started = Instant::now();
    let node_count = source.node_count();
    let local: Vec<AtomicU64> = (0..node_count).map(|_| AtomicU64::new(0)).collect();
    let (global, skipped) = drive(
        source,
        config,
        |intersect, a| {
            let mut found = 0u64;
            let accepted = intersect.intersect_all(a, &mut |a, b, c| {
                found += 1;
                for node in [a, b, c] {
                    local[node as usize].fetch_add(1, Ordering::Relaxed);
                }
            });
            (found, u64::from(!accepted))
        },
        |left: (u64, u64), right: (u64, u64)| (left.0 + right.0, left.1 + right.1),
    )?;
    report(source, global, skipped);
    let local = local
        .into_iter()
        .enumerate()
        .map(|(node, triangles)| {
            let degree = source.degree(node as u64) as u64;
            (degree <= config.max_degree).then(|| triangles.into_inner())
        })
        .collect();
    info!(
        nodes = node_count,
        triangles = global,
        skipped,
        concurrency = config.concurrency,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "triangles.count.finish"
    );
    Ok(TriangleCountResult {
        global,
        local,
        skipped_nodes: skipped,
    })
}

/// Lists every triangle, sorted.
pub fn stream<S: CursorSource + ?Sized>(
    source: &S,
    config: &TriangleCountConfig,
) -> Result<Vec<Triangle>> {
    config.validate()?;
    let started = Instant::now();
    let (mut triangles, skipped) = drive(
        source,
        config,
        |intersect, a| {
            let mut found = Vec::new();
            let accepted =
                intersect.intersect_all(a, &mut |a, b, c| found.push(Triangle { a, b, c }));
            (found, u64::from(!accepted))
        },
        |mut left: (Vec<Triangle>, u64), mut right: (Vec<Triangle>, u64)| {
            if left.0.len() < right.0.len() {
                std::mem::swap(&mut left, &mut right);
            }
            left.0.append(&mut right.0);
            (left.0, left.1 + right.1)
        },
    )?;
    triangles.sort_unstable();
    report(source, triangles.len() as u64, skipped);
    info!(
        triangles = triangles.len(),
        skipped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "triangles.stream.finish"
    );
    Ok(triangles)
}

/// Visits every source node on a pool of `config.concurrency` threads and
/// folds the per-node results with `merge`.
fn drive<'s, S, P, V, M>(
    source: &'s S,
    config: &TriangleCountConfig,
    visit: V,
    merge: M,
) -> Result<P>
where
    S: CursorSource + ?Sized,
    P: Default + Send,
    V: Fn(&mut RelationshipIntersect<'s, S>, u64) -> P + Sync + Send,
    M: Fn(P, P) -> P + Sync + Send,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.concurrency)
        .thread_name(|index| format!("triangles-{index}"))
        .build()
        .map_err(|err| SombraError::Config(format!("triangle thread pool: {err}")))?;
    debug!(
        threads = pool.current_num_threads(),
        nodes = source.node_count(),
        "triangles.pool.start"
    );
    let max_degree = config.max_degree;
    Ok(pool.install(|| {
        (0..source.node_count())
            .into_par_iter()
            .with_min_len(BATCH_SIZE)
            .map_init(
                || RelationshipIntersect::new(source, max_degree),
                |intersect, a| visit(intersect, a as u64),
            )
            .reduce(P::default, &merge)
    }))
}

fn report<S: CursorSource + ?Sized>(source: &S, found: u64, skipped: u64) {
    if let Some(metrics) = source.metrics() {
        metrics.intersect_nodes(source.node_count() as u64 - skipped, skipped);
        metrics.triangles_found(found);
    }
}
