use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking adjacency reads and triangle enumeration.
///
/// Implementations must be cheap: cursor and degree hooks run on the query
/// hot path.
pub trait AdjacencyMetrics: Send + Sync {
    /// Records a cursor being bound to a node.
    ///
    /// # Parameters
    /// * `kind` - The cursor representation: "compressed" or "uncompressed".
    fn cursor_opened(&self, kind: &'static str);

    /// Records a degree table lookup.
    fn degree_query(&self);

    /// Records source nodes handed to the triangle driver.
    ///
    /// # Parameters
    /// * `intersected` - Nodes the intersector enumerated.
    /// * `skipped` - Nodes the degree filter rejected.
    fn intersect_nodes(&self, intersected: u64, skipped: u64);

    /// Records `count` triangles reported by one driver run.
    fn triangles_found(&self, count: u64);
}

/// A no-op implementation of [`AdjacencyMetrics`] that discards all recorded metrics.
#[derive(Default)]
pub struct NoopMetrics;

impl AdjacencyMetrics for NoopMetrics {
    fn cursor_opened(&self, _kind: &'static str) {}
    fn degree_query(&self) {}
    fn intersect_nodes(&self, _intersected: u64, _skipped: u64) {}
    fn triangles_found(&self, _count: u64) {}
}

/// A thread-safe counter-based implementation of [`AdjacencyMetrics`].
#[derive(Default, Debug)]
pub struct CounterMetrics {
    /// Number of compressed cursors bound to a node.
    pub compressed_cursors: AtomicU64,

    /// Number of uncompressed cursors bound to a node.
    pub uncompressed_cursors: AtomicU64,

    /// Number of degree lookups.
    pub degree_queries: AtomicU64,

    /// Number of source nodes intersected.
    pub intersected_nodes: AtomicU64,

    /// Number of source nodes rejected by the degree filter.
    pub skipped_nodes: AtomicU64,

    /// Number of triangles reported.
    pub triangles: AtomicU64,
}

impl AdjacencyMetrics for CounterMetrics {
    fn cursor_opened(&self, kind: &'static str) {
        match kind {
            "compressed" => {
                self.compressed_cursors.fetch_add(1, Ordering::Relaxed);
            }
            "uncompressed" => {
                self.uncompressed_cursors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn degree_query(&self) {
        self.degree_queries.fetch_add(1, Ordering::Relaxed);
    }

    fn intersect_nodes(&self, intersected: u64, skipped: u64) {
        self.intersected_nodes.fetch_add(intersected, Ordering::Relaxed);
        self.skipped_nodes.fetch_add(skipped, Ordering::Relaxed);
    }

    fn triangles_found(&self, count: u64) {
        self.triangles.fetch_add(count, Ordering::Relaxed);
    }
}

/// Returns the default metrics implementation wrapped in an [`Arc`].
///
/// The default implementation is [`NoopMetrics`], which discards all
/// recorded metrics.
pub fn default_metrics() -> Arc<dyn AdjacencyMetrics> {
    Arc::new(NoopMetrics)
}
