#![forbid(unsafe_code)]

//! Compressed adjacency storage: builders, lists, cursors and the triangle
//! intersector.

/// Block decoding and cursors over adjacency and property blocks.
pub mod adjacency;
/// In-memory encoder for adjacency and property lists.
pub mod builder;
/// Merge-join neighbor intersection.
pub mod intersect;
mod list;
/// Metrics collection for adjacency reads.
pub mod metrics;
mod options;
mod properties;
mod relationships;
/// Parallel triangle counting.
pub mod triangles;
mod union;

pub use adjacency::{
    AdjacencyCursor, CompositeCursor, CompressedCursor, Cursor, EmptyCursor, PropertyCursor,
    UncompressedCursor,
};
pub use builder::AdjacencyListBuilder;
pub use intersect::{CursorSource, IntersectionConsumer, RelationshipIntersect};
pub use list::{AdjacencyList, AdjacencyStats};
pub use metrics::{default_metrics, AdjacencyMetrics, CounterMetrics, NoopMetrics};
pub use options::{AdjacencyOptions, Aggregation, Compression, TriangleCountConfig};
pub use properties::AdjacencyProperties;
pub use relationships::{RelationshipCursor, Relationships};
pub use triangles::{Triangle, TriangleCountResult};
pub use union::UnionAdjacency;
