use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::primitives::arena::PagedArena;
use crate::storage::adjacency::{
    AdjacencyCursor, CompressedCursor, Cursor, EmptyCursor, UncompressedCursor,
};
use crate::storage::metrics::{default_metrics, AdjacencyMetrics};
use crate::storage::options::Compression;
use crate::types::{Result, SombraError};

/// Immutable adjacency of one relationship type in compressed sparse row form.
///
/// Targets of node `n` live in one block of the arena starting at
/// `offsets[n]`; `degrees[n]` holds their count. Nodes without relationships
/// have degree `0` and offset `0` and never touch the arena.
pub struct AdjacencyList {
    arena: PagedArena,
    degrees: Arc<[u32]>,
    offsets: Box<[u64]>,
    compression: Compression,
    relationship_count: u64,
    metrics: Arc<dyn AdjacencyMetrics>,
}

/// Size and shape summary of an [`AdjacencyList`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdjacencyStats {
    /// Block representation.
    pub compression: Compression,
    /// Number of nodes in the degree table.
    pub node_count: usize,
    /// Number of stored relationships.
    pub relationship_count: u64,
    /// Nodes with at least one relationship.
    pub non_empty_nodes: usize,
    /// Largest degree.
    pub max_degree: u32,
    /// Allocated page slots.
    pub page_count: usize,
    /// Bytes held by pages.
    pub allocated_bytes: usize,
    /// Bytes occupied by blocks.
    pub used_bytes: usize,
    /// Bytes of the degree and offset tables.
    pub table_bytes: usize,
    /// Whether the arena has been released.
    pub released: bool,
}

impl AdjacencyList {
    pub(crate) fn from_parts(
        arena: PagedArena,
        degrees: Arc<[u32]>,
        offsets: Box<[u64]>,
        compression: Compression,
        relationship_count: u64,
        metrics: Option<Arc<dyn AdjacencyMetrics>>,
    ) -> Self {
        debug_assert_eq!(degrees.len(), offsets.len());
        Self {
            arena,
            degrees,
            offsets,
            compression,
            relationship_count,
            metrics: metrics.unwrap_or_else(default_metrics),
        }
    }

    /// Number of relationships of `node`.
    ///
    /// Panics when `node` is outside the node space.
    #[inline]
    pub fn degree(&self, node: u64) -> usize {
        self.metrics.degree_query();
        self.degrees[node as usize] as usize
    }

    /// Checked variant of [`Self::degree`].
    pub fn try_degree(&self, node: u64) -> Result<usize> {
        usize::try_from(node)
            .ok()
            .and_then(|idx| self.degrees.get(idx))
            .map(|d| *d as usize)
            .ok_or_else(|| SombraError::node_out_of_range(node, self.node_count()))
    }

    /// Returns a cursor over the targets of `node`.
    pub fn cursor(&self, node: u64) -> Cursor<'_> {
        self.cursor_into(None, node)
    }

    /// Returns a cursor over the targets of `node`, reusing `reuse` when it
    /// has a matching representation.
    pub fn cursor_into<'a>(&'a self, reuse: Option<Cursor<'a>>, node: u64) -> Cursor<'a> {
        let idx = node as usize;
        let degree = self.degrees[idx] as usize;
        if degree == 0 {
            return Cursor::Empty(EmptyCursor);
        }
        let offset = self.offsets[idx];
        let cursor = match (self.compression, reuse) {
            (Compression::DeltaVarLong, Some(Cursor::Compressed(mut c))) => {
                c.attach(&self.arena);
                c.init(offset, degree);
                Cursor::Compressed(c)
            }
            (Compression::DeltaVarLong, _) => {
                let mut c = CompressedCursor::new(&self.arena);
                c.init(offset, degree);
                Cursor::Compressed(c)
            }
            (Compression::Uncompressed, Some(Cursor::Uncompressed(mut c))) => {
                c.attach(&self.arena);
                c.init(offset, degree);
                Cursor::Uncompressed(c)
            }
            (Compression::Uncompressed, _) => {
                let mut c = UncompressedCursor::new(&self.arena);
                c.init(offset, degree);
                Cursor::Uncompressed(c)
            }
        };
        self.metrics.cursor_opened(cursor.kind());
        cursor
    }

    /// Returns an unbound cursor of this list's representation, for callers
    /// that keep one reusable cursor per thread.
    pub fn raw_cursor(&self) -> Cursor<'_> {
        match self.compression {
            Compression::DeltaVarLong => Cursor::Compressed(CompressedCursor::new(&self.arena)),
            Compression::Uncompressed => {
                Cursor::Uncompressed(UncompressedCursor::new(&self.arena))
            }
        }
    }

    /// Collects the targets of `node`.
    pub fn targets(&self, node: u64) -> Vec<u64> {
        self.cursor(node).into_targets().collect()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    /// Number of stored relationships.
    pub fn relationship_count(&self) -> u64 {
        self.relationship_count
    }

    /// Block representation.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Shared degree table.
    pub fn degrees(&self) -> &Arc<[u32]> {
        &self.degrees
    }

    /// Logical block offset of `node`; `0` when the node has no relationships.
    pub fn offset(&self, node: u64) -> u64 {
        self.offsets[node as usize]
    }

    pub(crate) fn arena(&self) -> &PagedArena {
        &self.arena
    }

    pub(crate) fn metrics(&self) -> &dyn AdjacencyMetrics {
        self.metrics.as_ref()
    }

    /// Summarises the list.
    pub fn stats(&self) -> AdjacencyStats {
        AdjacencyStats {
            compression: self.compression,
            node_count: self.node_count(),
            relationship_count: self.relationship_count,
            non_empty_nodes: self.degrees.iter().filter(|d| **d > 0).count(),
            max_degree: self.degrees.iter().copied().max().unwrap_or(0),
            page_count: self.arena.page_count(),
            allocated_bytes: self.arena.size_in_bytes(),
            used_bytes: self.arena.used_bytes(),
            table_bytes: self.degrees.len() * std::mem::size_of::<u32>()
                + self.offsets.len() * std::mem::size_of::<u64>(),
            released: self.arena.is_released(),
        }
    }

    /// Drops the arena and returns the number of bytes freed.
    ///
    /// The degree table stays readable. A second call returns `0`.
    pub fn release(&mut self) -> usize {
        let freed = self.arena.release();
        if freed > 0 {
            debug!(
                nodes = self.node_count(),
                relationships = self.relationship_count,
                freed,
                "adjacency.release"
            );
        }
        freed
    }
}

impl fmt::Debug for AdjacencyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjacencyList")
            .field("compression", &self.compression)
            .field("node_count", &self.node_count())
            .field("relationship_count", &self.relationship_count)
            .field("pages", &self.arena.page_count())
            .finish()
    }
}
