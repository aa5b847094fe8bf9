use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::primitives::arena::PagedArena;
use crate::storage::adjacency::PropertyCursor;

/// Property values of one relationship type, stored in the same node order
/// and with the same degrees as its [`super::AdjacencyList`].
pub struct AdjacencyProperties {
    arena: PagedArena,
    degrees: Arc<[u32]>,
    offsets: Box<[u64]>,
}

impl AdjacencyProperties {
    pub(crate) fn from_parts(arena: PagedArena, degrees: Arc<[u32]>, offsets: Box<[u64]>) -> Self {
        debug_assert_eq!(degrees.len(), offsets.len());
        Self {
            arena,
            degrees,
            offsets,
        }
    }

    /// Returns a cursor over the property values of `node`.
    pub fn cursor(&self, node: u64) -> PropertyCursor<'_> {
        self.cursor_into(None, node)
    }

    /// Like [`Self::cursor`], overwriting `reuse` when supplied.
    pub fn cursor_into<'a>(&'a self, reuse: Option<PropertyCursor<'a>>, node: u64) -> PropertyCursor<'a> {
        let idx = node as usize;
        let mut cursor = match reuse {
            Some(mut c) => {
                c.attach(&self.arena);
                c
            }
            None => PropertyCursor::new(&self.arena),
        };
        cursor.init(self.offsets[idx], self.degrees[idx] as usize);
        cursor
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    /// Bytes held by pages.
    pub fn size_in_bytes(&self) -> usize {
        self.arena.size_in_bytes()
    }

    pub(crate) fn arena(&self) -> &PagedArena {
        &self.arena
    }

    pub(crate) fn offset(&self, node: u64) -> u64 {
        self.offsets[node as usize]
    }

    /// Drops the arena and returns the number of bytes freed; `0` on a
    /// second call.
    pub fn release(&mut self) -> usize {
        let freed = self.arena.release();
        if freed > 0 {
            debug!(nodes = self.node_count(), freed, "properties.release");
        }
        freed
    }
}

impl fmt::Debug for AdjacencyProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjacencyProperties")
            .field("node_count", &self.node_count())
            .field("pages", &self.arena.page_count())
            .finish()
    }
}
