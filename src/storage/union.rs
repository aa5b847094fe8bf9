use smallvec::SmallVec;

use crate::storage::adjacency::{CompositeCursor, CursorSet};
use crate::storage::intersect::CursorSource;
use crate::storage::list::AdjacencyList;
use crate::types::{Result, SombraError};

/// Several relationship types over one node space, read as a single
/// adjacency.
#[derive(Debug)]
pub struct UnionAdjacency<'l> {
    lists: SmallVec<[&'l AdjacencyList; 4]>,
    node_count: usize,
}

impl<'l> UnionAdjacency<'l> {
    /// Combines `lists`, which must share the same node count.
    pub fn new(lists: impl IntoIterator<Item = &'l AdjacencyList>) -> Result<Self> {
        let lists: SmallVec<[&'l AdjacencyList; 4]> = lists.into_iter().collect();
        let Some(first) = lists.first() else {
            return Err(SombraError::Invalid("union of zero adjacency lists"));
        };
        let node_count = first.node_count();
        if lists.iter().any(|list| list.node_count() != node_count) {
            return Err(SombraError::Invalid("adjacency lists differ in node count"));
        }
        Ok(Self { lists, node_count })
    }

    /// Component lists.
    pub fn lists(&self) -> &[&'l AdjacencyList] {
        &self.lists
    }

    /// Combined relationship count.
    pub fn relationship_count(&self) -> u64 {
        self.lists.iter().map(|list| list.relationship_count()).sum()
    }

    /// Returns a merged cursor over the targets of `node`.
    pub fn cursor(&self, node: u64) -> CompositeCursor<'_> {
        self.cursor_into(None, node)
    }
}

impl CursorSource for UnionAdjacency<'_> {
    type Cursor<'s> = CompositeCursor<'s> where Self: 's;

    fn node_count(&self) -> usize {
        self.node_count
    }

    fn degree(&self, node: u64) -> usize {
        self.lists.iter().map(|list| list.degree(node)).sum()
    }

    fn cursor_into<'s>(&'s self, reuse: Option<Self::Cursor<'s>>, node: u64) -> Self::Cursor<'s> {
        let mut spare = reuse.map(CompositeCursor::into_cursors).unwrap_or_default().into_iter();
        let children: CursorSet<'s> = self
            .lists
            .iter()
            .map(|list| list.cursor_into(spare.next(), node))
            .collect();
        CompositeCursor::new(children)
    }
}
