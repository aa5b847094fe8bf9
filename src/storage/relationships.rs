use crate::storage::adjacency::{AdjacencyCursor, Cursor, PropertyCursor};
use crate::storage::list::AdjacencyList;
use crate::storage::properties::AdjacencyProperties;

/// An adjacency list together with its optional property list.
#[derive(Debug)]
pub struct Relationships {
    adjacency: AdjacencyList,
    properties: Option<AdjacencyProperties>,
}

impl Relationships {
    pub(crate) fn new(adjacency: AdjacencyList, properties: Option<AdjacencyProperties>) -> Self {
        Self {
            adjacency,
            properties,
        }
    }

    /// Target side.
    pub fn adjacency(&self) -> &AdjacencyList {
        &self.adjacency
    }

    /// Property side, when one was built.
    pub fn properties(&self) -> Option<&AdjacencyProperties> {
        self.properties.as_ref()
    }

    /// Whether relationships carry a stored property.
    pub fn has_properties(&self) -> bool {
        self.properties.is_some()
    }

    /// Splits into the adjacency and property lists.
    pub fn into_parts(self) -> (AdjacencyList, Option<AdjacencyProperties>) {
        (self.adjacency, self.properties)
    }

    /// Returns a cursor yielding `(target, property)` pairs for `node`.
    ///
    /// Without a stored property list every pair carries `fallback_value`.
    pub fn cursor(&self, node: u64, fallback_value: f64) -> RelationshipCursor<'_> {
        let targets = self.adjacency.cursor(node);
        let properties = match &self.properties {
            Some(props) => props.cursor(node),
            None => PropertyCursor::constant(fallback_value.to_bits(), targets.size()),
        };
        RelationshipCursor {
            targets,
            properties,
        }
    }

    /// Releases both arenas and returns the total number of bytes freed.
    pub fn release(&mut self) -> usize {
        let mut freed = self.adjacency.release();
        if let Some(props) = self.properties.as_mut() {
            freed += props.release();
        }
        freed
    }
}

/// Lock-step iteration over the targets and properties of one node.
#[derive(Clone, Debug)]
pub struct RelationshipCursor<'a> {
    targets: Cursor<'a>,
    properties: PropertyCursor<'a>,
}

impl<'a> RelationshipCursor<'a> {
    /// Relationships not consumed yet.
    pub fn remaining(&self) -> usize {
        self.targets.remaining()
    }

    /// Splits into the target and property cursors.
    pub fn into_parts(self) -> (Cursor<'a>, PropertyCursor<'a>) {
        (self.targets, self.properties)
    }
}

impl Iterator for RelationshipCursor<'_> {
    type Item = (u64, f64);

    fn next(&mut self) -> Option<(u64, f64)> {
        if !self.targets.has_next() {
            return None;
        }
        let target = self.targets.next_target();
        Some((target, self.properties.next_f64()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}
