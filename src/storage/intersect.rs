//! Merge-join neighbor intersection for triangle enumeration.
//!
//! For a source `a`, every neighbor `b > a` and every common neighbor
//! `c > b` of `a` and `b` form a triangle `(a, b, c)`. Requiring `a < b < c`
//! makes each triangle of an undirected graph appear exactly once across all
//! sources.

use crate::storage::adjacency::AdjacencyCursor;
use crate::storage::list::AdjacencyList;
use crate::storage::metrics::AdjacencyMetrics;
use crate::types::NOT_FOUND;

/// A node space that hands out reusable cursors.
pub trait CursorSource: Sync {
    /// Cursor type borrowing from the source.
    type Cursor<'s>: AdjacencyCursor
    where
        Self: 's;

    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Number of relationships of `node`.
    fn degree(&self, node: u64) -> usize;

    /// Cursor over the targets of `node`, reusing `reuse` when possible.
    fn cursor_into<'s>(&'s self, reuse: Option<Self::Cursor<'s>>, node: u64) -> Self::Cursor<'s>;

    /// Metrics sink, if the source carries one.
    fn metrics(&self) -> Option<&dyn AdjacencyMetrics> {
        None
    }
}

impl CursorSource for AdjacencyList {
    type Cursor<'s> = crate::storage::adjacency::Cursor<'s>;

    fn node_count(&self) -> usize {
        AdjacencyList::node_count(self)
    }

    #[inline]
    fn degree(&self, node: u64) -> usize {
        AdjacencyList::degree(self, node)
    }

    #[inline]
    fn cursor_into<'s>(&'s self, reuse: Option<Self::Cursor<'s>>, node: u64) -> Self::Cursor<'s> {
        AdjacencyList::cursor_into(self, reuse, node)
    }

    fn metrics(&self) -> Option<&dyn AdjacencyMetrics> {
        Some(AdjacencyList::metrics(self))
    }
}

/// Receives triangles found by [`RelationshipIntersect`].
pub trait IntersectionConsumer {
    /// Called once per triangle with `a < b < c`.
    fn accept(&mut self, a: u64, b: u64, c: u64);
}

impl<F: FnMut(u64, u64, u64)> IntersectionConsumer for F {
    #[inline]
    fn accept(&mut self, a: u64, b: u64, c: u64) {
        self(a, b, c)
    }
}

/// Triangle enumerator anchored at one source node at a time.
///
/// Holds three reusable cursors, so one instance per thread enumerates any
/// number of sources without allocating.
pub struct RelationshipIntersect<'s, S: CursorSource + ?Sized + 's> {
    source: &'s S,
    max_degree: u64,
    main: Option<S::Cursor<'s>>,
    fork: Option<S::Cursor<'s>>,
    other: Option<S::Cursor<'s>>,
}

impl<'s, S: CursorSource + ?Sized + 's> RelationshipIntersect<'s, S> {
    /// Creates an intersector over `source`. Nodes with a degree above
    /// `max_degree` never take part in a reported triangle.
    pub fn new(source: &'s S, max_degree: u64) -> Self {
        Self {
            source,
            max_degree,
            main: None,
            fork: None,
            other: None,
        }
    }

    /// Degree limit.
    pub fn max_degree(&self) -> u64 {
        self.max_degree
    }

    #[inline]
    fn admits(&self, node: u64) -> bool {
        self.source.degree(node) as u64 <= self.max_degree
    }

    /// Reports every triangle `(a, b, c)` with `a < b < c` to `consumer`.
    /// Triangles through a node rejected by the degree filter are never
    /// reported, whichever corner it occupies.
    ///
    /// Returns `false` when the degree filter rejected `a`.
    pub fn intersect_all<C: IntersectionConsumer + ?Sized>(&mut self, a: u64, consumer: &mut C) -> bool {
        if !self.admits(a) {
            return false;
        }
        let source = self.source;
        let mut main = source.cursor_into(self.main.take(), a);
        let mut fork = self.fork.take();
        let mut other = self.other.take();

        let mut b = main.skip_until(a);
        while b != NOT_FOUND {
            if self.admits(b) {
                let mut follow_b = source.cursor_into(other.take(), b);
                let c0 = follow_b.skip_until(b);
                if c0 != NOT_FOUND {
                    let mut follow_a = main.shallow_copy(fork.take());
                    let admits = |node: u64| self.admits(node);
                    merge(a, b, c0, &mut follow_a, &mut follow_b, &admits, consumer);
                    fork = Some(follow_a);
                }
                other = Some(follow_b);
            }
            b = main.skip_until(b);
        }

        self.main = Some(main);
        self.fork = fork;
        self.other = other;
        true
    }
}

/// Walks `a`'s remaining neighbors against `b`'s neighbors starting at `c0`,
/// always stepping the side with fewer remaining targets past a match.
/// Matches rejected by `admits` are stepped over without being reported.
fn merge<K, F, C>(
    a: u64,
    b: u64,
    c0: u64,
    from_a: &mut K,
    from_b: &mut K,
    admits: &F,
    consumer: &mut C,
) where
    K: AdjacencyCursor,
    F: Fn(u64) -> bool,
    C: IntersectionConsumer + ?Sized,
{
    let mut last_c = b;
    let mut x = from_a.advance(c0);
    let mut y = c0;
    while x != NOT_FOUND && y != NOT_FOUND {
        if x < y {
            x = from_a.advance(y);
        } else if y < x {
            y = from_b.advance(x);
        } else {
            if x > last_c && admits(x) {
                consumer.accept(a, b, x);
                last_c = x;
            }
            if from_a.remaining() <= from_b.remaining() {
                x = from_a.skip_until(x);
            } else {
                y = from_b.skip_until(y);
            }
        }
    }
}
