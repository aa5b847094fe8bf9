//! Union cursor over several adjacency lists of the same node.

use smallvec::SmallVec;

use crate::storage::adjacency::cursor::{AdjacencyCursor, Cursor};
use crate::types::NOT_FOUND;

/// Child cursors kept inline for the common case of a handful of types.
pub type CursorSet<'a> = SmallVec<[Cursor<'a>; 4]>;

/// Merges the sorted targets of several cursors into one sorted stream.
///
/// Parallel targets across children are all yielded. Each child's next target
/// is held in `heads`, so a child contributes `heads[i] != NOT_FOUND` plus its
/// own remaining count.
#[derive(Clone, Debug, Default)]
pub struct CompositeCursor<'a> {
    cursors: CursorSet<'a>,
    heads: SmallVec<[u64; 4]>,
    size: usize,
}

impl<'a> CompositeCursor<'a> {
    /// Builds a union of `cursors`, each positioned at its first target.
    pub fn new(cursors: impl IntoIterator<Item = Cursor<'a>>) -> Self {
        let mut composite = Self::default();
        composite.init(cursors);
        composite
    }

    /// Rebinds the union to a fresh set of child cursors.
    pub fn init(&mut self, cursors: impl IntoIterator<Item = Cursor<'a>>) {
        self.cursors.clear();
        self.heads.clear();
        self.size = 0;
        for mut cursor in cursors {
            self.size += cursor.remaining();
            let head = if cursor.has_next() {
                cursor.next_target()
            } else {
                NOT_FOUND
            };
            self.heads.push(head);
            self.cursors.push(cursor);
        }
    }

    /// Releases the child cursors for reuse.
    pub fn into_cursors(self) -> CursorSet<'a> {
        self.cursors
    }

    fn min_head(&self) -> Option<usize> {
        self.heads
            .iter()
            .enumerate()
            .filter(|(_, head)| **head != NOT_FOUND)
            .min_by_key(|(_, head)| **head)
            .map(|(idx, _)| idx)
    }

    fn pop(&mut self, idx: usize) -> u64 {
        let value = self.heads[idx];
        let cursor = &mut self.cursors[idx];
        self.heads[idx] = if cursor.has_next() {
            cursor.next_target()
        } else {
            NOT_FOUND
        };
        value
    }

    fn seek(&mut self, behind: impl Fn(u64) -> bool, step: impl Fn(&mut Cursor<'a>) -> u64) -> u64 {
        for (head, cursor) in self.heads.iter_mut().zip(self.cursors.iter_mut()) {
            if *head != NOT_FOUND && behind(*head) {
                *head = step(cursor);
            }
        }
        match self.min_head() {
            Some(idx) => self.pop(idx),
            None => NOT_FOUND,
        }
    }
}

impl AdjacencyCursor for CompositeCursor<'_> {
    fn size(&self) -> usize {
        self.size
    }

    fn remaining(&self) -> usize {
        self.heads
            .iter()
            .zip(self.cursors.iter())
            .map(|(head, cursor)| usize::from(*head != NOT_FOUND) + cursor.remaining())
            .sum()
    }

    fn next_target(&mut self) -> u64 {
        match self.min_head() {
            Some(idx) => self.pop(idx),
            None => panic!("next_target on an exhausted cursor"),
        }
    }

    fn peek_target(&mut self) -> u64 {
        self.min_head().map(|idx| self.heads[idx]).unwrap_or(NOT_FOUND)
    }

    fn skip_until(&mut self, target: u64) -> u64 {
        if self.remaining() == 0 {
            return NOT_FOUND;
        }
        self.seek(|head| head <= target, |cursor| cursor.skip_until(target))
    }

    fn advance(&mut self, target: u64) -> u64 {
        if self.remaining() == 0 {
            return NOT_FOUND;
        }
        self.seek(|head| head < target, |cursor| cursor.advance(target))
    }

    fn shallow_copy(&self, reuse: Option<Self>) -> Self {
        let (spare, mut heads): (CursorSet<'_>, SmallVec<[u64; 4]>) = match reuse {
            Some(dest) => (dest.cursors, dest.heads),
            None => Default::default(),
        };
        heads.clear();
        heads.extend_from_slice(&self.heads);
        let mut spare = spare.into_iter();
        let cursors = self
            .cursors
            .iter()
            .map(|cursor| cursor.shallow_copy(spare.next()))
            .collect();
        Self {
            cursors,
            heads,
            size: self.size,
        }
    }
}
