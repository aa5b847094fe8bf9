//! Cursor contract and the concrete cursors over adjacency blocks.

use crate::primitives::arena::PagedArena;
use crate::primitives::bytes::le;
use crate::storage::adjacency::decoder::AdjacencyDecoder;
use crate::types::NOT_FOUND;

const DEGREE_PREFIX_LEN: usize = 4;
const TARGET_LEN: usize = 8;

/// Forward-only iteration over the sorted targets of one node.
///
/// Cursors borrow the pages of their list and keep all iteration state local,
/// so any number of them may read the same list at once.
pub trait AdjacencyCursor: Sized {
    /// Total number of targets the cursor was initialised with.
    fn size(&self) -> usize;

    /// Targets not consumed yet.
    fn remaining(&self) -> usize;

    /// Whether another target can be read.
    #[inline]
    fn has_next(&self) -> bool {
        self.remaining() > 0
    }

    /// Consumes and returns the next target.
    ///
    /// Panics when the cursor is exhausted.
    fn next_target(&mut self) -> u64;

    /// Returns the next target without consuming it, or [`NOT_FOUND`] when
    /// the cursor is exhausted.
    fn peek_target(&mut self) -> u64;

    /// Consumes targets up to and including the first one strictly greater
    /// than `target` and returns it, or [`NOT_FOUND`] once exhausted.
    fn skip_until(&mut self, target: u64) -> u64;

    /// Consumes targets up to and including the first one greater than or
    /// equal to `target` and returns it, or [`NOT_FOUND`] once exhausted.
    fn advance(&mut self, target: u64) -> u64;

    /// Returns an independent cursor at the same position.
    ///
    /// A compatible `reuse` instance is overwritten and returned instead of
    /// building a new one.
    fn shallow_copy(&self, reuse: Option<Self>) -> Self;

    /// Turns the cursor into an iterator over its remaining targets.
    fn into_targets(self) -> Targets<Self> {
        Targets(self)
    }
}

/// Iterator adapter returned by [`AdjacencyCursor::into_targets`].
#[derive(Debug)]
pub struct Targets<C>(C);

impl<C: AdjacencyCursor> Iterator for Targets<C> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.0.has_next() {
            Some(self.0.next_target())
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.remaining();
        (n, Some(n))
    }
}

impl<C: AdjacencyCursor> ExactSizeIterator for Targets<C> {}

/// Cursor over a delta/varint compressed block.
#[derive(Clone, Debug)]
pub struct CompressedCursor<'a> {
    arena: &'a PagedArena,
    decoder: AdjacencyDecoder<'a>,
    size: usize,
    position: usize,
}

impl<'a> CompressedCursor<'a> {
    /// Creates an unbound cursor over `arena`; call [`Self::init`] before use.
    pub fn new(arena: &'a PagedArena) -> Self {
        Self {
            arena,
            decoder: AdjacencyDecoder::new(),
            size: 0,
            position: 0,
        }
    }

    /// Binds the cursor to the block at `offset` holding `degree` targets.
    pub fn init(&mut self, offset: u64, degree: usize) {
        self.size = degree;
        self.position = 0;
        if degree > 0 {
            let (page, idx) = self.arena.resolve(offset);
            self.decoder.reset(page, idx, degree);
        }
    }

    pub(crate) fn attach(&mut self, arena: &'a PagedArena) {
        self.arena = arena;
    }
}

impl AdjacencyCursor for CompressedCursor<'_> {
    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.size - self.position
    }

    #[inline]
    fn next_target(&mut self) -> u64 {
        assert!(self.position < self.size, "next_target on an exhausted cursor");
        let value = self.decoder.next(self.remaining());
        self.position += 1;
        value
    }

    #[inline]
    fn peek_target(&mut self) -> u64 {
        match self.remaining() {
            0 => NOT_FOUND,
            remaining => self.decoder.peek(remaining),
        }
    }

    fn skip_until(&mut self, target: u64) -> u64 {
        let remaining = self.remaining();
        if remaining == 0 {
            return NOT_FOUND;
        }
        let mut consumed = 0;
        let value = self.decoder.skip_until(target, remaining, &mut consumed);
        self.position += consumed;
        value
    }

    fn advance(&mut self, target: u64) -> u64 {
        let remaining = self.remaining();
        if remaining == 0 {
            return NOT_FOUND;
        }
        let mut consumed = 0;
        let value = self.decoder.advance(target, remaining, &mut consumed);
        self.position += consumed;
        value
    }

    fn shallow_copy(&self, reuse: Option<Self>) -> Self {
        match reuse {
            Some(mut dest) => {
                dest.arena = self.arena;
                dest.decoder.copy_from(&self.decoder);
                dest.size = self.size;
                dest.position = self.position;
                dest
            }
            None => self.clone(),
        }
    }
}

/// Cursor over an uncompressed block: a little-endian `u32` degree followed
/// by raw little-endian `u64` targets.
///
/// Seeking uses binary search over the untouched tail.
#[derive(Clone, Copy, Debug)]
pub struct UncompressedCursor<'a> {
    arena: &'a PagedArena,
    page: &'a [u8],
    base: usize,
    size: usize,
    position: usize,
}

impl<'a> UncompressedCursor<'a> {
    /// Creates an unbound cursor over `arena`; call [`Self::init`] before use.
    pub fn new(arena: &'a PagedArena) -> Self {
        Self {
            arena,
            page: &[],
            base: 0,
            size: 0,
            position: 0,
        }
    }

    /// Binds the cursor to the block at `offset` holding `degree` targets.
    pub fn init(&mut self, offset: u64, degree: usize) {
        self.size = degree;
        self.position = 0;
        if degree > 0 {
            let (page, idx) = self.arena.resolve(offset);
            debug_assert_eq!(
                le::get_u32(page, idx) as usize,
                degree,
                "degree prefix disagrees with degree table"
            );
            self.page = page;
            self.base = idx + DEGREE_PREFIX_LEN;
        }
    }

    pub(crate) fn attach(&mut self, arena: &'a PagedArena) {
        self.arena = arena;
    }

    #[inline]
    fn target_at(&self, index: usize) -> u64 {
        le::get_u64(self.page, self.base + index * TARGET_LEN)
    }

    /// First index in `position..size` whose target satisfies `hit`, which
    /// must be monotone over the sorted tail.
    fn search(&mut self, hit: impl Fn(u64) -> bool) -> u64 {
        let (mut lo, mut hi) = (self.position, self.size);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if hit(self.target_at(mid)) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        if lo == self.size {
            self.position = self.size;
            NOT_FOUND
        } else {
            self.position = lo + 1;
            self.target_at(lo)
        }
    }
}

impl AdjacencyCursor for UncompressedCursor<'_> {
    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.size - self.position
    }

    #[inline]
    fn next_target(&mut self) -> u64 {
        assert!(self.position < self.size, "next_target on an exhausted cursor");
        let value = self.target_at(self.position);
        self.position += 1;
        value
    }

    #[inline]
    fn peek_target(&mut self) -> u64 {
        if self.position < self.size {
            self.target_at(self.position)
        } else {
            NOT_FOUND
        }
    }

    fn skip_until(&mut self, target: u64) -> u64 {
        if self.remaining() == 0 {
            return NOT_FOUND;
        }
        self.search(|v| v > target)
    }

    fn advance(&mut self, target: u64) -> u64 {
        if self.remaining() == 0 {
            return NOT_FOUND;
        }
        self.search(|v| v >= target)
    }

    fn shallow_copy(&self, _reuse: Option<Self>) -> Self {
        *self
    }
}

/// Cursor for nodes without relationships. Carries no state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyCursor;

impl EmptyCursor {
    /// Accepts only degree `0`; the offset is ignored.
    pub fn init(&mut self, _offset: u64, degree: usize) {
        debug_assert_eq!(degree, 0, "empty cursor bound to a non-empty block");
    }
}

impl AdjacencyCursor for EmptyCursor {
    fn size(&self) -> usize {
        0
    }

    fn remaining(&self) -> usize {
        0
    }

    fn next_target(&mut self) -> u64 {
        panic!("next_target on an exhausted cursor")
    }

    fn peek_target(&mut self) -> u64 {
        NOT_FOUND
    }

    fn skip_until(&mut self, _target: u64) -> u64 {
        NOT_FOUND
    }

    fn advance(&mut self, _target: u64) -> u64 {
        NOT_FOUND
    }

    fn shallow_copy(&self, _reuse: Option<Self>) -> Self {
        EmptyCursor
    }
}

/// Cursor handed out by [`crate::storage::AdjacencyList`].
#[derive(Clone, Debug)]
pub enum Cursor<'a> {
    /// Delta/varint encoded list.
    Compressed(CompressedCursor<'a>),
    /// Raw `u64` list.
    Uncompressed(UncompressedCursor<'a>),
    /// Degree-0 node.
    Empty(EmptyCursor),
}

impl Cursor<'_> {
    /// Short name of the active representation.
    pub fn kind(&self) -> &'static str {
        match self {
            Cursor::Compressed(_) => "compressed",
            Cursor::Uncompressed(_) => "uncompressed",
            Cursor::Empty(_) => "empty",
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            Cursor::Compressed($c) => $body,
            Cursor::Uncompressed($c) => $body,
            Cursor::Empty($c) => $body,
        }
    };
}

impl AdjacencyCursor for Cursor<'_> {
    #[inline]
    fn size(&self) -> usize {
        dispatch!(self, c => c.size())
    }

    #[inline]
    fn remaining(&self) -> usize {
        dispatch!(self, c => c.remaining())
    }

    #[inline]
    fn next_target(&mut self) -> u64 {
        dispatch!(self, c => c.next_target())
    }

    #[inline]
    fn peek_target(&mut self) -> u64 {
        dispatch!(self, c => c.peek_target())
    }

    #[inline]
    fn skip_until(&mut self, target: u64) -> u64 {
        dispatch!(self, c => c.skip_until(target))
    }

    #[inline]
    fn advance(&mut self, target: u64) -> u64 {
        dispatch!(self, c => c.advance(target))
    }

    fn shallow_copy(&self, reuse: Option<Self>) -> Self {
        match (self, reuse) {
            (Cursor::Compressed(c), Some(Cursor::Compressed(dest))) => {
                Cursor::Compressed(c.shallow_copy(Some(dest)))
            }
            (Cursor::Compressed(c), _) => Cursor::Compressed(c.shallow_copy(None)),
            (Cursor::Uncompressed(c), _) => Cursor::Uncompressed(c.shallow_copy(None)),
            (Cursor::Empty(c), _) => Cursor::Empty(c.shallow_copy(None)),
        }
    }
}
