//! Cursor over relationship property blocks.

use crate::primitives::arena::PagedArena;
use crate::primitives::bytes::le;

const VALUE_LEN: usize = 8;

#[derive(Clone, Copy, Debug)]
enum Source<'a> {
    Arena(&'a PagedArena),
    Constant(u64),
}

/// Reads the raw 64-bit property values stored next to an adjacency list.
///
/// Values are consumed in lock step with the targets of the same node. A
/// cursor created with [`PropertyCursor::constant`] yields one fixed value
/// `degree` times instead; it stands in for relationship types that carry no
/// property.
#[derive(Clone, Copy, Debug)]
pub struct PropertyCursor<'a> {
    source: Source<'a>,
    page: &'a [u8],
    base: usize,
    size: usize,
    position: usize,
}

impl<'a> PropertyCursor<'a> {
    /// Creates an unbound cursor over `arena`.
    pub fn new(arena: &'a PagedArena) -> Self {
        Self {
            source: Source::Arena(arena),
            page: &[],
            base: 0,
            size: 0,
            position: 0,
        }
    }

    /// Creates a cursor that yields `bits` for each of `degree` relationships.
    pub fn constant(bits: u64, degree: usize) -> Self {
        Self {
            source: Source::Constant(bits),
            page: &[],
            base: 0,
            size: degree,
            position: 0,
        }
    }

    /// Binds the cursor to the block at `offset` holding `degree` values.
    ///
    /// A constant cursor only resets its position and size.
    pub fn init(&mut self, offset: u64, degree: usize) {
        self.size = degree;
        self.position = 0;
        if let Source::Arena(arena) = self.source {
            if degree > 0 {
                let (page, idx) = arena.resolve(offset);
                self.page = page;
                self.base = idx;
            }
        }
    }

    pub(crate) fn attach(&mut self, arena: &'a PagedArena) {
        self.source = Source::Arena(arena);
    }

    /// Whether this cursor yields a fixed value.
    pub fn is_constant(&self) -> bool {
        matches!(self.source, Source::Constant(_))
    }

    /// Number of values the cursor was initialised with.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Values not consumed yet.
    pub fn remaining(&self) -> usize {
        self.size - self.position
    }

    /// Whether another value can be read.
    #[inline]
    pub fn has_next_long(&self) -> bool {
        self.position < self.size
    }

    /// Consumes the next raw value.
    ///
    /// Panics when the cursor is exhausted.
    #[inline]
    pub fn next_long(&mut self) -> u64 {
        assert!(self.position < self.size, "next_long on an exhausted cursor");
        let value = match self.source {
            Source::Arena(_) => le::get_u64(self.page, self.base + self.position * VALUE_LEN),
            Source::Constant(bits) => bits,
        };
        self.position += 1;
        value
    }

    /// Consumes the next value as an IEEE-754 double.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from_bits(self.next_long())
    }
}
