//! Block decoder for delta-encoded adjacency lists.
//!
//! Targets are decoded [`CHUNK_SIZE`] at a time into a local buffer; seeking
//! skips whole buffered blocks by comparing against the last element before
//! scanning inside one. The decoder does not know the list length: every call
//! receives the number of targets the owning cursor has not consumed yet.

use crate::primitives::bytes::delta;
use crate::types::NOT_FOUND;

/// Number of targets decoded per block.
pub const CHUNK_SIZE: usize = 64;

/// Stateful decoder over one compressed adjacency block.
#[derive(Clone, Debug)]
pub struct AdjacencyDecoder<'a> {
    page: &'a [u8],
    offset: usize,
    block: [u64; CHUNK_SIZE],
    pos: usize,
}

impl Default for AdjacencyDecoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AdjacencyDecoder<'a> {
    /// Creates a decoder bound to nothing.
    pub const fn new() -> Self {
        Self {
            page: &[],
            offset: 0,
            block: [0; CHUNK_SIZE],
            pos: CHUNK_SIZE,
        }
    }

    /// Binds the decoder to the block at `page[offset..]` and decodes the first
    /// chunk. Returns `degree`.
    pub fn reset(&mut self, page: &'a [u8], offset: usize, degree: usize) -> usize {
        self.page = page;
        let n = degree.min(CHUNK_SIZE);
        self.offset = delta::decode_block(0, page, offset, &mut self.block[..n]);
        self.pos = 0;
        degree
    }

    /// Returns the next target and advances by one.
    ///
    /// `remaining` must be non-zero.
    #[inline]
    pub fn next(&mut self, remaining: usize) -> u64 {
        if self.pos == CHUNK_SIZE {
            self.refill(remaining);
        }
        let value = self.block[self.pos];
        self.pos += 1;
        value
    }

    /// Returns the next target without consuming it.
    ///
    /// `remaining` must be non-zero.
    #[inline]
    pub fn peek(&mut self, remaining: usize) -> u64 {
        if self.pos == CHUNK_SIZE {
            self.refill(remaining);
        }
        self.block[self.pos]
    }

    /// Consumes targets up to and including the first one strictly greater
    /// than `target`, which is returned.
    ///
    /// `consumed` receives the number of targets stepped over, the returned
    /// one included. When no such target exists the decoder is left exhausted,
    /// `consumed == remaining` and [`NOT_FOUND`] is returned.
    pub fn skip_until(&mut self, target: u64, remaining: usize, consumed: &mut usize) -> u64 {
        self.seek(remaining, consumed, |last| last <= target, |v| v > target)
    }

    /// Like [`Self::skip_until`] but stops at the first target greater than
    /// or equal to `target`.
    pub fn advance(&mut self, target: u64, remaining: usize, consumed: &mut usize) -> u64 {
        self.seek(remaining, consumed, |last| last < target, |v| v >= target)
    }

    /// Copies the complete decoding state of `other`.
    pub fn copy_from(&mut self, other: &AdjacencyDecoder<'a>) {
        self.page = other.page;
        self.offset = other.offset;
        self.block = other.block;
        self.pos = other.pos;
    }

    #[inline]
    fn seek(
        &mut self,
        remaining: usize,
        consumed: &mut usize,
        skip_block: impl Fn(u64) -> bool,
        hit: impl Fn(u64) -> bool,
    ) -> u64 {
        let mut available = remaining;
        if self.pos == CHUNK_SIZE && available > 0 {
            self.refill(available);
        }
        // Every buffered value is behind the target and more blocks follow.
        while available > CHUNK_SIZE - self.pos && skip_block(self.block[CHUNK_SIZE - 1]) {
            available -= CHUNK_SIZE - self.pos;
            self.refill(available);
        }
        let start = self.pos;
        let limit = (start + available).min(CHUNK_SIZE);
        match self.block[start..limit].iter().position(|&v| hit(v)) {
            Some(idx) => {
                let found = start + idx;
                *consumed = remaining - available + idx + 1;
                self.pos = found + 1;
                self.block[found]
            }
            None => {
                *consumed = remaining;
                self.pos = limit;
                NOT_FOUND
            }
        }
    }

    /// Decodes the next chunk, continuing from the last target of the
    /// current full chunk.
    fn refill(&mut self, remaining: usize) {
        debug_assert!(remaining > 0, "decode past the end of an adjacency block");
        let base = self.block[CHUNK_SIZE - 1];
        let n = remaining.min(CHUNK_SIZE);
        self.offset = delta::decode_block(base, self.page, self.offset, &mut self.block[..n]);
        self.pos = 0;
    }
}
