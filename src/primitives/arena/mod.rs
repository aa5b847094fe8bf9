#![forbid(unsafe_code)]
//! Paged byte arena backing variable-sized adjacency and property blocks.
//!
//! Logical offsets are split into a page index and an index inside that page
//! with compile-time shifts, so resolving an offset never allocates and never
//! searches. Blocks never straddle a page boundary; a block larger than one
//! page gets a dedicated oversized page that still occupies a single slot.

use tracing::{debug, trace};

use crate::types::{Result, SombraError};

/// Number of offset bits addressing bytes inside a page.
pub const PAGE_SHIFT: u32 = 18;
/// Capacity of a regular page in bytes.
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;
/// Mask selecting the in-page part of a logical offset.
pub const PAGE_MASK: u64 = (PAGE_SIZE as u64) - 1;
/// Bytes kept unused at the start of page 0 so that offset `0` can mean
/// "no block".
pub const ARENA_RESERVED_BYTES: usize = 8;

/// Page slot of a logical offset.
#[inline]
pub const fn page_index(offset: u64) -> usize {
    (offset >> PAGE_SHIFT) as usize
}

/// Position of a logical offset inside its page.
#[inline]
pub const fn index_in_page(offset: u64) -> usize {
    (offset & PAGE_MASK) as usize
}

/// Logical offset of the first byte of page `page`.
#[inline]
pub const fn page_start(page: usize) -> u64 {
    (page as u64) << PAGE_SHIFT
}

/// Handle to a page slot returned by [`PagedArena::allocate_page`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageHandle(pub usize);

impl PageHandle {
    /// Logical offset of the first byte of this page.
    pub fn offset(self) -> u64 {
        page_start(self.0)
    }
}

/// Owner of all pages of one adjacency or property list.
#[derive(Debug, Default)]
pub struct PagedArena {
    pages: Vec<Box<[u8]>>,
    head: u64,
    allocated_bytes: usize,
    used_bytes: usize,
    released: bool,
}

impl PagedArena {
    /// Creates an empty arena. No page is allocated until the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a zero-filled page and moves the write head to its start.
    pub fn allocate_page(&mut self) -> PageHandle {
        let handle = self.push_page(PAGE_SIZE);
        self.head = handle.offset();
        if handle.0 == 0 {
            self.head = ARENA_RESERVED_BYTES as u64;
        }
        handle
    }

    /// Reserves `len` contiguous bytes and returns their logical offset along
    /// with the writable region.
    ///
    /// The returned offset is never `0`. Requests that do not fit the rest of
    /// the current page start on a fresh page; requests larger than
    /// [`PAGE_SIZE`] receive a dedicated page sized to fit.
    pub fn allocate(&mut self, len: usize) -> Result<(u64, &mut [u8])> {
        if self.released {
            return Err(SombraError::Invalid("arena already released"));
        }
        if len == 0 {
            return Err(SombraError::Invalid("zero-length arena allocation"));
        }
        if self.pages.is_empty() {
            self.allocate_page();
        }
        let page = page_index(self.head);
        let start = index_in_page(self.head);
        let (slot, in_page) = if len > PAGE_SIZE {
            let handle = self.push_page(len);
            self.head = page_start(handle.0 + 1);
            trace!(page = handle.0, len, "arena.allocate.oversized");
            (handle.0, 0)
        } else if page < self.pages.len() && start + len <= self.pages[page].len() {
            self.head += len as u64;
            (page, start)
        } else {
            let handle = self.allocate_page();
            self.head += len as u64;
            (handle.0, 0)
        };
        self.used_bytes += len;
        let offset = page_start(slot) + in_page as u64;
        Ok((offset, &mut self.pages[slot][in_page..in_page + len]))
    }

    /// Resolves a logical offset to its page and the index inside it.
    ///
    /// Panics when the offset lies beyond the last allocated page.
    #[inline]
    pub fn resolve(&self, offset: u64) -> (&[u8], usize) {
        (&self.pages[page_index(offset)], index_in_page(offset))
    }

    /// Returns the page stored in `handle`'s slot.
    pub fn page(&self, handle: PageHandle) -> &[u8] {
        &self.pages[handle.0]
    }

    /// Number of allocated page slots.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Bytes held by allocated pages, including unused tails.
    pub fn size_in_bytes(&self) -> usize {
        self.allocated_bytes
    }

    /// Bytes handed out by [`Self::allocate`].
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Whether [`Self::release`] has been called.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Returns `true` when `offset..offset + len` lies inside an allocated page.
    pub fn contains(&self, offset: u64, len: usize) -> bool {
        let page = page_index(offset);
        let start = index_in_page(offset);
        self.pages
            .get(page)
            .map(|p| start.checked_add(len).is_some_and(|end| end <= p.len()))
            .unwrap_or(false)
    }

    /// Drops every page and returns the number of bytes freed.
    ///
    /// Calling it again returns `0`.
    pub fn release(&mut self) -> usize {
        if self.released {
            return 0;
        }
        let freed = self.allocated_bytes;
        let pages = self.pages.len();
        self.pages = Vec::new();
        self.allocated_bytes = 0;
        self.used_bytes = 0;
        self.head = 0;
        self.released = true;
        debug!(pages, freed, "arena.release");
        freed
    }

    fn push_page(&mut self, len: usize) -> PageHandle {
        let slot = self.pages.len();
        self.pages.push(vec![0u8; len].into_boxed_slice());
        self.allocated_bytes += len;
        trace!(page = slot, len, "arena.allocate_page");
        PageHandle(slot)
    }
}
