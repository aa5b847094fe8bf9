//! Block decoding and cursors over adjacency and property blocks.

pub mod composite;
pub mod cursor;
pub mod decoder;
pub mod property;

pub use composite::{CompositeCursor, CursorSet};
pub use cursor::{
    AdjacencyCursor, CompressedCursor, Cursor, EmptyCursor, Targets, UncompressedCursor,
};
pub use decoder::{AdjacencyDecoder, CHUNK_SIZE};
pub use property::PropertyCursor;
