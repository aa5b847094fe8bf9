//! Sombra CSR: an in-memory, read-optimized adjacency engine.
//!
//! Each relationship type is stored as a compressed sparse row list: a degree
//! table, an offset table and delta/varint encoded target blocks in a paged
//! arena. Cursors decode targets lazily and support skip/advance seeking,
//! which the merge-join intersector uses for triangle enumeration.

#![warn(missing_docs)]

pub mod admin;
pub mod primitives;
pub mod storage;
pub mod types;
