//! Low-level primitives for building the adjacency engine.
//!
//! Includes byte utilities and the paged arena that backs every list.

/// Paged byte arena.
///
/// Owns fixed-size pages addressed by shift/mask offset arithmetic.
pub mod arena;

/// Byte-level utilities and encoding/decoding.
///
/// Varints, delta blocks and fixed-width little-endian accessors.
pub mod bytes;
