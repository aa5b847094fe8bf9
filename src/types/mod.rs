#![forbid(unsafe_code)]
//! Shared identifiers, sentinels and the crate-wide error type.

/// Sentinel returned by positional cursor queries that run out of targets.
///
/// No legal node id can take this value because ids are bounded by
/// [`MAX_NODE_ID`].
pub const NOT_FOUND: u64 = u64::MAX;

/// Largest node id that can be stored in an adjacency list.
///
/// Ids are limited to 63 bits so that every delta fits into at most nine
/// varint bytes.
pub const MAX_NODE_ID: u64 = i64::MAX as u64;

/// Errors raised at the build, configuration and verification boundaries.
///
/// Cursor and decoder hot paths never return these; precondition violations
/// there panic instead.
#[derive(thiserror::Error, Debug)]
pub enum SombraError {
    /// Underlying I/O failure while reading configuration.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// Encoded bytes could not be decoded.
    #[error("corruption: {0}")]
    Corruption(&'static str),
    /// An argument or state precondition was violated.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// A node id at or beyond the list's node count.
    #[error("node {node} out of range (node count {node_count})")]
    NodeOutOfRange {
        /// Offending id.
        node: u64,
        /// Node count of the list.
        node_count: usize,
    },
    /// A builder received the same source node twice.
    #[error("adjacency for node {0} was already written")]
    DuplicateNode(u64),
    /// Property values do not line up with the targets they annotate.
    #[error("property count mismatch: expected {expected}, got {actual}")]
    PropertyMismatch {
        /// Number of targets.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// Configuration could not be parsed.
    #[error("config: {0}")]
    Config(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SombraError>;

impl SombraError {
    pub(crate) fn node_out_of_range(node: u64, node_count: usize) -> Self {
        SombraError::NodeOutOfRange { node, node_count }
    }
}
