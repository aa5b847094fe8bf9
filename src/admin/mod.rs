#![forbid(unsafe_code)]

//! Inspection utilities for built adjacency lists.
//!
//! Provides serializable statistics reports and structural verification of
//! the degree/offset tables and encoded blocks.

mod stats;
mod verify;

/// Statistics collection and reporting.
///
/// Summarizes table sizes, degree distribution and arena usage of a list.
pub use stats::{
    relationship_stats, stats, DegreeStatsSection, MemoryStatsSection, PropertyStatsSection,
    StatsReport,
};

/// Structural verification.
///
/// Checks table agreement and block bounds, optionally decoding every block.
pub use verify::{
    verify, verify_relationships, VerifyCounts, VerifyFinding, VerifyLevel, VerifyReport,
    VerifySeverity,
};
