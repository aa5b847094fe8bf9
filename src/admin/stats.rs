use serde::Serialize;

use crate::storage::{AdjacencyList, AdjacencyStats, Relationships};

/// Statistics report for one relationship type.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Table and arena summary.
    pub adjacency: AdjacencyStats,
    /// Degree distribution.
    pub degrees: DegreeStatsSection,
    /// Space usage derived from the arena counters.
    pub memory: MemoryStatsSection,
    /// Property list summary, when one exists.
    pub properties: Option<PropertyStatsSection>,
}

/// Degree distribution of a list.
#[derive(Debug, Clone, Serialize)]
pub struct DegreeStatsSection {
    /// Smallest degree.
    pub min: u32,
    /// Largest degree.
    pub max: u32,
    /// Mean degree.
    pub mean: f64,
    /// Median degree.
    pub p50: u32,
    /// 99th percentile degree.
    pub p99: u32,
    /// Nodes without outgoing relationships.
    pub isolated_nodes: usize,
}

/// Space usage of a list.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryStatsSection {
    /// Arena pages plus the degree and offset tables.
    pub total_bytes: usize,
    /// Encoded block bytes per stored relationship.
    pub bytes_per_relationship: f64,
    /// Used over allocated arena bytes.
    pub page_fill_ratio: f64,
}

/// Space usage of a property list.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyStatsSection {
    /// Bytes held by the property arena.
    pub allocated_bytes: usize,
}

/// Collects statistics for an adjacency list.
pub fn stats(list: &AdjacencyList) -> StatsReport {
    let adjacency = list.stats();
    let degrees = degree_section(list.degrees());
    let total_bytes = adjacency.allocated_bytes + adjacency.table_bytes;
    let memory = MemoryStatsSection {
        total_bytes,
        bytes_per_relationship: ratio(adjacency.used_bytes, adjacency.relationship_count as usize),
        page_fill_ratio: ratio(adjacency.used_bytes, adjacency.allocated_bytes),
    };
    StatsReport {
        adjacency,
        degrees,
        memory,
        properties: None,
    }
}

/// Like [`stats`], including the property list of `relationships`.
pub fn relationship_stats(relationships: &Relationships) -> StatsReport {
    let mut report = stats(relationships.adjacency());
    report.properties = relationships
        .properties()
        .map(|props| PropertyStatsSection {
            allocated_bytes: props.size_in_bytes(),
        });
    report
}

fn degree_section(degrees: &[u32]) -> DegreeStatsSection {
    if degrees.is_empty() {
        return DegreeStatsSection {
            min: 0,
            max: 0,
            mean: 0.0,
            p50: 0,
            p99: 0,
            isolated_nodes: 0,
        };
    }
    let mut sorted = degrees.to_vec();
    sorted.sort_unstable();
    let total: u64 = sorted.iter().map(|d| u64::from(*d)).sum();
    let percentile = |p: usize| sorted[((sorted.len() - 1) * p) / 100];
    DegreeStatsSection {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: total as f64 / sorted.len() as f64,
        p50: percentile(50),
        p99: percentile(99),
        isolated_nodes: sorted.iter().take_while(|d| **d == 0).count(),
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
