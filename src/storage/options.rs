use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{Result, SombraError};

use super::metrics::AdjacencyMetrics;

/// On-page representation of adjacency blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Delta-encoded varints, decoded in chunks.
    #[default]
    DeltaVarLong,
    /// Four-byte degree prefix followed by raw eight-byte targets.
    Uncompressed,
}

impl Compression {
    /// Short label used in logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Compression::DeltaVarLong => "compressed",
            Compression::Uncompressed => "uncompressed",
        }
    }
}

/// Reduction applied to parallel relationships while building.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Keep every relationship, parallel ones included.
    #[default]
    None,
    /// Keep one relationship per target with its first property.
    Single,
    /// Keep one relationship per target, summing properties.
    Sum,
    /// Keep one relationship per target with the smallest property.
    Min,
    /// Keep one relationship per target with the largest property.
    Max,
    /// Keep one relationship per target whose property counts the merged
    /// relationships.
    Count,
}

impl Aggregation {
    /// Whether parallel relationships collapse into one.
    pub fn deduplicates(self) -> bool {
        !matches!(self, Aggregation::None)
    }

    pub(crate) fn merge(self, acc: f64, next: f64) -> f64 {
        match self {
            Aggregation::None | Aggregation::Single => acc,
            Aggregation::Sum => acc + next,
            Aggregation::Min => acc.min(next),
            Aggregation::Max => acc.max(next),
            Aggregation::Count => acc + 1.0,
        }
    }
}

/// Configuration for building an [`super::AdjacencyList`].
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjacencyOptions {
    /// Block representation for targets.
    pub compression: Compression,
    /// Handling of parallel relationships.
    pub aggregation: Aggregation,
    /// Whether a property list is built next to the adjacency list.
    pub property: bool,
    /// Optional metrics collection implementation
    #[serde(skip)]
    pub metrics: Option<Arc<dyn AdjacencyMetrics>>,
}

impl Default for AdjacencyOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AdjacencyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjacencyOptions")
            .field("compression", &self.compression)
            .field("aggregation", &self.aggregation)
            .field("property", &self.property)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AdjacencyOptions {
    /// Creates options for a compressed, non-aggregated list without properties.
    pub fn new() -> Self {
        Self {
            compression: Compression::DeltaVarLong,
            aggregation: Aggregation::None,
            property: false,
            metrics: None,
        }
    }

    /// Sets the block representation.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Sets how parallel relationships are reduced.
    pub fn aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Enables or disables the property list.
    pub fn property(mut self, enabled: bool) -> Self {
        self.property = enabled;
        self
    }

    /// Installs a metrics sink.
    pub fn metrics(mut self, metrics: Arc<dyn AdjacencyMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Parses options from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|err| SombraError::Config(err.to_string()))
    }

    /// Reads options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Settings for the parallel triangle driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriangleCountConfig {
    /// Threads in the pool the triangle driver runs on.
    pub concurrency: usize,
    /// Nodes with a larger degree take part in no triangle.
    pub max_degree: u64,
}

impl Default for TriangleCountConfig {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            max_degree: u64::MAX,
        }
    }
}

impl TriangleCountConfig {
    /// Sets the number of worker threads.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the degree filter.
    pub fn max_degree(mut self, max_degree: u64) -> Self {
        self.max_degree = max_degree;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(SombraError::Invalid("concurrency must be at least 1"));
        }
        Ok(())
    }
}
