//! In-memory encoder producing [`AdjacencyList`]s and their property lists.
//!
//! Each node's relationships are added once. They are sorted, optionally
//! aggregated, and written as one block; the degree and offset tables are
//! frozen by [`AdjacencyListBuilder::build`], which consumes the builder so no
//! writes can overlap reads.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::primitives::arena::PagedArena;
use crate::primitives::bytes::{delta, le};
use crate::storage::list::AdjacencyList;
use crate::storage::options::{AdjacencyOptions, Aggregation, Compression};
use crate::storage::properties::AdjacencyProperties;
use crate::storage::relationships::Relationships;
use crate::types::{Result, SombraError};

const DEGREE_PREFIX_LEN: usize = 4;
const VALUE_LEN: usize = 8;

/// Builds one relationship type node by node.
pub struct AdjacencyListBuilder {
    options: AdjacencyOptions,
    arena: PagedArena,
    property_arena: Option<PagedArena>,
    degrees: Vec<u32>,
    offsets: Vec<u64>,
    property_offsets: Vec<u64>,
    written: Vec<bool>,
    relationship_count: u64,
    scratch: Vec<(u64, f64)>,
    targets: Vec<u64>,
    values: Vec<f64>,
}

impl AdjacencyListBuilder {
    /// Creates a builder for nodes `0..node_count`.
    pub fn new(node_count: usize, options: AdjacencyOptions) -> Self {
        let property_arena = options.property.then(PagedArena::new);
        let property_offsets = if options.property {
            vec![0; node_count]
        } else {
            Vec::new()
        };
        Self {
            options,
            arena: PagedArena::new(),
            property_arena,
            degrees: vec![0; node_count],
            offsets: vec![0; node_count],
            property_offsets,
            written: vec![false; node_count],
            relationship_count: 0,
            scratch: Vec::new(),
            targets: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    /// Relationships written so far, after aggregation.
    pub fn relationship_count(&self) -> u64 {
        self.relationship_count
    }

    /// Adds the relationships of `node`. `targets` need not be sorted.
    ///
    /// `properties` must be given exactly when the property list is enabled
    /// and must pair one value with each target.
    pub fn add(&mut self, node: u64, targets: &[u64], properties: Option<&[f64]>) -> Result<()> {
        let node_count = self.node_count();
        let idx = self.check_node(node)?;
        if self.written[idx] {
            return Err(SombraError::DuplicateNode(node));
        }
        match (self.property_arena.is_some(), properties) {
            (true, None) => {
                return Err(SombraError::Invalid("property values required by this list"))
            }
            (false, Some(_)) => {
                return Err(SombraError::Invalid("property list is disabled"));
            }
            (_, Some(values)) if values.len() != targets.len() => {
                return Err(SombraError::PropertyMismatch {
                    expected: targets.len(),
                    actual: values.len(),
                });
            }
            _ => {}
        }
        if let Some(&bad) = targets
            .iter()
            .find(|t| usize::try_from(**t).map_or(true, |t| t >= node_count))
        {
            return Err(SombraError::node_out_of_range(bad, node_count));
        }

        self.collect(targets, properties);
        let degree = u32::try_from(self.targets.len())
            .map_err(|_| SombraError::Invalid("degree exceeds u32::MAX"))?;
        self.written[idx] = true;
        if degree == 0 {
            return Ok(());
        }

        self.offsets[idx] = write_targets(&mut self.arena, self.options.compression, &self.targets)?;
        if let Some(arena) = self.property_arena.as_mut() {
            self.property_offsets[idx] = write_values(arena, &self.values)?;
        }
        self.degrees[idx] = degree;
        self.relationship_count += u64::from(degree);
        trace!(node, degree, "adjacency.build.node");
        Ok(())
    }

    /// Freezes the tables and returns the finished lists.
    pub fn build(self) -> Relationships {
        let degrees: Arc<[u32]> = self.degrees.into();
        let properties = self.property_arena.map(|arena| {
            AdjacencyProperties::from_parts(
                arena,
                Arc::clone(&degrees),
                self.property_offsets.into_boxed_slice(),
            )
        });
        debug!(
            nodes = degrees.len(),
            relationships = self.relationship_count,
            bytes = self.arena.used_bytes(),
            pages = self.arena.page_count(),
            compression = self.options.compression.label(),
            "adjacency.build.finish"
        );
        let adjacency = AdjacencyList::from_parts(
            self.arena,
            degrees,
            self.offsets.into_boxed_slice(),
            self.options.compression,
            self.relationship_count,
            self.options.metrics,
        );
        Relationships::new(adjacency, properties)
    }

    /// Builds a list from one target vector per node.
    ///
    /// The property list is never built here.
    pub fn from_adjacency(adjacency: &[Vec<u64>], options: AdjacencyOptions) -> Result<AdjacencyList> {
        let mut builder = Self::new(adjacency.len(), options.property(false));
        for (node, targets) in adjacency.iter().enumerate() {
            builder.add(node as u64, targets, None)?;
        }
        Ok(builder.build().into_parts().0)
    }

    /// Builds a directed list from `(source, target)` pairs.
    pub fn from_edges(
        node_count: usize,
        edges: &[(u64, u64)],
        options: AdjacencyOptions,
    ) -> Result<AdjacencyList> {
        let buckets = bucket(node_count, edges.iter().copied())?;
        Self::from_adjacency(&buckets, options)
    }

    /// Builds an undirected list: every pair is stored in both directions.
    pub fn undirected_from_edges(
        node_count: usize,
        edges: &[(u64, u64)],
        options: AdjacencyOptions,
    ) -> Result<AdjacencyList> {
        let both = edges.iter().flat_map(|&(s, t)| [(s, t), (t, s)]);
        let buckets = bucket(node_count, both)?;
        Self::from_adjacency(&buckets, options)
    }

    /// Builds a directed list with a property list from
    /// `(source, target, value)` triples.
    pub fn from_weighted_edges(
        node_count: usize,
        edges: &[(u64, u64, f64)],
        options: AdjacencyOptions,
    ) -> Result<Relationships> {
        let mut targets: Vec<Vec<u64>> = vec![Vec::new(); node_count];
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); node_count];
        for &(source, target, value) in edges {
            let idx = source_index(source, node_count)?;
            targets[idx].push(target);
            values[idx].push(value);
        }
        let mut builder = Self::new(node_count, options.property(true));
        for (node, (t, v)) in targets.iter().zip(values.iter()).enumerate() {
            builder.add(node as u64, t, Some(v))?;
        }
        Ok(builder.build())
    }

    fn check_node(&self, node: u64) -> Result<usize> {
        source_index(node, self.node_count())
    }

    /// Sorts `targets` with their values and applies the aggregation into
    /// `self.targets`/`self.values`.
    fn collect(&mut self, targets: &[u64], properties: Option<&[f64]>) {
        let aggregation = self.options.aggregation;
        self.scratch.clear();
        match properties {
            Some(values) => self
                .scratch
                .extend(targets.iter().copied().zip(values.iter().copied())),
            None => self.scratch.extend(targets.iter().map(|t| (*t, 0.0))),
        }
        // Stable, so `Single` keeps the first value in input order.
        self.scratch.sort_by_key(|(target, _)| *target);

        self.targets.clear();
        self.values.clear();
        for &(target, value) in &self.scratch {
            if aggregation.deduplicates() && self.targets.last() == Some(&target) {
                if let Some(acc) = self.values.last_mut() {
                    *acc = aggregation.merge(*acc, value);
                }
                continue;
            }
            self.targets.push(target);
            self.values.push(if aggregation == Aggregation::Count {
                1.0
            } else {
                value
            });
        }
    }
}

fn source_index(node: u64, node_count: usize) -> Result<usize> {
    usize::try_from(node)
        .ok()
        .filter(|idx| *idx < node_count)
        .ok_or_else(|| SombraError::node_out_of_range(node, node_count))
}

fn bucket(node_count: usize, edges: impl Iterator<Item = (u64, u64)>) -> Result<Vec<Vec<u64>>> {
    let mut buckets = vec![Vec::new(); node_count];
    for (source, target) in edges {
        buckets[source_index(source, node_count)?].push(target);
    }
    Ok(buckets)
}

fn write_targets(arena: &mut PagedArena, compression: Compression, targets: &[u64]) -> Result<u64> {
    match compression {
        Compression::DeltaVarLong => {
            let (offset, buf) = arena.allocate(delta::encoded_len(targets))?;
            delta::encode_sorted_into(targets, buf);
            Ok(offset)
        }
        Compression::Uncompressed => {
            let (offset, buf) = arena.allocate(DEGREE_PREFIX_LEN + targets.len() * VALUE_LEN)?;
            le::put_u32(buf, 0, targets.len() as u32);
            for (i, target) in targets.iter().enumerate() {
                le::put_u64(buf, DEGREE_PREFIX_LEN + i * VALUE_LEN, *target);
            }
            Ok(offset)
        }
    }
}

fn write_values(arena: &mut PagedArena, values: &[f64]) -> Result<u64> {
    let (offset, buf) = arena.allocate(values.len() * VALUE_LEN)?;
    for (i, value) in values.iter().enumerate() {
        le::put_u64(buf, i * VALUE_LEN, value.to_bits());
    }
    Ok(offset)
}
