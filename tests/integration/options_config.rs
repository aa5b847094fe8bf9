#![allow(missing_docs)]

use std::fs;

use sombra_csr::{
    storage::{AdjacencyListBuilder, AdjacencyOptions, Aggregation, Compression, TriangleCountConfig},
    types::{Result, SombraError},
};
use tempfile::tempdir;

#[test]
fn options_load_from_toml_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("adjacency.toml");
    fs::write(
        &path,
        "compression = \"uncompressed\"\naggregation = \"max\"\nproperty = true\n",
    )?;
    let options = AdjacencyOptions::load(&path)?;
    assert_eq!(options.compression, Compression::Uncompressed);
    assert_eq!(options.aggregation, Aggregation::Max);
    assert!(options.property);

    let rels = AdjacencyListBuilder::from_weighted_edges(
        2,
        &[(0, 1, 1.0), (0, 1, 4.0), (0, 1, 2.0)],
        options,
    )?;
    let pairs: Vec<(u64, f64)> = rels.cursor(0, 0.0).collect();
    assert_eq!(pairs, vec![(1, 4.0)]);
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() {
    let err = AdjacencyOptions::from_toml_str("compresion = \"uncompressed\"").unwrap_err();
    assert!(matches!(err, SombraError::Config(_)));
}

#[test]
fn missing_file_is_an_io_error() -> Result<()> {
    let dir = tempdir()?;
    let err = AdjacencyOptions::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SombraError::Io(_)));
    Ok(())
}

#[test]
fn triangle_config_parses_partial_tables() {
    let config: TriangleCountConfig = toml::from_str("max_degree = 64").unwrap();
    assert_eq!(config.max_degree, 64);
    assert!(config.concurrency >= 1);
}

#[test]
fn fallback_value_fills_missing_properties() -> Result<()> {
    let mut builder = AdjacencyListBuilder::new(2, AdjacencyOptions::new());
    builder.add(0, &[1, 1], None)?;
    let rels = builder.build();
    assert!(!rels.has_properties());
    let pairs: Vec<(u64, f64)> = rels.cursor(0, 2.5).collect();
    assert_eq!(pairs, vec![(1, 2.5), (1, 2.5)]);
    Ok(())
}
