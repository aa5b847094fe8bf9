use serde::Serialize;
use tracing::debug;

use crate::primitives::bytes::{le, var};
use crate::storage::{AdjacencyList, Compression, Relationships};

const MAX_FINDINGS: usize = 32;
const DEGREE_PREFIX_LEN: usize = 4;
const VALUE_LEN: usize = 8;

/// Specifies the depth of verification checks to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyLevel {
    /// Table shapes and block bounds only.
    Fast,
    /// Additionally decodes every block with the checked decoder.
    Full,
}

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// Informational message about the verification process.
    Info,
    /// Non-critical issue that may indicate a problem.
    Warning,
    /// Critical issue indicating data corruption or integrity failure.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Human-readable description of the issue.
    pub message: String,
}

impl VerifyFinding {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: VerifySeverity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: VerifySeverity::Warning,
            message: message.into(),
        }
    }
}

/// Statistics collected during the verification process.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerifyCounts {
    /// Nodes whose table entries were checked.
    pub nodes_checked: u64,
    /// Blocks whose bounds were checked.
    pub blocks_checked: u64,
    /// Targets decoded by a full check.
    pub targets_decoded: u64,
    /// Property blocks whose bounds were checked.
    pub property_blocks_checked: u64,
}

/// Complete report of a verification operation.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    /// The verification level that was performed.
    pub level: VerifyLevel,
    /// Whether verification found no errors.
    pub success: bool,
    /// List of issues discovered during verification.
    pub findings: Vec<VerifyFinding>,
    /// Statistics about the data structures examined.
    pub counts: VerifyCounts,
}

/// Verifies the structural integrity of an adjacency list.
///
/// - `VerifyLevel::Fast`: degree/offset agreement, block bounds and the
///   relationship total
/// - `VerifyLevel::Full`: also decodes every block, reporting truncated or
///   overlong varints, unsorted or out-of-range targets and degree prefixes
///   that disagree with the degree table
///
/// Findings are capped; `counts` always covers the whole list.
pub fn verify(list: &AdjacencyList, level: VerifyLevel) -> VerifyReport {
    let mut findings = Vec::new();
    let mut counts = VerifyCounts::default();
    check_list(list, level, &mut findings, &mut counts);
    finish(level, findings, counts)
}

/// Like [`verify`], additionally checking the bounds of every property block.
pub fn verify_relationships(relationships: &Relationships, level: VerifyLevel) -> VerifyReport {
    let mut findings = Vec::new();
    let mut counts = VerifyCounts::default();
    let list = relationships.adjacency();
    check_list(list, level, &mut findings, &mut counts);
    if let Some(props) = relationships.properties() {
        if props.node_count() != list.node_count() {
            push(
                &mut findings,
                VerifyFinding::error(format!(
                    "property list covers {} nodes, adjacency {}",
                    props.node_count(),
                    list.node_count()
                )),
            );
        } else if !props.arena().is_released() {
            for node in 0..list.node_count() as u64 {
                let degree = list.degrees()[node as usize] as usize;
                if degree == 0 {
                    continue;
                }
                counts.property_blocks_checked += 1;
                let offset = props.offset(node);
                if offset == 0 || !props.arena().contains(offset, degree * VALUE_LEN) {
                    push(
                        &mut findings,
                        VerifyFinding::error(format!(
                            "node {node}: property block at offset {offset} out of bounds"
                        )),
                    );
                }
            }
        }
    }
    finish(level, findings, counts)
}

fn finish(level: VerifyLevel, findings: Vec<VerifyFinding>, counts: VerifyCounts) -> VerifyReport {
    let success = !findings
        .iter()
        .any(|finding| finding.severity == VerifySeverity::Error);
    debug!(
        level = ?level,
        success,
        findings = findings.len(),
        nodes = counts.nodes_checked,
        "admin.verify.finish"
    );
    VerifyReport {
        level,
        success,
        findings,
        counts,
    }
}

fn check_list(
    list: &AdjacencyList,
    level: VerifyLevel,
    findings: &mut Vec<VerifyFinding>,
    counts: &mut VerifyCounts,
) {
    let degrees = list.degrees();
    let total: u64 = degrees.iter().map(|d| u64::from(*d)).sum();
    if total != list.relationship_count() {
        push(
            findings,
            VerifyFinding::error(format!(
                "degree table sums to {total}, list reports {} relationships",
                list.relationship_count()
            )),
        );
    }
    let arena = list.arena();
    if arena.is_released() {
        push(
            findings,
            VerifyFinding::warning("arena released; block checks skipped"),
        );
        counts.nodes_checked = degrees.len() as u64;
        return;
    }

    for (idx, degree) in degrees.iter().enumerate() {
        counts.nodes_checked += 1;
        let node = idx as u64;
        let degree = *degree as usize;
        let offset = list.offset(node);
        if degree == 0 {
            if offset != 0 {
                push(
                    findings,
                    VerifyFinding::error(format!("node {node}: degree 0 with offset {offset}")),
                );
            }
            continue;
        }
        if offset == 0 {
            push(
                findings,
                VerifyFinding::error(format!("node {node}: degree {degree} without a block")),
            );
            continue;
        }
        counts.blocks_checked += 1;
        let min_len = match list.compression() {
            Compression::DeltaVarLong => degree,
            Compression::Uncompressed => DEGREE_PREFIX_LEN + degree * VALUE_LEN,
        };
        if !arena.contains(offset, min_len) {
            push(
                findings,
                VerifyFinding::error(format!(
                    "node {node}: block at offset {offset} exceeds its page"
                )),
            );
            continue;
        }
        if level == VerifyLevel::Full {
            if let Err(message) = decode_block(list, offset, degree, counts) {
                push(findings, VerifyFinding::error(format!("node {node}: {message}")));
            }
        }
    }
}

fn decode_block(
    list: &AdjacencyList,
    offset: u64,
    degree: usize,
    counts: &mut VerifyCounts,
) -> Result<(), String> {
    let node_count = list.node_count() as u64;
    let (page, idx) = list.arena().resolve(offset);
    let mut prev = 0u64;
    match list.compression() {
        Compression::DeltaVarLong => {
            let mut off = idx;
            for i in 0..degree {
                let delta = var::try_decode_u64(page, &mut off)
                    .map_err(|err| format!("target {i}: {err}"))?;
                prev = prev
                    .checked_add(delta)
                    .ok_or_else(|| format!("target {i}: id overflows u64"))?;
                if prev >= node_count {
                    return Err(format!("target {i} ({prev}) out of range"));
                }
                counts.targets_decoded += 1;
            }
        }
        Compression::Uncompressed => {
            let prefix = le::get_u32(page, idx) as usize;
            if prefix != degree {
                return Err(format!("degree prefix {prefix} disagrees with degree {degree}"));
            }
            for i in 0..degree {
                let target = le::get_u64(page, idx + DEGREE_PREFIX_LEN + i * VALUE_LEN);
                if target < prev {
                    return Err(format!("target {i} ({target}) not sorted"));
                }
                if target >= node_count {
                    return Err(format!("target {i} ({target}) out of range"));
                }
                prev = target;
                counts.targets_decoded += 1;
            }
        }
    }
    Ok(())
}

fn push(findings: &mut Vec<VerifyFinding>, finding: VerifyFinding) {
    if findings.len() < MAX_FINDINGS {
        findings.push(finding);
    }
}
