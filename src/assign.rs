//! Top-K ranking of query chromosomes per reference chromosome and subgenome
//! labeling.
//!
//! The transformation is pure and deterministic: grouping preserves first-seen
//! reference order, sorting is stable so ties keep input order, and the final
//! table is ordered by natural chromosome name then ascending distance.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use std::path::Path;

use crate::dist_table::DistRecord;
use crate::error::{Error, Result};

/// One query chromosome assigned to a subgenome of a reference chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub ref_chr: String,
    pub query_chr: String,
    /// "SG1".."SGK", rank 1 = smallest distance
    pub subgenome: String,
    pub distance: f64,
    pub raw_distance: String,
}

/// Strip directory components and a trailing extension from a sequence
/// identifier: `/r/chr1.fa` -> `chr1`, `chrB.fasta` -> `chrB`.
pub fn chr_stem(identifier: &str) -> String {
    Path::new(identifier)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| identifier.to_string())
}

/// For each reference chromosome keep the `subgenomes` closest query
/// chromosomes, labeled SG1..SGK by ascending-distance rank.
///
/// A reference with fewer than `subgenomes` comparisons keeps all of them;
/// that truncation is not an error. Empty input yields an empty table.
pub fn assign_subgenomes(records: &[DistRecord], subgenomes: usize) -> Result<Vec<Assignment>> {
    if subgenomes == 0 {
        return Err(Error::Config(
            "subgenome count must be at least 1".to_string(),
        ));
    }

    let mut groups: IndexMap<&str, Vec<&DistRecord>> = IndexMap::new();
    for record in records {
        groups
            .entry(record.reference.as_str())
            .or_default()
            .push(record);
    }

    let mut assignments = Vec::new();
    for (reference, mut group) in groups {
        // Stable, so equal distances keep input order
        group.sort_by_key(|r| OrderedFloat(r.distance));
        if group.len() < subgenomes {
            log::debug!(
                "reference {} has only {} comparisons for {} subgenomes",
                reference,
                group.len(),
                subgenomes
            );
        }
        group.truncate(subgenomes);
        for (rank, record) in group.iter().enumerate() {
            assignments.push(Assignment {
                ref_chr: chr_stem(&record.reference),
                query_chr: chr_stem(&record.query),
                subgenome: format!("SG{}", rank + 1),
                distance: record.distance,
                raw_distance: record.raw_distance.clone(),
            });
        }
    }

    // chr2 sorts before chr10; within a chromosome, closest match first
    assignments.sort_by(|a, b| {
        natord::compare(&a.ref_chr, &b.ref_chr)
            .then_with(|| OrderedFloat(a.distance).cmp(&OrderedFloat(b.distance)))
    });

    Ok(assignments)
}
