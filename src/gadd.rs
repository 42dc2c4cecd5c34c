//! Serialization of the filtered/assigned table (`.filter.Gadd`).
//!
//! Tab-separated, fixed 4-column header `Rchr Qchr subg MashD`. The distance
//! column reprints the exact token read from the estimator, so writing the
//! same assignments twice is byte-identical and a write/read cycle is
//! lossless.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::assign::Assignment;
use crate::error::{Error, Result};

pub const GADD_HEADER: &str = "Rchr\tQchr\tsubg\tMashD";

/// Write assignments as a tab-separated table with header.
pub fn write_gadd<W: Write>(writer: &mut W, assignments: &[Assignment]) -> Result<()> {
    writeln!(writer, "{GADD_HEADER}")?;
    for a in assignments {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            a.ref_chr, a.query_chr, a.subgenome, a.raw_distance
        )?;
    }
    Ok(())
}

/// Write assignments to `path` in one shot; the file is only created once the
/// full table is in hand, so a failed run leaves no partial output.
pub fn write_gadd_file<P: AsRef<Path>>(path: P, assignments: &[Assignment]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_gadd(&mut writer, assignments)?;
    writer.flush()?;
    Ok(())
}

/// Read a `.filter.Gadd` table back, validating the header.
pub fn read_gadd<P: AsRef<Path>>(path: P) -> Result<Vec<Assignment>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut assignments = Vec::new();
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(malformed(path, 1, "empty file, expected header".to_string()));
        }
    };
    if header.trim_end() != GADD_HEADER {
        return Err(malformed(
            path,
            1,
            format!("expected header `{GADD_HEADER}`, got `{header}`"),
        ));
    }

    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        let line = line?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        let fields: Vec<&str> = trimmed.split('\t').collect();
        if fields.len() != 4 {
            return Err(malformed(
                path,
                line_no,
                format!("expected 4 tab-separated fields, got {}", fields.len()),
            ));
        }
        let subgenome = fields[2].to_string();
        if !valid_sg_label(&subgenome) {
            return Err(malformed(
                path,
                line_no,
                format!("subgenome field `{subgenome}` is not SG<rank> with rank >= 1"),
            ));
        }
        let raw_distance = fields[3].to_string();
        let distance: f64 = raw_distance.parse().map_err(|_| {
            malformed(
                path,
                line_no,
                format!("distance field `{raw_distance}` is not a number"),
            )
        })?;
        assignments.push(Assignment {
            ref_chr: fields[0].to_string(),
            query_chr: fields[1].to_string(),
            subgenome,
            distance,
            raw_distance,
        });
    }
    Ok(assignments)
}

/// Number of distinct subgenome labels in a table; used by the standalone
/// `plot` subcommand to infer K when `-s` is not given.
pub fn subgenome_count(assignments: &[Assignment]) -> usize {
    let mut labels: Vec<&str> = assignments.iter().map(|a| a.subgenome.as_str()).collect();
    labels.sort_unstable();
    labels.dedup();
    labels.len()
}

/// "SG" followed by a positive integer rank.
fn valid_sg_label(label: &str) -> bool {
    label
        .strip_prefix("SG")
        .and_then(|n| n.parse::<usize>().ok())
        .is_some_and(|n| n >= 1)
}

fn malformed(path: &Path, line: usize, reason: String) -> Error {
    Error::InputFormat {
        path: PathBuf::from(path),
        line,
        reason,
    }
}
