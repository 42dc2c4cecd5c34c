//! Reader for the raw `mash dist` output table.
//!
//! Each line is `reference<TAB>query<TAB>distance<TAB>p-value<TAB>shared-hashes`;
//! only the first three fields matter here, extra columns are ignored. A line
//! that does not fit this shape fails the whole read: malformed output from the
//! estimator points at an environment or version problem that must not be
//! silently masked.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One pairwise distance as reported by the estimator.
///
/// `raw_distance` keeps the exact input token so downstream output reprints
/// the estimator's precision unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct DistRecord {
    pub reference: String,
    pub query: String,
    pub distance: f64,
    pub raw_distance: String,
}

/// Open a distance table, auto-detecting gzip compression by extension.
pub fn open_dist_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let is_compressed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_compressed {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Lazy line-at-a-time reader producing [`DistRecord`]s.
pub struct DistTableReader<R: BufRead> {
    reader: R,
    path: PathBuf,
    line_no: usize,
}

impl<R: BufRead> DistTableReader<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        DistTableReader {
            reader,
            path: path.into(),
            line_no: 0,
        }
    }

    /// Read the next record, skipping blank lines. `Ok(None)` at end of input.
    pub fn read_record(&mut self) -> Result<Option<DistRecord>> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                continue;
            }
            return self.parse_line(trimmed).map(Some);
        }
    }

    fn parse_line(&self, line: &str) -> Result<DistRecord> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(self.malformed(format!(
                "expected at least 3 fields (reference, query, distance), got {}",
                fields.len()
            )));
        }
        let raw_distance = fields[2].to_string();
        let distance: f64 = raw_distance.parse().map_err(|_| {
            self.malformed(format!("distance field `{raw_distance}` is not a number"))
        })?;
        Ok(DistRecord {
            reference: fields[0].to_string(),
            query: fields[1].to_string(),
            distance,
            raw_distance,
        })
    }

    fn malformed(&self, reason: String) -> Error {
        Error::InputFormat {
            path: self.path.clone(),
            line: self.line_no,
            reason,
        }
    }
}

/// Read an entire distance table into memory.
pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<DistRecord>> {
    let path = path.as_ref();
    let mut reader = DistTableReader::new(open_dist_input(path)?, path);
    let mut records = Vec::new();
    while let Some(record) = reader.read_record()? {
        records.push(record);
    }
    Ok(records)
}
