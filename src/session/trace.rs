//! Raw per-trial trace files.
//!
//! Tab-delimited, one header row, first column is a row index that is
//! discarded, every other column is one sample's intensity series.

use std::path::Path;

use crate::error::{Result, RoiError};

/// Frame x sample intensity matrix of one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceTable {
    /// Original sample column headers, left to right.
    pub columns: Vec<String>,
    /// `rows[frame][sample]`, frame 1 first.
    pub rows: Vec<Vec<f64>>,
}

impl TraceTable {
    pub fn n_samples(&self) -> usize {
        self.columns.len()
    }

    pub fn n_frames(&self) -> usize {
        self.rows.len()
    }
}

pub fn read_trace(path: &Path) -> Result<TraceTable> {
    let content = std::fs::read_to_string(path).map_err(|e| RoiError::io(path, e))?;
    parse_trace(&content, path)
}

pub fn parse_trace(content: &str, path: &Path) -> Result<TraceTable> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| RoiError::malformed_trace(path, 1, "empty file"))?;
    let header: Vec<&str> = header.trim_end_matches('\r').split('\t').collect();
    if header.len() < 2 {
        return Err(RoiError::malformed_trace(
            path,
            1,
            "expected an index column and at least one sample column",
        ));
    }
    let columns: Vec<String> = header[1..].iter().map(|s| s.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if fields.len() != header.len() {
            return Err(RoiError::malformed_trace(
                path,
                line_no,
                format!("expected {} columns, found {}", header.len(), fields.len()),
            ));
        }
        let mut values = Vec::with_capacity(columns.len());
        for raw in &fields[1..] {
            let raw = raw.trim();
            let v: f64 = raw.parse().map_err(|_| {
                RoiError::malformed_trace(path, line_no, format!("non-numeric value '{}'", raw))
            })?;
            values.push(v);
        }
        rows.push(values);
    }

    if rows.is_empty() {
        return Err(RoiError::malformed_trace(path, 2, "no frames"));
    }

    Ok(TraceTable { columns, rows })
}
