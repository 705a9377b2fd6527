//! Reads `<date>_<animal>_<roi>_analysis.tsv` files back into sheets.

use std::path::Path;

use tracing::debug;

use crate::dataset::{SessionAnalysis, SessionId};
use crate::error::{Result, RoiError};
use crate::response::{AnalysisSheet, Cell, Field};
use crate::session::{SampleType, parse_sample_label};

pub fn read_analysis(path: &Path) -> Result<SessionAnalysis> {
    let id = SessionId::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| RoiError::io(path, e))?;
    parse_analysis(&content, path, id)
}

pub fn parse_analysis(content: &str, path: &Path, id: SessionId) -> Result<SessionAnalysis> {
    let malformed = |line: usize, reason: String| RoiError::MalformedAnalysis {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let (_, header) = lines
        .next()
        .ok_or_else(|| malformed(1, "empty file".to_string()))?;
    let header: Vec<&str> = header.split('\t').collect();
    if header.len() < 2 || header[0] != "sample" || header[1] != "field" {
        return Err(malformed(1, "expected 'sample' and 'field' columns".to_string()));
    }
    let mut odors = Vec::with_capacity(header.len() - 2);
    for col in &header[2..] {
        let odor = col
            .trim()
            .strip_prefix("Odor ")
            .and_then(|o| o.trim().parse::<u32>().ok())
            .ok_or_else(|| malformed(1, format!("bad odor column '{}'", col)))?;
        odors.push(odor);
    }

    let mut sheets: Vec<AnalysisSheet> = Vec::new();
    let mut sample_type: Option<SampleType> = None;
    for (i, line) in lines {
        let line_no = i + 1;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() > header.len() || fields.len() < 2 {
            return Err(malformed(
                line_no,
                format!("{} columns, header has {}", fields.len(), header.len()),
            ));
        }
        let sample = fields[0].trim();
        let label = fields[1].trim();
        if label == Field::ODOR_ROW {
            continue;
        }
        let Some(field) = Field::from_label(label) else {
            debug!(path = %path.display(), field = label, "unknown analysis row skipped");
            continue;
        };

        let (kind, _) = parse_sample_label(sample)
            .ok_or_else(|| malformed(line_no, format!("bad sample label '{}'", sample)))?;
        match sample_type {
            None => sample_type = Some(kind),
            Some(t) if t != kind => {
                return Err(malformed(
                    line_no,
                    format!("sample '{}' is not a {}", sample, t),
                ));
            }
            Some(_) => {}
        }

        // Trailing empty cells may be cut by spreadsheet tools.
        let mut row = Vec::with_capacity(odors.len());
        for idx in 0..odors.len() {
            let text = fields.get(idx + 2).copied().unwrap_or("");
            let cell: Cell = text.parse().map_err(|e: String| malformed(line_no, e))?;
            row.push(cell);
        }

        if sheets.last().map(|s| s.sample.as_str()) != Some(sample) {
            if sheets.iter().any(|s| s.sample == sample) {
                return Err(malformed(
                    line_no,
                    format!("rows of '{}' are not contiguous", sample),
                ));
            }
            sheets.push(AnalysisSheet::new(sample.to_string(), odors.clone()));
        }
        if let Some(sheet) = sheets.last_mut() {
            sheet.rows.insert(field, row);
        }
    }

    let sample_type =
        sample_type.ok_or_else(|| malformed(1, "no sample rows".to_string()))?;
    Ok(SessionAnalysis {
        id,
        sample_type,
        sheets,
    })
}
