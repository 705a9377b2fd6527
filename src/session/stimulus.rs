//! Solenoid (stimulus) order records.
//!
//! Two on-disk forms exist: a `*solenoid_order*.csv` table with explicit
//! `Trial` and `Odor` columns, and the legacy `*solenoid_info.txt` whose
//! first line lists one digit per trial.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Result, RoiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusOrderSource {
    Table,
    LegacyLine,
}

/// Odor delivered on each trial, in trial order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StimulusOrder {
    pub source: StimulusOrderSource,
    pub path: PathBuf,
    /// `odors[i]` is the odor of trial `i + 1`.
    pub odors: Vec<u32>,
}

impl StimulusOrder {
    pub fn len(&self) -> usize {
        self.odors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.odors.is_empty()
    }

    /// (odor, trial) pairs sorted by odor then trial.
    pub fn by_odor(&self) -> Vec<(u32, usize)> {
        let mut pairs: Vec<(u32, usize)> = self
            .odors
            .iter()
            .enumerate()
            .map(|(i, &o)| (o, i + 1))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

pub fn read_stimulus_order(path: &Path, source: StimulusOrderSource) -> Result<StimulusOrder> {
    let content = std::fs::read_to_string(path).map_err(|e| RoiError::io(path, e))?;
    let odors = match source {
        StimulusOrderSource::Table => parse_order_table(&content, path)?,
        StimulusOrderSource::LegacyLine => parse_legacy_line(&content, path)?,
    };
    Ok(StimulusOrder {
        source,
        path: path.to_path_buf(),
        odors,
    })
}

/// Parses the legacy single-line form; non-digit characters are dropped.
pub fn parse_legacy_line(content: &str, path: &Path) -> Result<Vec<u32>> {
    let first = content.lines().next().unwrap_or_default();
    let odors: Vec<u32> = first.chars().filter_map(|c| c.to_digit(10)).collect();
    if odors.is_empty() {
        return Err(missing(path, "first line holds no stimulus digits"));
    }
    Ok(odors)
}

/// Parses the table form and returns odors ordered by the `Trial` column.
pub fn parse_order_table(content: &str, path: &Path) -> Result<Vec<u32>> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| missing(path, "empty stimulus order table"))?;
    let delim = if header.contains('\t') { '\t' } else { ',' };
    let header: Vec<String> = header
        .split(delim)
        .map(|h| h.trim().trim_matches('"').to_ascii_lowercase())
        .collect();

    let trial_col = header
        .iter()
        .position(|h| h == "trial")
        .ok_or_else(|| missing(path, "no 'Trial' column"))?;
    let odor_col = header
        .iter()
        .position(|h| h == "odor" || h == "solenoid" || h == "stimulus")
        .or_else(|| (0..header.len()).find(|&i| i != trial_col))
        .ok_or_else(|| missing(path, "no odor column"))?;

    let mut pairs: Vec<(u64, u32)> = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(delim).map(|f| f.trim().trim_matches('"')).collect();
        let trial = fields.get(trial_col).and_then(|s| parse_int(s));
        let odor = fields.get(odor_col).and_then(|s| parse_int(s));
        match (trial, odor) {
            (Some(t), Some(o)) => pairs.push((t, o as u32)),
            _ => {
                return Err(missing(
                    path,
                    &format!("row {} is not an integer Trial/Odor pair", line_no + 2),
                ));
            }
        }
    }
    if pairs.is_empty() {
        return Err(missing(path, "stimulus order table has no rows"));
    }
    pairs.sort_by_key(|&(t, _)| t);
    Ok(pairs.into_iter().map(|(_, o)| o).collect())
}

// Spreadsheet exports sometimes write integers as "3.0".
fn parse_int(s: &str) -> Option<u64> {
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    let f: f64 = s.parse().ok()?;
    (f >= 0.0 && f.fract() == 0.0).then_some(f as u64)
}

fn missing(path: &Path, reason: &str) -> RoiError {
    RoiError::MissingStimulusOrder {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
