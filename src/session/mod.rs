//! One imaging session: trial traces, stimulus order and per-sample pivots.

pub mod loader;
pub mod pivot;
pub mod stimulus;
pub mod trace;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, RoiError};

pub use loader::{LoadedSession, LoadedTrials, LoaderOptions, load_session, load_trials};
pub use pivot::{AvgMeans, FrameMatrix, RawMeans, SamplePivot};
pub use stimulus::{StimulusOrder, StimulusOrderSource};
pub use trace::TraceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleType {
    Cell,
    Glomerulus,
    Grid,
}

impl SampleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleType::Cell => "Cell",
            SampleType::Glomerulus => "Glomerulus",
            SampleType::Grid => "Grid",
        }
    }

    /// Column label of the k-th sample (1-based).
    pub fn label(&self, k: usize) -> String {
        format!("{} {}", self.as_str(), k)
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cell" => Ok(SampleType::Cell),
            "glomerulus" => Ok(SampleType::Glomerulus),
            "grid" => Ok(SampleType::Grid),
            other => Err(format!("unknown sample type '{}'", other)),
        }
    }
}

/// Splits a `"<Type> <k>"` label into its type and 1-based index.
pub fn parse_sample_label(label: &str) -> Option<(SampleType, u32)> {
    let (kind, idx) = label.trim().split_once(' ')?;
    let kind = kind.parse().ok()?;
    let idx = idx.trim().parse().ok()?;
    Some((kind, idx))
}

/// Date, animal and region parsed from a `YYMMDD--<animal>_<roi>` folder name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionMeta {
    pub date: String,
    pub animal_id: String,
    pub roi_id: String,
}

impl SessionMeta {
    pub fn from_folder_name(name: &str) -> Result<Self> {
        let invalid = || RoiError::InvalidSessionName(name.to_string());
        let (date, rest) = name.split_once("--").ok_or_else(invalid)?;
        let (animal_id, rest) = rest.split_once('_').ok_or_else(invalid)?;
        let roi_id = rest.split('_').next().unwrap_or_default();
        if date.is_empty() || animal_id.is_empty() || roi_id.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            date: date.to_string(),
            animal_id: animal_id.to_string(),
            roi_id: roi_id.to_string(),
        })
    }

    pub fn from_folder(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RoiError::InvalidSessionName(path.display().to_string()))?;
        Self::from_folder_name(name)
    }

    /// Prefix shared by every file exported for this session.
    pub fn file_prefix(&self) -> String {
        format!("{}_{}_{}", self.date, self.animal_id, self.roi_id)
    }
}

/// One row of the concatenated session table.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub frame: usize,
    pub trial: usize,
    pub odor: u32,
    pub values: Vec<f64>,
}

/// All trials of a session stacked in (Trial, Frame) order.
#[derive(Debug, Clone)]
pub struct SessionTable {
    pub sample_type: SampleType,
    pub samples: Vec<String>,
    pub rows: Vec<FrameRow>,
}

impl SessionTable {
    /// Stacks per-trial traces; `trials[i]` becomes trial `i + 1` with odor `odors[i]`.
    pub fn from_trials(sample_type: SampleType, trials: Vec<TraceTable>, odors: &[u32]) -> Self {
        let n_samples = trials.first().map(|t| t.n_samples()).unwrap_or(0);
        let samples = (1..=n_samples).map(|k| sample_type.label(k)).collect();
        let mut rows = Vec::with_capacity(trials.iter().map(|t| t.rows.len()).sum());
        for (i, (trace, &odor)) in trials.into_iter().zip(odors).enumerate() {
            for (f, values) in trace.rows.into_iter().enumerate() {
                rows.push(FrameRow {
                    frame: f + 1,
                    trial: i + 1,
                    odor,
                    values,
                });
            }
        }
        Self {
            sample_type,
            samples,
            rows,
        }
    }

    /// Removes every row belonging to one of `trials`; returns the number of rows dropped.
    pub fn drop_trials(&mut self, trials: &[usize]) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !trials.contains(&r.trial));
        before - self.rows.len()
    }

    pub fn sample_index(&self, sample: &str) -> Result<usize> {
        self.samples
            .iter()
            .position(|s| s == sample)
            .ok_or_else(|| RoiError::UnknownSample(sample.to_string()))
    }

    /// Distinct trial numbers still present, ascending.
    pub fn trials(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self.rows.iter().map(|r| r.trial).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Distinct odors still present, ascending.
    pub fn odors(&self) -> Vec<u32> {
        let mut out: Vec<u32> = self.rows.iter().map(|r| r.odor).collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
