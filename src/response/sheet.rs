use std::collections::BTreeMap;

use crate::response::{Cell, Field};

/// Field x odor table of one sample, as exported and read back.
///
/// Unlike [`super::ResponseRecord`] a sheet may lack rows, e.g. when it was
/// read from a file written by an older version.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSheet {
    pub sample: String,
    pub odors: Vec<u32>,
    pub rows: BTreeMap<Field, Vec<Cell>>,
}

impl AnalysisSheet {
    pub fn new(sample: String, odors: Vec<u32>) -> Self {
        Self {
            sample,
            odors,
            rows: BTreeMap::new(),
        }
    }

    pub fn cell(&self, field: Field, odor: u32) -> Option<Cell> {
        let idx = self.odors.iter().position(|&o| o == odor)?;
        self.rows.get(&field).and_then(|r| r.get(idx)).copied()
    }

    /// Odors whose significance cell is not `FALSE`.
    pub fn significant_odors(&self) -> Vec<u32> {
        let Some(sig) = self.rows.get(&Field::Significance) else {
            return Vec::new();
        };
        self.odors
            .iter()
            .zip(sig)
            .filter(|(_, c)| c.is_measured())
            .map(|(o, _)| *o)
            .collect()
    }
}
