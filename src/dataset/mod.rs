//! Cross-session aggregation of per-session analysis tables.

pub mod assembler;
pub mod odor_index;

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, RoiError};
use crate::response::{AnalysisSheet, Field, ResponseRecord};
use crate::session::{SampleType, SessionMeta};

pub use assembler::{DatasetAssembler, DatasetRow, DatasetTable, SignificantExtract};
pub use odor_index::{AcuteOdorEntry, OdorIndex, build_odor_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortKind {
    /// Many animals/regions imaged once each.
    Acute,
    /// One animal/region imaged repeatedly.
    Chronic,
}

impl CohortKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CohortKind::Acute => "acute",
            CohortKind::Chronic => "chronic",
        }
    }
}

/// Identity of one session, parsed from `<date>_<animal>_<roi>...` file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionId {
    pub date: String,
    pub animal_id: String,
    pub roi_id: String,
}

impl SessionId {
    pub fn from_file_name(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.split('_').take(3).collect();
        if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(RoiError::InvalidSessionName(name.to_string()));
        }
        Ok(Self {
            date: parts[0].to_string(),
            animal_id: parts[1].to_string(),
            roi_id: parts[2].to_string(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RoiError::InvalidSessionName(path.display().to_string()))?;
        Self::from_file_name(name)
    }

    /// `<date>_<animal>_<roi>`.
    pub fn name(&self) -> String {
        format!("{}_{}_{}", self.date, self.animal_id, self.roi_id)
    }

    /// Session date in `YYMMDD` form.
    pub fn parsed_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%y%m%d")
            .map_err(|_| RoiError::InvalidSessionName(self.name()))
    }

    pub fn cohort_key(&self, kind: CohortKind) -> Result<CohortKey> {
        Ok(match kind {
            CohortKind::Acute => CohortKey::Acute {
                animal_id: self.animal_id.clone(),
                roi_id: self.roi_id.clone(),
            },
            CohortKind::Chronic => CohortKey::Chronic {
                date: self.parsed_date()?,
            },
        })
    }
}

impl From<&SessionMeta> for SessionId {
    fn from(meta: &SessionMeta) -> Self {
        Self {
            date: meta.date.clone(),
            animal_id: meta.animal_id.clone(),
            roi_id: meta.roi_id.clone(),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Key columns of a dataset row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CohortKey {
    Acute { animal_id: String, roi_id: String },
    Chronic { date: NaiveDate },
}

impl CohortKey {
    pub fn headers(kind: CohortKind) -> &'static [&'static str] {
        match kind {
            CohortKind::Acute => &["Animal ID", "ROI"],
            CohortKind::Chronic => &["Date"],
        }
    }

    pub fn values(&self) -> Vec<String> {
        match self {
            CohortKey::Acute { animal_id, roi_id } => vec![animal_id.clone(), roi_id.clone()],
            CohortKey::Chronic { date } => vec![date.format("%y%m%d").to_string()],
        }
    }
}

/// Statistics tracked across sessions and how they are exported.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    /// Ordered statistics; one dataset table each.
    pub statistics: Vec<Field>,
    /// Statistics whose non-significant entries are blanked before export.
    pub masked_when_insignificant: Vec<Field>,
    /// Odor columns of every exported table; the blank odor is not listed.
    pub canonical_odors: Vec<u32>,
}

impl DatasetConfig {
    pub fn v1() -> Self {
        Self {
            statistics: vec![
                Field::Baseline,
                Field::BlankSubDeltaFPct,
                Field::BlankSubAuc,
                Field::Latency,
                Field::TimeToPeak,
            ],
            masked_when_insignificant: vec![Field::BlankSubDeltaFPct, Field::BlankSubAuc],
            canonical_odors: (1..=7).collect(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::v1()
    }
}

/// All sheets of one session's analysis output.
#[derive(Debug, Clone)]
pub struct SessionAnalysis {
    pub id: SessionId,
    pub sample_type: SampleType,
    pub sheets: Vec<AnalysisSheet>,
}

impl SessionAnalysis {
    pub fn from_records(id: SessionId, sample_type: SampleType, records: &[ResponseRecord]) -> Self {
        Self {
            id,
            sample_type,
            sheets: records.iter().map(|r| r.to_sheet()).collect(),
        }
    }
}

/// Orders sessions by date for chronic cohorts; unparseable dates sort last.
pub fn sort_by_date(sessions: &mut [SessionAnalysis]) {
    sessions.sort_by(|a, b| match (a.id.parsed_date(), b.id.parsed_date()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.id.date.cmp(&b.id.date),
    });
}
