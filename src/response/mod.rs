//! Response characterization of one sample's trial-averaged traces.

pub mod analyzer;
pub mod sheet;

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

pub use analyzer::analyze_signal;
pub use sheet::AnalysisSheet;

/// One value of an analysis table.
///
/// Replaces the float/bool/"N/A" mix of spreadsheet cells with an explicit tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Measured(f64),
    /// Only defined for significant responses.
    NotApplicable,
    /// The significance column of a response that did not pass.
    NotSignificant,
    /// Blanked out for export.
    Missing,
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Measured(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Cell::Measured(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Measured(v) => write!(f, "{}", v),
            Cell::NotApplicable => f.write_str("N/A"),
            Cell::NotSignificant => f.write_str("FALSE"),
            Cell::Missing => Ok(()),
        }
    }
}

impl FromStr for Cell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(Cell::Missing),
            "N/A" => Ok(Cell::NotApplicable),
            "FALSE" | "False" | "false" => Ok(Cell::NotSignificant),
            other => other
                .parse::<f64>()
                .map(Cell::Measured)
                .map_err(|_| format!("invalid cell value '{}'", other)),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Measured(v) if v.is_finite() => serializer.serialize_f64(*v),
            Cell::Measured(_) | Cell::Missing => serializer.serialize_none(),
            Cell::NotApplicable => serializer.serialize_str("N/A"),
            Cell::NotSignificant => serializer.serialize_bool(false),
        }
    }
}

/// Named rows of an analysis table, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    Baseline,
    Peak,
    DeltaF,
    BaselineStd3,
    DeltaFBlank,
    BlankSubDeltaF,
    BlankSubDeltaFPct,
    Significance,
    Auc,
    AucBlank,
    BlankSubAuc,
    PeakTime,
    OdorOnset,
    ResponseOnset,
    Latency,
    TimeToPeak,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Baseline,
        Field::Peak,
        Field::DeltaF,
        Field::BaselineStd3,
        Field::DeltaFBlank,
        Field::BlankSubDeltaF,
        Field::BlankSubDeltaFPct,
        Field::Significance,
        Field::Auc,
        Field::AucBlank,
        Field::BlankSubAuc,
        Field::PeakTime,
        Field::OdorOnset,
        Field::ResponseOnset,
        Field::Latency,
        Field::TimeToPeak,
    ];

    /// Header of the odor label row that precedes the fields.
    pub const ODOR_ROW: &'static str = "Odor";

    pub fn label(&self) -> &'static str {
        match self {
            Field::Baseline => "Baseline",
            Field::Peak => "Peak",
            Field::DeltaF => "DeltaF",
            Field::BaselineStd3 => "3 std of baseline",
            Field::DeltaFBlank => "DeltaF(BLANK)",
            Field::BlankSubDeltaF => "Blank-subtracted DeltaF",
            Field::BlankSubDeltaFPct => "Blank-subtracted DeltaF/F(%)",
            Field::Significance => "Significant response?",
            Field::Auc => "Area under curve",
            Field::AucBlank => "Blank area under curve",
            Field::BlankSubAuc => "Blank sub AUC",
            Field::PeakTime => "Time at peak (s)",
            Field::OdorOnset => "Odor onset",
            Field::ResponseOnset => "Response onset (s)",
            Field::Latency => "Latency (s)",
            Field::TimeToPeak => "Time to peak (s)",
        }
    }

    /// Name of the compiled dataset table for this statistic.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Field::BlankSubDeltaFPct => "Blank-subtracted DeltaFF(%)",
            other => other.label(),
        }
    }

    pub fn from_label(label: &str) -> Option<Field> {
        let label = label.trim();
        Field::ALL.into_iter().find(|f| f.label() == label)
    }
}

/// Every statistic of one odor column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdorResponse {
    pub odor: u32,
    pub baseline: f64,
    pub peak: f64,
    pub delta_f: f64,
    pub baseline_std3: f64,
    pub delta_f_blank: f64,
    pub blank_sub_delta_f: f64,
    pub blank_sub_delta_f_pct: f64,
    /// `Measured(blank_sub_delta_f_pct)` when significant, else `NotSignificant`.
    pub significance: Cell,
    pub auc: f64,
    pub auc_blank: f64,
    pub blank_sub_auc: Cell,
    pub peak_time: Cell,
    pub odor_onset: f64,
    pub response_onset: Cell,
    pub latency: Cell,
    pub time_to_peak: Cell,
}

impl OdorResponse {
    pub fn is_significant(&self) -> bool {
        !matches!(self.significance, Cell::NotSignificant)
    }

    pub fn get(&self, field: Field) -> Cell {
        match field {
            Field::Baseline => Cell::Measured(self.baseline),
            Field::Peak => Cell::Measured(self.peak),
            Field::DeltaF => Cell::Measured(self.delta_f),
            Field::BaselineStd3 => Cell::Measured(self.baseline_std3),
            Field::DeltaFBlank => Cell::Measured(self.delta_f_blank),
            Field::BlankSubDeltaF => Cell::Measured(self.blank_sub_delta_f),
            Field::BlankSubDeltaFPct => Cell::Measured(self.blank_sub_delta_f_pct),
            Field::Significance => self.significance,
            Field::Auc => Cell::Measured(self.auc),
            Field::AucBlank => Cell::Measured(self.auc_blank),
            Field::BlankSubAuc => self.blank_sub_auc,
            Field::PeakTime => self.peak_time,
            Field::OdorOnset => Cell::Measured(self.odor_onset),
            Field::ResponseOnset => self.response_onset,
            Field::Latency => self.latency,
            Field::TimeToPeak => self.time_to_peak,
        }
    }
}

/// Analyzer output for one sample of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub sample: String,
    pub responses: Vec<OdorResponse>,
}

impl ResponseRecord {
    pub fn odors(&self) -> Vec<u32> {
        self.responses.iter().map(|r| r.odor).collect()
    }

    pub fn significant_odors(&self) -> Vec<u32> {
        self.responses
            .iter()
            .filter(|r| r.is_significant())
            .map(|r| r.odor)
            .collect()
    }

    pub fn response(&self, odor: u32) -> Option<&OdorResponse> {
        self.responses.iter().find(|r| r.odor == odor)
    }

    pub fn to_sheet(&self) -> AnalysisSheet {
        let mut sheet = AnalysisSheet::new(self.sample.clone(), self.odors());
        for field in Field::ALL {
            let row = self.responses.iter().map(|r| r.get(field)).collect();
            sheet.rows.insert(field, row);
        }
        sheet
    }
}
