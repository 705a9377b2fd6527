use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolMeta {
    pub baseline_frames: [usize; 2],
    pub peak_frames: [usize; 2],
    pub auc_frames: [usize; 2],
    pub odor_onset_frame: usize,
    pub frame_to_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub date: String,
    pub animal_id: String,
    pub roi_id: String,
    pub sample_type: String,
    pub stimulus_order_source: Option<String>,
    pub n_trials: usize,
    /// Trial trace file names in trial order.
    pub trial_files: Vec<String>,
    pub n_samples: usize,
    pub dropped_trials: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSummary {
    pub sample: String,
    pub significant_odors: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReportV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub session: SessionInfo,
    pub protocol: ProtocolMeta,
    pub samples: Vec<SampleSummary>,
    /// odor -> number of samples with a significant response.
    pub significant_counts: BTreeMap<u32, usize>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetTableMeta {
    pub statistic: String,
    pub file: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReportV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub cohort: String,
    pub sessions: Vec<String>,
    pub skipped: Vec<String>,
    pub tables: Vec<DatasetTableMeta>,
    pub odor_index: serde_json::Value,
}
