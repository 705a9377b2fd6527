use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::dataset::{
    CohortKind, DatasetAssembler, DatasetConfig, DatasetTable, OdorIndex, SessionAnalysis,
};
use crate::protocol::ProtocolConfig;
use crate::response::ResponseRecord;
use crate::schema::v1::{DatasetReportV1, SessionReportV1};
use crate::session::{
    LoaderOptions, SamplePivot, SampleType, SessionMeta, SessionTable, StimulusOrder,
};

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub analysis_path: PathBuf,
    pub avg_means_path: PathBuf,
    pub raw_means_path: PathBuf,
    pub solenoid_path: PathBuf,
    pub json_path: PathBuf,
}

impl OutputPaths {
    pub fn for_session(out_dir: PathBuf, prefix: &str) -> Self {
        Self {
            analysis_path: out_dir.join(format!("{}_analysis.tsv", prefix)),
            avg_means_path: out_dir.join(format!("{}_avg_means.tsv", prefix)),
            raw_means_path: out_dir.join(format!("{}_raw_means.tsv", prefix)),
            solenoid_path: out_dir.join(format!("{}_solenoid_info.tsv", prefix)),
            json_path: out_dir.join(format!("{}_report.json", prefix)),
            out_dir,
        }
    }
}

/// State of one session run, filled in stage by stage.
#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub meta: SessionMeta,
    pub sample_type: SampleType,
    pub protocol: ProtocolConfig,
    pub loader: LoaderOptions,
    pub write_tsv: bool,
    pub write_json: bool,
    pub tool_version: String,
    pub stimulus_order: Option<StimulusOrder>,
    pub trial_files: Vec<PathBuf>,
    pub table: Option<SessionTable>,
    pub pivots: Vec<SamplePivot>,
    pub records: Vec<ResponseRecord>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
    pub report: Option<SessionReportV1>,
}

impl Ctx {
    /// `out_dir` defaults to the session folder itself.
    pub fn new(
        input: PathBuf,
        out_dir: Option<PathBuf>,
        sample_type: SampleType,
        write_tsv: bool,
        write_json: bool,
        tool_version: &str,
    ) -> anyhow::Result<Self> {
        let meta = SessionMeta::from_folder(&input)
            .with_context(|| format!("cannot derive session info from {}", input.display()))?;
        let out_dir = out_dir.unwrap_or_else(|| input.clone());
        let output = OutputPaths::for_session(out_dir, &meta.file_prefix());
        Ok(Self {
            input,
            meta,
            sample_type,
            protocol: ProtocolConfig::v1(),
            loader: LoaderOptions::default(),
            write_tsv,
            write_json,
            tool_version: tool_version.to_string(),
            stimulus_order: None,
            trial_files: Vec::new(),
            table: None,
            pivots: Vec::new(),
            records: Vec::new(),
            warnings: Vec::new(),
            output,
            report: None,
        })
    }

    pub fn session_table(&self) -> anyhow::Result<&SessionTable> {
        self.table.as_ref().context("session table missing")
    }

    pub fn n_trials(&self) -> usize {
        self.table.as_ref().map(|t| t.trials().len()).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct DatasetOutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
}

impl DatasetOutputPaths {
    /// File of one compiled statistic table.
    pub fn table_path(&self, sheet_name: &str) -> PathBuf {
        self.out_dir
            .join(format!("compiled_{}.tsv", sanitize_file_stem(sheet_name)))
    }
}

/// State of one dataset compilation over many analysis files.
#[derive(Debug)]
pub struct DatasetCtx {
    pub inputs: Vec<PathBuf>,
    pub cohort: CohortKind,
    pub config: DatasetConfig,
    pub write_json: bool,
    pub tool_version: String,
    pub sessions: Vec<SessionAnalysis>,
    pub skipped: Vec<String>,
    pub assembler: Option<DatasetAssembler>,
    pub tables: Vec<DatasetTable>,
    pub odor_index: Option<OdorIndex>,
    pub warnings: Vec<String>,
    pub output: DatasetOutputPaths,
    pub report: Option<DatasetReportV1>,
}

impl DatasetCtx {
    pub fn new(
        inputs: Vec<PathBuf>,
        out_dir: &Path,
        cohort: CohortKind,
        write_json: bool,
        tool_version: &str,
    ) -> Self {
        Self {
            inputs,
            cohort,
            config: DatasetConfig::v1(),
            write_json,
            tool_version: tool_version.to_string(),
            sessions: Vec::new(),
            skipped: Vec::new(),
            assembler: None,
            tables: Vec::new(),
            odor_index: None,
            warnings: Vec::new(),
            output: DatasetOutputPaths {
                out_dir: out_dir.to_path_buf(),
                json_path: out_dir.join("compiled_dataset_summary.json"),
            },
            report: None,
        }
    }
}

/// Replaces characters that are awkward in file names.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            '%' => 'p',
            _ => '_',
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_become_file_stems() {
        assert_eq!(sanitize_file_stem("Latency (s)"), "Latency__s");
        assert_eq!(
            sanitize_file_stem("Blank-subtracted DeltaFF(%)"),
            "Blank-subtracted_DeltaFF_p"
        );
        assert_eq!(sanitize_file_stem("Baseline"), "Baseline");
    }
}
