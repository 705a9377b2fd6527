use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, RoiError};
use crate::input;
use crate::session::stimulus::read_stimulus_order;
use crate::session::trace::read_trace;
use crate::session::{SampleType, SessionTable, StimulusOrder, TraceTable};

/// Capabilities of the session loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Accept the legacy single-line `solenoid_info.txt` order.
    pub allow_legacy_order: bool,
    /// 1-based trial numbers removed before pivoting.
    pub drop_trials: Vec<usize>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            allow_legacy_order: true,
            drop_trials: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub order: StimulusOrder,
    pub trials: LoadedTrials,
}

#[derive(Debug, Clone)]
pub struct LoadedTrials {
    pub files: Vec<PathBuf>,
    pub table: SessionTable,
    pub dropped_rows: usize,
}

pub fn load_stimulus_order(session_dir: &Path, options: &LoaderOptions) -> Result<StimulusOrder> {
    let (path, source) = input::find_stimulus_order(session_dir, options.allow_legacy_order)?;
    read_stimulus_order(&path, source)
}

/// Reads the stimulus order and every trial of a session.
pub fn load_session(
    session_dir: &Path,
    sample_type: SampleType,
    options: &LoaderOptions,
) -> Result<LoadedSession> {
    let order = load_stimulus_order(session_dir, options)?;
    let trials = load_trials(session_dir, sample_type, &order, options)?;
    Ok(LoadedSession { order, trials })
}

/// Parses every trial file and stacks them into one table, dropping
/// excluded trials before anything is pivoted.
pub fn load_trials(
    session_dir: &Path,
    sample_type: SampleType,
    order: &StimulusOrder,
    options: &LoaderOptions,
) -> Result<LoadedTrials> {
    let files = input::discover_trial_files(session_dir)?;
    if files.len() != order.len() {
        return Err(RoiError::InconsistentTrialCount {
            order: order.len(),
            files: files.len(),
        });
    }

    let mut traces: Vec<TraceTable> = Vec::with_capacity(files.len());
    for file in &files {
        let trace = read_trace(&file.path)?;
        let expected = traces.first().map_or(trace.n_samples(), |t| t.n_samples());
        if trace.n_samples() != expected {
            return Err(RoiError::SampleCountMismatch {
                path: file.path.clone(),
                expected,
                actual: trace.n_samples(),
            });
        }
        traces.push(trace);
    }

    let total_frames: usize = traces.iter().map(TraceTable::n_frames).sum();
    let mut table = SessionTable::from_trials(sample_type, traces, &order.odors);
    let dropped_rows = if options.drop_trials.is_empty() {
        0
    } else {
        let dropped = table.drop_trials(&options.drop_trials);
        if dropped == 0 {
            warn!(trials = ?options.drop_trials, "requested trials not present; nothing dropped");
        }
        dropped
    };

    info!(
        trials = files.len(),
        frames = total_frames,
        samples = table.samples.len(),
        rows = table.rows.len(),
        dropped_rows,
        "trials_loaded"
    );

    Ok(LoadedTrials {
        files: files.into_iter().map(|f| f.path).collect(),
        table,
        dropped_rows,
    })
}
