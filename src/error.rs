use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or analyzing one imaging session.
///
/// None of these are retried: each one points at an input folder or file
/// that has to be fixed by hand.
#[derive(Error, Debug)]
pub enum RoiError {
    /// A raw trace file is not a numeric frame x sample matrix.
    #[error("malformed trace file {path} (line {line}): {reason}")]
    MalformedTrace {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The session folder holds no trial trace files.
    #[error("no trial .txt files found in {0}")]
    NoTrialFiles(PathBuf),

    /// No parseable solenoid order file in the session folder.
    #[error("missing stimulus order in {path}: {reason}")]
    MissingStimulusOrder { path: PathBuf, reason: String },

    /// The stimulus order and the trial files disagree on the trial count.
    #[error("stimulus order lists {order} trials but {files} trial files were found")]
    InconsistentTrialCount { order: usize, files: usize },

    /// Two trial files resolve to the same trial index.
    #[error("trial index {index} is used by both {first} and {second}")]
    DuplicateTrialIndex {
        index: u32,
        first: PathBuf,
        second: PathBuf,
    },

    /// A trial file has a different number of sample columns than the first.
    #[error("{path} has {actual} sample columns, expected {expected}")]
    SampleCountMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// A significant response never crossed the onset threshold.
    #[error("no response onset found for odor {odor} (threshold {threshold})")]
    NoOnsetFound { odor: u32, threshold: f64 },

    /// Not enough frames to cover the protocol baseline window.
    #[error("trace has {got} frames, at least {needed} are required")]
    TooFewFrames { needed: usize, got: usize },

    /// The averaged matrix has no odor columns.
    #[error("no odor columns to analyze")]
    NoOdors,

    /// A folder or file name does not follow the session naming convention.
    #[error("invalid session name '{0}'")]
    InvalidSessionName(String),

    /// The requested sample label is not a column of the session table.
    #[error("unknown sample '{0}'")]
    UnknownSample(String),

    /// A written analysis table could not be read back.
    #[error("malformed analysis file {path} (line {line}): {reason}")]
    MalformedAnalysis {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RoiError>;

impl RoiError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed_trace(
        path: impl Into<PathBuf>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedTrace {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_inconsistent_trial_count() {
        let err = RoiError::InconsistentTrialCount { order: 24, files: 23 };
        assert_eq!(
            err.to_string(),
            "stimulus order lists 24 trials but 23 trial files were found"
        );
    }

    #[test]
    fn display_malformed_trace_mentions_path_and_line() {
        let err = RoiError::malformed_trace("/data/s1/trial_003.txt", 7, "bad float 'x'");
        let msg = err.to_string();
        assert!(msg.contains("/data/s1/trial_003.txt"));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("bad float 'x'"));
    }

    #[test]
    fn io_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = RoiError::io("/missing", io_err);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("no such file"));
    }
}
