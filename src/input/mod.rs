//! Discovery of trial trace files and stimulus order files in a session folder.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, RoiError};
use crate::session::StimulusOrderSource;

static TRIAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)_(\d+)\.txt$").expect("trial suffix regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialFile {
    /// Index embedded in the file name; 0 when the name carries no suffix.
    pub index: u32,
    pub path: PathBuf,
}

/// Trial index encoded as the `_<n>` suffix before `.txt`. Padding is optional,
/// so `_7`, `_007` and `_10` read as 7, 7 and 10.
pub fn trial_index(file_name: &str) -> u32 {
    TRIAL_SUFFIX
        .captures(file_name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Lists every trace `.txt` below `session_dir`, ordered by trial index.
pub fn discover_trial_files(session_dir: &Path) -> Result<Vec<TrialFile>> {
    let mut files: Vec<TrialFile> = WalkDir::new(session_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if !is_trace_file(&name) {
                return None;
            }
            Some(TrialFile {
                index: trial_index(&name),
                path: entry.into_path(),
            })
        })
        .collect();

    if files.is_empty() {
        return Err(RoiError::NoTrialFiles(session_dir.to_path_buf()));
    }

    files.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));
    for pair in files.windows(2) {
        if pair[0].index == pair[1].index {
            return Err(RoiError::DuplicateTrialIndex {
                index: pair[0].index,
                first: pair[0].path.clone(),
                second: pair[1].path.clone(),
            });
        }
    }
    debug!(count = files.len(), "trial_files_discovered");
    Ok(files)
}

/// Finds the stimulus order file; the table form wins over the legacy line.
pub fn find_stimulus_order(
    session_dir: &Path,
    allow_legacy: bool,
) -> Result<(PathBuf, StimulusOrderSource)> {
    let entries = std::fs::read_dir(session_dir).map_err(|e| RoiError::io(session_dir, e))?;
    let mut table = None;
    let mut legacy = None;
    let mut names: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| Some((e.file_name().to_str()?.to_string(), e.path())))
        .collect();
    names.sort();

    for (name, path) in names {
        if is_temp_file(&name) {
            warn!(file = %name, "skipping temporary file");
            continue;
        }
        if name.contains("solenoid_order") && table.is_none() {
            table = Some(path);
        } else if name.contains("solenoid_info.txt") && legacy.is_none() {
            legacy = Some(path);
        }
    }

    if let Some(path) = table {
        return Ok((path, StimulusOrderSource::Table));
    }
    match legacy {
        Some(path) if allow_legacy => Ok((path, StimulusOrderSource::LegacyLine)),
        Some(path) => Err(RoiError::MissingStimulusOrder {
            path,
            reason: "legacy solenoid_info.txt found but legacy order support is disabled"
                .to_string(),
        }),
        None => Err(RoiError::MissingStimulusOrder {
            path: session_dir.to_path_buf(),
            reason: "expected ...solenoid_order...csv or ...solenoid_info.txt".to_string(),
        }),
    }
}

fn is_trace_file(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".txt") && !name.contains("solenoid") && !is_temp_file(name)
}

// Lock files left behind by spreadsheet editors.
fn is_temp_file(name: &str) -> bool {
    name.contains(".~lock") || name.starts_with("._")
}
