use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::DatasetCtx;
use crate::dataset::{CohortKind, sort_by_date};
use crate::io::analysis_reader::read_analysis;
use crate::pipeline::Stage;

pub struct Stage5LoadAnalyses;

impl Stage5LoadAnalyses {
    pub fn new() -> Self {
        Self
    }
}

impl Stage<DatasetCtx> for Stage5LoadAnalyses {
    fn name(&self) -> &'static str {
        "stage5_load_analyses"
    }

    /// Unreadable files are skipped with a warning; at least one must load.
    fn run(&self, ctx: &mut DatasetCtx) -> Result<()> {
        for path in &ctx.inputs {
            match read_analysis(path) {
                Ok(session) => ctx.sessions.push(session),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "analysis file skipped");
                    ctx.warnings.push(format!("skipped {}: {}", path.display(), err));
                    ctx.skipped.push(path.display().to_string());
                }
            }
        }
        if ctx.sessions.is_empty() {
            anyhow::bail!("no analysis file could be loaded");
        }
        if ctx.cohort == CohortKind::Chronic {
            sort_by_date(&mut ctx.sessions);
        }
        info!(
            sessions = ctx.sessions.len(),
            skipped = ctx.skipped.len(),
            cohort = ctx.cohort.as_str(),
            "analyses_loaded"
        );
        Ok(())
    }
}
