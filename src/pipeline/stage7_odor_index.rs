use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ctx::DatasetCtx;
use crate::dataset::build_odor_index;
use crate::pipeline::Stage;

pub struct Stage7OdorIndex;

impl Stage7OdorIndex {
    pub fn new() -> Self {
        Self
    }
}

impl Stage<DatasetCtx> for Stage7OdorIndex {
    fn name(&self) -> &'static str {
        "stage7_odor_index"
    }

    fn run(&self, ctx: &mut DatasetCtx) -> Result<()> {
        let assembler = ctx.assembler.as_ref().context("assembler missing")?;
        let index = build_odor_index(assembler.cohort(), assembler.extracts());
        if index.is_all_insignificant() {
            warn!("no session had a significant response");
            ctx.warnings
                .push("no session had a significant response".to_string());
        } else {
            info!(sig_odors = ?index.sig_odors(), "odor_index_built");
        }
        ctx.odor_index = Some(index);
        Ok(())
    }
}
