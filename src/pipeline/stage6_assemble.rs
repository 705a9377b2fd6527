use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::DatasetCtx;
use crate::dataset::DatasetAssembler;
use crate::pipeline::Stage;

pub struct Stage6Assemble;

impl Stage6Assemble {
    pub fn new() -> Self {
        Self
    }
}

impl Stage<DatasetCtx> for Stage6Assemble {
    fn name(&self) -> &'static str {
        "stage6_assemble"
    }

    fn run(&self, ctx: &mut DatasetCtx) -> Result<()> {
        let mut assembler = DatasetAssembler::new(ctx.config.clone(), ctx.cohort);
        let mut rejected = Vec::new();
        for (i, session) in ctx.sessions.iter().enumerate() {
            if let Err(err) = assembler.add_session(session) {
                warn!(session = %session.id, error = %err, "session rejected");
                rejected.push((i, err.to_string()));
            }
        }
        // Highest index first so earlier positions stay valid.
        for (i, err) in rejected.into_iter().rev() {
            let session = ctx.sessions.remove(i);
            let name = session.id.name();
            ctx.warnings.push(format!("session {} not assembled: {}", name, err));
            ctx.skipped.push(name);
        }

        ctx.tables = assembler.finalize();
        info!(
            tables = ctx.tables.len(),
            rows = ctx.tables.first().map(|t| t.rows.len()).unwrap_or(0),
            "dataset_assembled"
        );
        ctx.assembler = Some(assembler);
        Ok(())
    }
}
