use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use crate::ctx::DatasetCtx;
use crate::io;
use crate::pipeline::Stage;

pub struct Stage8DatasetOutput;

impl Stage8DatasetOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Stage<DatasetCtx> for Stage8DatasetOutput {
    fn name(&self) -> &'static str {
        "stage8_dataset_output"
    }

    fn run(&self, ctx: &mut DatasetCtx) -> Result<()> {
        fs::create_dir_all(&ctx.output.out_dir)
            .with_context(|| format!("failed to create {}", ctx.output.out_dir.display()))?;

        for table in &ctx.tables {
            let path = ctx.output.table_path(table.statistic.sheet_name());
            io::tsv_writer::write_dataset_table(&path, table)?;
            info!(
                statistic = table.statistic.sheet_name(),
                rows = table.rows.len(),
                path = %path.display(),
                "dataset_table_written"
            );
        }

        let report = io::json_writer::build_dataset_report(ctx)?;
        if ctx.write_json {
            io::write_json(&ctx.output.json_path, &report)?;
            info!(path = %ctx.output.json_path.display(), "json_written");
        }
        ctx.report = Some(report);
        Ok(())
    }
}
