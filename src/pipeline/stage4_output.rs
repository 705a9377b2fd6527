use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io;
use crate::pipeline::Stage;

pub struct Stage4Output;

impl Stage4Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage<Ctx> for Stage4Output {
    fn name(&self) -> &'static str {
        "stage4_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.write_tsv {
            let out = &ctx.output;
            io::tsv_writer::write_analysis(&out.analysis_path, &ctx.records)?;
            io::tsv_writer::write_avg_means(&out.avg_means_path, &ctx.pivots)?;
            io::tsv_writer::write_raw_means(&out.raw_means_path, &ctx.pivots)?;
            let order = ctx
                .stimulus_order
                .as_ref()
                .context("stimulus order missing")?;
            io::tsv_writer::write_solenoid_info(&out.solenoid_path, order)?;
            info!(path = %out.analysis_path.display(), "tsv_written");
        }

        let report = io::json_writer::build_session_report(ctx)?;
        if ctx.write_json {
            io::write_json(&ctx.output.json_path, &report)?;
            info!(path = %ctx.output.json_path.display(), "json_written");
        }
        ctx.report = Some(report);
        Ok(())
    }
}
